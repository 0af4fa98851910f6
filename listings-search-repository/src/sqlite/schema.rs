//! Listing database schema.

use rusqlite::Connection;
use tracing::info;

use crate::errors::StoreError;

/// Written to `PRAGMA user_version` once the tables exist.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = "
CREATE TABLE company (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL
);

CREATE TABLE region (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE job (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    company_id TEXT REFERENCES company(id) ON DELETE SET NULL,
    region_id TEXT REFERENCES region(id) ON DELETE SET NULL,
    city TEXT,
    country TEXT,
    remote INTEGER,
    skills TEXT,
    tags TEXT,
    salary_min INTEGER,
    salary_max INTEGER,
    currency TEXT,
    experience TEXT,
    url TEXT,
    posted_at INTEGER NOT NULL
);

CREATE INDEX idx_job_posted_at ON job(posted_at);
CREATE INDEX idx_job_company ON job(company_id);

CREATE TABLE event (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    company_id TEXT REFERENCES company(id) ON DELETE SET NULL,
    region_id TEXT REFERENCES region(id) ON DELETE SET NULL,
    city TEXT,
    country TEXT,
    online INTEGER,
    venue TEXT,
    tags TEXT,
    starts_at INTEGER NOT NULL,
    ends_at INTEGER,
    url TEXT
);

CREATE INDEX idx_event_starts_at ON event(starts_at);
";

/// Create the tables on an empty database. Existing databases at the
/// current version are left untouched.
pub(crate) fn bootstrap(conn: &mut Connection) -> Result<(), StoreError> {
    conn.pragma_update(None, "foreign_keys", "ON")?;

    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;
    if table_count > 0 {
        return Err(StoreError::database(format!(
            "Unsupported listings schema version {} (expected {})",
            version, SCHEMA_VERSION
        )));
    }

    info!(version = SCHEMA_VERSION, "Creating listings db schema");
    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_TABLES)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}
