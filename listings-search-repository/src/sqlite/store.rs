//! SQLite-backed listing store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::schema;
use super::sql::{from_clause, order_clause, where_clause, EVENT_COLUMNS, JOB_COLUMNS};
use crate::errors::StoreError;
use crate::interfaces::ListingStore;
use crate::store_query::StoreQuery;
use listings_search_shared::{Company, EntityKind, EventRecord, JobRecord, Region};

/// Listing store over a single SQLite connection.
pub struct SqliteListingStore {
    conn: Mutex<Connection>,
}

/// Job row before JSON array columns are decoded.
struct JobRow {
    record: JobRecord,
    skills: Option<String>,
    tags: Option<String>,
}

/// Event row before JSON array columns are decoded.
struct EventRow {
    record: EventRecord,
    tags: Option<String>,
}

impl SqliteListingStore {
    /// Open (and create if needed) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        schema::bootstrap(&mut conn)?;
        info!(path = %path.display(), "Opened listings database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// A private in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let mut conn = Connection::open_in_memory()?;
        schema::bootstrap(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::unavailable("listings connection lock poisoned"))
    }

    pub fn save_company(&self, company: &Company) -> Result<(), StoreError> {
        let conn = self.lock()?;
        upsert_company(&conn, company)
    }

    pub fn save_region(&self, region: &Region) -> Result<(), StoreError> {
        let conn = self.lock()?;
        upsert_region(&conn, region)
    }

    /// Insert or overwrite a job. Its company and region are upserted too.
    pub fn save_job(&self, job: &JobRecord) -> Result<(), StoreError> {
        self.save_jobs(std::slice::from_ref(job)).map(|_| ())
    }

    /// Insert or overwrite a batch of jobs in one transaction. Either every
    /// job is written or none is.
    pub fn save_jobs(&self, jobs: &[JobRecord]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for job in jobs {
            insert_job(&tx, job)?;
        }
        tx.commit()?;
        debug!(count = jobs.len(), "Saved jobs");
        Ok(jobs.len())
    }

    /// Insert or overwrite an event. Its company and region are upserted too.
    pub fn save_event(&self, event: &EventRecord) -> Result<(), StoreError> {
        self.save_events(std::slice::from_ref(event)).map(|_| ())
    }

    /// Insert or overwrite a batch of events in one transaction.
    pub fn save_events(&self, events: &[EventRecord]) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for event in events {
            insert_event(&tx, event)?;
        }
        tx.commit()?;
        debug!(count = events.len(), "Saved events");
        Ok(events.len())
    }

    /// Returns whether a row was removed.
    pub fn delete_job(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM job WHERE id = ?1", params![id])? > 0)
    }

    /// Returns whether a row was removed.
    pub fn delete_event(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM event WHERE id = ?1", params![id])? > 0)
    }

    /// Delete every job posted strictly before `cutoff`.
    pub fn delete_jobs_posted_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM job WHERE posted_at < ?1",
            params![cutoff.timestamp_millis()],
        )?;
        Ok(removed)
    }

    fn query_jobs(
        &self,
        tail: &str,
        params: Vec<rusqlite::types::Value>,
    ) -> Result<Vec<JobRecord>, StoreError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} {}{}",
            JOB_COLUMNS,
            from_clause(EntityKind::Job),
            tail
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), read_job_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(JobRow::decode).collect()
    }

    fn query_events(
        &self,
        tail: &str,
        params: Vec<rusqlite::types::Value>,
    ) -> Result<Vec<EventRecord>, StoreError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} {}{}",
            EVENT_COLUMNS,
            from_clause(EntityKind::Event),
            tail
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), read_event_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(EventRow::decode).collect()
    }

    fn windowed(
        query: &StoreQuery,
        offset: usize,
        limit: usize,
    ) -> Result<(String, Vec<rusqlite::types::Value>), StoreError> {
        let (mut tail, mut params) = where_clause(query)?;
        tail.push_str(&order_clause(query)?);
        tail.push_str(" LIMIT ? OFFSET ?");
        params.push(rusqlite::types::Value::Integer(to_sql_int(limit)?));
        params.push(rusqlite::types::Value::Integer(to_sql_int(offset)?));
        Ok((tail, params))
    }
}

#[async_trait]
impl ListingStore for SqliteListingStore {
    async fn find_job(&self, id: &str) -> Result<Option<JobRecord>, StoreError> {
        let row = {
            let conn = self.lock()?;
            let sql = format!(
                "SELECT {} {} WHERE l.id = ?1",
                JOB_COLUMNS,
                from_clause(EntityKind::Job)
            );
            conn.query_row(&sql, params![id], read_job_row).optional()?
        };
        row.map(JobRow::decode).transpose()
    }

    async fn find_event(&self, id: &str) -> Result<Option<EventRecord>, StoreError> {
        let row = {
            let conn = self.lock()?;
            let sql = format!(
                "SELECT {} {} WHERE l.id = ?1",
                EVENT_COLUMNS,
                from_clause(EntityKind::Event)
            );
            conn.query_row(&sql, params![id], read_event_row).optional()?
        };
        row.map(EventRow::decode).transpose()
    }

    async fn all_jobs(&self) -> Result<Vec<JobRecord>, StoreError> {
        self.query_jobs(" ORDER BY l.id ASC", Vec::new())
    }

    async fn all_events(&self) -> Result<Vec<EventRecord>, StoreError> {
        self.query_events(" ORDER BY l.id ASC", Vec::new())
    }

    async fn count(&self, query: &StoreQuery) -> Result<u64, StoreError> {
        let (tail, params) = where_clause(query)?;
        let conn = self.lock()?;
        let sql = format!("SELECT COUNT(*) {}{}", from_clause(query.kind), tail);
        let count: i64 = conn.query_row(&sql, params_from_iter(params), |r| r.get(0))?;
        u64::try_from(count).map_err(|e| StoreError::mapping(e.to_string()))
    }

    async fn find_jobs(
        &self,
        query: &StoreQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<JobRecord>, StoreError> {
        if query.kind != EntityKind::Job {
            return Err(StoreError::mapping(format!(
                "find_jobs called with a {} query",
                query.kind
            )));
        }
        let (tail, params) = Self::windowed(query, offset, limit)?;
        self.query_jobs(&tail, params)
    }

    async fn find_events(
        &self,
        query: &StoreQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<EventRecord>, StoreError> {
        if query.kind != EntityKind::Event {
            return Err(StoreError::mapping(format!(
                "find_events called with a {} query",
                query.kind
            )));
        }
        let (tail, params) = Self::windowed(query, offset, limit)?;
        self.query_events(&tail, params)
    }
}

fn insert_job(conn: &Connection, job: &JobRecord) -> Result<(), StoreError> {
    if let Some(company) = &job.company {
        upsert_company(conn, company)?;
    }
    if let Some(region) = &job.region {
        upsert_region(conn, region)?;
    }
    conn.execute(
        "INSERT OR REPLACE INTO job (id, title, description, company_id, region_id, city, \
         country, remote, skills, tags, salary_min, salary_max, currency, experience, url, \
         posted_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            job.id,
            job.title,
            job.description,
            job.company.as_ref().map(|c| &c.id),
            job.region.as_ref().map(|r| &r.id),
            job.city,
            job.country,
            job.remote,
            encode_list(&job.skills)?,
            encode_list(&job.tags)?,
            job.salary_min,
            job.salary_max,
            job.currency,
            job.experience,
            job.url,
            job.posted_at.timestamp_millis(),
        ],
    )?;
    Ok(())
}

fn insert_event(conn: &Connection, event: &EventRecord) -> Result<(), StoreError> {
    if let Some(company) = &event.company {
        upsert_company(conn, company)?;
    }
    if let Some(region) = &event.region {
        upsert_region(conn, region)?;
    }
    conn.execute(
        "INSERT OR REPLACE INTO event (id, title, description, company_id, region_id, city, \
         country, online, venue, tags, starts_at, ends_at, url) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            event.id,
            event.title,
            event.description,
            event.company.as_ref().map(|c| &c.id),
            event.region.as_ref().map(|r| &r.id),
            event.city,
            event.country,
            event.online,
            event.venue,
            encode_list(&event.tags)?,
            event.starts_at.timestamp_millis(),
            event.ends_at.map(|t| t.timestamp_millis()),
            event.url,
        ],
    )?;
    Ok(())
}

fn upsert_company(conn: &Connection, company: &Company) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO company (id, name, slug) VALUES (?1, ?2, ?3) \
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, slug = excluded.slug",
        params![company.id, company.name, company.slug],
    )?;
    Ok(())
}

fn upsert_region(conn: &Connection, region: &Region) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO region (id, code, name) VALUES (?1, ?2, ?3) \
         ON CONFLICT(id) DO UPDATE SET code = excluded.code, name = excluded.name",
        params![region.id, region.code, region.name],
    )?;
    Ok(())
}

fn to_sql_int(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|e| StoreError::mapping(e.to_string()))
}

fn encode_list(list: &Option<Vec<String>>) -> Result<Option<String>, StoreError> {
    list.as_ref()
        .map(|items| serde_json::to_string(items))
        .transpose()
        .map_err(|e| StoreError::mapping(e.to_string()))
}

fn decode_list(raw: Option<String>) -> Result<Option<Vec<String>>, StoreError> {
    raw.map(|json| {
        serde_json::from_str(&json)
            .map_err(|e| StoreError::mapping(format!("Malformed JSON array {}: {}", json, e)))
    })
    .transpose()
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::mapping(format!("Timestamp out of range: {}", millis)))
}

/// Columns 3..=8 are the joined company and region.
fn read_relations(row: &Row<'_>) -> rusqlite::Result<(Option<Company>, Option<Region>)> {
    let company = match row.get::<_, Option<String>>(3)? {
        Some(id) => Some(Company {
            id,
            name: row.get(4)?,
            slug: row.get(5)?,
        }),
        None => None,
    };
    let region = match row.get::<_, Option<String>>(6)? {
        Some(id) => Some(Region {
            id,
            code: row.get(7)?,
            name: row.get(8)?,
        }),
        None => None,
    };
    Ok((company, region))
}

fn read_job_row(row: &Row<'_>) -> rusqlite::Result<(JobRow, i64)> {
    let (company, region) = read_relations(row)?;
    let posted_at: i64 = row.get(19)?;
    let record = JobRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        company,
        region,
        city: row.get(9)?,
        country: row.get(10)?,
        remote: row.get(11)?,
        skills: None,
        tags: None,
        salary_min: row.get(14)?,
        salary_max: row.get(15)?,
        currency: row.get(16)?,
        experience: row.get(17)?,
        url: row.get(18)?,
        posted_at: DateTime::<Utc>::default(),
    };
    Ok((
        JobRow {
            record,
            skills: row.get(12)?,
            tags: row.get(13)?,
        },
        posted_at,
    ))
}

fn read_event_row(row: &Row<'_>) -> rusqlite::Result<(EventRow, i64, Option<i64>)> {
    let (company, region) = read_relations(row)?;
    let starts_at: i64 = row.get(14)?;
    let ends_at: Option<i64> = row.get(15)?;
    let record = EventRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        company,
        region,
        city: row.get(9)?,
        country: row.get(10)?,
        online: row.get(11)?,
        venue: row.get(12)?,
        tags: None,
        starts_at: DateTime::<Utc>::default(),
        ends_at: None,
        url: row.get(16)?,
    };
    Ok((
        EventRow {
            record,
            tags: row.get(13)?,
        },
        starts_at,
        ends_at,
    ))
}

impl JobRow {
    fn decode((row, posted_at): (JobRow, i64)) -> Result<JobRecord, StoreError> {
        let mut record = row.record;
        record.skills = decode_list(row.skills)?;
        record.tags = decode_list(row.tags)?;
        record.posted_at = from_millis(posted_at)?;
        Ok(record)
    }
}

impl EventRow {
    fn decode((row, starts_at, ends_at): (EventRow, i64, Option<i64>)) -> Result<EventRecord, StoreError> {
        let mut record = row.record;
        record.tags = decode_list(row.tags)?;
        record.starts_at = from_millis(starts_at)?;
        record.ends_at = ends_at.map(from_millis).transpose()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_query::{Column, OrderBy, Predicate};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn acme() -> Company {
        Company {
            id: "co-1".to_string(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
        }
    }

    fn job(id: &str, title: &str, day: u32) -> JobRecord {
        JobRecord::new(id, title, at(day))
    }

    fn seeded() -> SqliteListingStore {
        let store = SqliteListingStore::in_memory().unwrap();

        let mut rust = job("job-1", "Senior Rust Engineer", 1);
        rust.company = Some(acme());
        rust.region = Some(Region {
            id: "rg-1".to_string(),
            code: "BE".to_string(),
            name: "Berlin".to_string(),
        });
        rust.city = Some("Berlin".to_string());
        rust.remote = Some(true);
        rust.skills = Some(vec!["Rust".to_string(), "SQL".to_string()]);
        rust.tags = Some(vec!["backend".to_string()]);
        rust.salary_min = Some(70_000);
        store.save_job(&rust).unwrap();

        let mut go = job("job-2", "Go Developer", 2);
        go.description = Some("Backend services in Go".to_string());
        go.salary_max = Some(60_000);
        go.skills = Some(vec!["Go".to_string()]);
        store.save_job(&go).unwrap();

        store.save_job(&job("job-3", "Designer", 3)).unwrap();
        store
    }

    #[tokio::test]
    async fn test_find_job_with_relations() {
        let store = seeded();
        let found = store.find_job("job-1").await.unwrap().unwrap();

        assert_eq!(found.company, Some(acme()));
        assert_eq!(found.region.as_ref().map(|r| r.code.as_str()), Some("BE"));
        assert_eq!(found.skills, Some(vec!["Rust".to_string(), "SQL".to_string()]));
        assert_eq!(found.remote, Some(true));
        assert_eq!(found.posted_at, at(1));
    }

    #[tokio::test]
    async fn test_find_missing_job() {
        let store = seeded();
        assert!(store.find_job("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_absent_arrays_stay_none() {
        let store = seeded();
        let found = store.find_job("job-3").await.unwrap().unwrap();
        assert!(found.skills.is_none());
        assert!(found.tags.is_none());
        assert!(found.company.is_none());
    }

    #[tokio::test]
    async fn test_has_element_is_case_insensitive() {
        let store = seeded();
        let query = StoreQuery::new(EntityKind::Job)
            .filter(Predicate::HasElement(Column::Skills, "rust".to_string()));

        assert_eq!(store.count(&query).await.unwrap(), 1);
        let jobs = store.find_jobs(&query, 0, 10).await.unwrap();
        assert_eq!(jobs[0].id, "job-1");
    }

    #[tokio::test]
    async fn test_tags_or_description() {
        let store = seeded();
        let query = StoreQuery::new(EntityKind::Job).filter(Predicate::Any(vec![
            Predicate::HasElement(Column::Tags, "backend".to_string()),
            Predicate::Contains(Column::Title, "backend".to_string()),
            Predicate::Contains(Column::Description, "backend".to_string()),
        ]));

        let ids: Vec<_> = store
            .find_jobs(&query, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec!["job-1", "job-2"]);
    }

    #[tokio::test]
    async fn test_salary_floor_falls_back_to_max() {
        let store = seeded();
        let query = StoreQuery::new(EntityKind::Job)
            .filter(Predicate::Gte(Column::SalaryFloor, 55_000))
            .order_by(OrderBy::desc(Column::SalaryFloor));

        let ids: Vec<_> = store
            .find_jobs(&query, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(ids, vec!["job-1", "job-2"]);
    }

    #[tokio::test]
    async fn test_order_nulls_last_and_window() {
        let store = seeded();
        let query = StoreQuery::new(EntityKind::Job).order_by(OrderBy::desc(Column::SalaryFloor));

        let all: Vec<_> = store
            .find_jobs(&query, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(all, vec!["job-1", "job-2", "job-3"]);

        let window = store.find_jobs(&query, 1, 1).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, "job-2");
    }

    #[tokio::test]
    async fn test_remote_false_matches_null() {
        let store = seeded();
        let query =
            StoreQuery::new(EntityKind::Job).filter(Predicate::Eq(Column::Remote, false.into()));
        assert_eq!(store.count(&query).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_company_and_region_filters() {
        let store = seeded();
        let query = StoreQuery::new(EntityKind::Job)
            .filter(Predicate::Eq(Column::RegionCode, "be".into()))
            .filter(Predicate::Contains(Column::CompanyName, "acm".to_string()));
        assert_eq!(store.count(&query).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_events_round_trip() {
        let store = SqliteListingStore::in_memory().unwrap();
        let mut event = EventRecord::new("ev-1", "RustConf", at(10));
        event.ends_at = Some(at(12));
        event.online = Some(true);
        event.tags = Some(vec!["conference".to_string()]);
        store.save_event(&event).unwrap();

        let found = store.find_event("ev-1").await.unwrap().unwrap();
        assert_eq!(found, event);

        let query =
            StoreQuery::new(EntityKind::Event).filter(Predicate::Eq(Column::Online, true.into()));
        assert_eq!(store.find_events(&query, 0, 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_rejected() {
        let store = seeded();
        let result = store
            .find_events(&StoreQuery::new(EntityKind::Job), 0, 5)
            .await;
        assert!(matches!(result, Err(StoreError::MappingError(_))));
    }

    #[tokio::test]
    async fn test_deletes() {
        let store = seeded();
        assert!(store.delete_job("job-3").unwrap());
        assert!(!store.delete_job("job-3").unwrap());

        let removed = store.delete_jobs_posted_before(at(2)).unwrap();
        assert_eq!(removed, 1);
        let remaining = store.all_jobs().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "job-2");
    }

    #[tokio::test]
    async fn test_batch_save_is_all_or_nothing() {
        let path = std::env::temp_dir().join(format!(
            "listings-batch-{}-{}.db",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let store = SqliteListingStore::open(&path).unwrap();
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_job BEFORE INSERT ON job WHEN NEW.title = 'rejected' \
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = store.save_jobs(&[job("job-1", "Accepted", 1), job("job-2", "rejected", 2)]);
        assert!(matches!(result, Err(StoreError::DatabaseError(_))));
        assert!(store.all_jobs().await.unwrap().is_empty());

        assert_eq!(store.save_jobs(&[job("job-1", "Accepted", 1)]).unwrap(), 1);
        assert_eq!(store.all_jobs().await.unwrap().len(), 1);

        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
