//! Loading listings from a JSON file into the store.
//!
//! Seeding goes through the sync hooks like any other bulk write, so the
//! index follows the store when it is configured.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::ListingsError;
use listings_search_repository::SqliteListingStore;
use listings_search_shared::{EntityKind, EventRecord, JobRecord};
use listings_search_sync::{SyncHooks, WriteAction};

/// Contents of a seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl SeedFile {
    /// Parse a seed document.
    pub fn from_json(json: &str) -> Result<Self, ListingsError> {
        serde_json::from_str(json).map_err(|e| ListingsError::parse(format!("seed file: {}", e)))
    }

    /// Read and parse a seed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ListingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Number of rows written per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub jobs: usize,
    pub events: usize,
}

/// Write every record of `seed` to the store, one bulk write per kind.
///
/// Each kind is written in a single transaction, so a rejected row leaves
/// nothing behind that the index would miss. Empty kinds are skipped and do
/// not touch the index.
///
/// # Returns
///
/// * `Ok(SeedReport)` - Rows written per kind
/// * `Err(ListingsError)` - If the store rejected a row; index failures are
///   only logged by the hooks
pub async fn apply_seed(
    store: &SqliteListingStore,
    hooks: &SyncHooks,
    seed: &SeedFile,
) -> Result<SeedReport, ListingsError> {
    let mut report = SeedReport::default();

    if !seed.jobs.is_empty() {
        report.jobs = hooks
            .around_write(
                EntityKind::Job,
                async { store.save_jobs(&seed.jobs) },
                |_| Some(WriteAction::BulkWrite),
            )
            .await?;
    }

    if !seed.events.is_empty() {
        report.events = hooks
            .around_write(
                EntityKind::Event,
                async { store.save_events(&seed.events) },
                |_| Some(WriteAction::BulkWrite),
            )
            .await?;
    }

    info!(jobs = report.jobs, events = report.events, "Seed applied");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listings_search_repository::{IndexNames, ListingStore};
    use std::sync::Arc;

    const SEED: &str = r#"{
        "jobs": [
            {
                "id": "job-1",
                "title": "Rust engineer",
                "description": "<p>Build things</p>",
                "company": { "id": "c-1", "name": "Acme", "slug": "acme" },
                "region": null,
                "city": "Brussels",
                "country": "BE",
                "remote": true,
                "skills": ["Rust"],
                "tags": null,
                "salary_min": 50000,
                "salary_max": null,
                "currency": "EUR",
                "experience": "senior",
                "url": null,
                "posted_at": "2024-03-01T09:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn test_missing_kinds_default_to_empty() {
        let seed = SeedFile::from_json(SEED).unwrap();
        assert_eq!(seed.jobs.len(), 1);
        assert!(seed.events.is_empty());
        assert_eq!(seed.jobs[0].skills.as_deref(), Some(&["Rust".to_string()][..]));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            SeedFile::from_json("{\"jobs\": 3}"),
            Err(ListingsError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_seed_without_index() {
        let store = Arc::new(SqliteListingStore::in_memory().unwrap());
        let listing_store: Arc<dyn ListingStore> = store.clone();
        let hooks = SyncHooks::new(None, listing_store, IndexNames::default());

        let report = apply_seed(&store, &hooks, &SeedFile::from_json(SEED).unwrap())
            .await
            .unwrap();

        assert_eq!(report, SeedReport { jobs: 1, events: 0 });
        let job = store.find_job("job-1").await.unwrap().unwrap();
        assert_eq!(job.company.map(|c| c.name).as_deref(), Some("Acme"));
    }
}
