//! Write-through synchronization of the search index.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::action::WriteAction;
use crate::errors::SyncError;
use crate::mapper::{event_document, job_document, to_index_value};
use listings_search_repository::{IndexNames, ListingStore, SearchIndexProvider};
use listings_search_shared::EntityKind;

/// What a sync did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Documents added or overwritten.
    Upserted(usize),
    /// Delete calls issued.
    Removed(usize),
    /// Full reindex with this many documents.
    Reindexed(usize),
    /// Nothing to do (no client, or a predicate without ids).
    Skipped,
}

/// Reacts to completed relational writes by mutating the search index.
///
/// With no provider configured every method is a no-op.
///
/// # Example
///
/// ```ignore
/// let hooks = SyncHooks::new(Some(provider), store.clone(), IndexNames::default());
///
/// let job = hooks
///     .around_write(EntityKind::Job, store_write(job), |job: &JobRecord| {
///         Some(WriteAction::Create { id: job.id.clone() })
///     })
///     .await?;
/// ```
pub struct SyncHooks {
    provider: Option<Arc<dyn SearchIndexProvider>>,
    store: Arc<dyn ListingStore>,
    indexes: IndexNames,
}

impl SyncHooks {
    pub fn new(
        provider: Option<Arc<dyn SearchIndexProvider>>,
        store: Arc<dyn ListingStore>,
        indexes: IndexNames,
    ) -> Self {
        Self {
            provider,
            store,
            indexes,
        }
    }

    /// Whether a search index is configured.
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Synchronize after a write that already committed.
    ///
    /// Failures are logged and discarded; the write's caller never sees them.
    pub async fn after_write(&self, kind: EntityKind, action: &WriteAction) {
        match self.try_sync(kind, action).await {
            Ok(outcome) => debug!(
                entity = %kind,
                action = %action,
                outcome = ?outcome,
                "Index synchronized"
            ),
            Err(e) => warn!(
                entity = %kind,
                action = %action,
                error = %e,
                "Index synchronization failed"
            ),
        }
    }

    /// Run a write, then synchronize if it succeeded.
    ///
    /// # Arguments
    ///
    /// * `kind` - Entity kind the write touches
    /// * `write` - The relational write
    /// * `classify` - Derives the sync action from the write's output
    ///
    /// # Returns
    ///
    /// The write's own result, untouched by anything the sync does.
    pub async fn around_write<F, T, E, C>(&self, kind: EntityKind, write: F, classify: C) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        C: FnOnce(&T) -> Option<WriteAction>,
    {
        let output = write.await?;
        if let Some(action) = classify(&output) {
            self.after_write(kind, &action).await;
        }
        Ok(output)
    }

    /// Apply one write action to the index, reporting failures.
    #[instrument(skip(self), fields(entity = %kind))]
    pub async fn try_sync(
        &self,
        kind: EntityKind,
        action: &WriteAction,
    ) -> Result<SyncOutcome, SyncError> {
        let Some(provider) = &self.provider else {
            return Ok(SyncOutcome::Skipped);
        };
        let index = self.indexes.for_kind(kind);

        match action {
            WriteAction::Create { id } | WriteAction::Update { id } | WriteAction::Upsert { id } => {
                match self.fetch_document(kind, id).await? {
                    Some(document) => {
                        provider.add_documents(index, &[document]).await?;
                        Ok(SyncOutcome::Upserted(1))
                    }
                    None => {
                        debug!(id = %id, "Record gone after write, removing document");
                        provider.delete_document(index, id).await?;
                        Ok(SyncOutcome::Removed(1))
                    }
                }
            }
            WriteAction::BulkWrite => {
                let count = self.replace_all(provider.as_ref(), kind).await?;
                Ok(SyncOutcome::Reindexed(count))
            }
            WriteAction::Delete(predicate) | WriteAction::BulkDelete(predicate) => {
                let ids = action.deleted_ids();
                if ids.is_empty() {
                    debug!(predicate = ?predicate, "Delete predicate names no ids, index left as is");
                    return Ok(SyncOutcome::Skipped);
                }
                for id in &ids {
                    provider.delete_document(index, id).await?;
                }
                Ok(SyncOutcome::Removed(ids.len()))
            }
        }
    }

    /// Rebuild every document of `kind` from the store.
    ///
    /// Documents whose record no longer exists are not removed.
    ///
    /// # Returns
    ///
    /// * `Ok(count)` - Number of documents written; 0 when no index is configured
    /// * `Err(SyncError)` - If reading, mapping or writing failed
    #[instrument(skip(self), fields(entity = %kind))]
    pub async fn reindex(&self, kind: EntityKind) -> Result<usize, SyncError> {
        let Some(provider) = &self.provider else {
            info!("Search index not configured, nothing to reindex");
            return Ok(0);
        };
        self.replace_all(provider.as_ref(), kind).await
    }

    async fn replace_all(
        &self,
        provider: &dyn SearchIndexProvider,
        kind: EntityKind,
    ) -> Result<usize, SyncError> {
        let documents = self.all_documents(kind).await?;
        let index = self.indexes.for_kind(kind);
        provider.replace_documents(index, &documents).await?;
        info!(index = %index, count = documents.len(), "Reindexed");
        Ok(documents.len())
    }

    async fn fetch_document(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, SyncError> {
        match kind {
            EntityKind::Job => self
                .store
                .find_job(id)
                .await?
                .map(|record| to_index_value(&job_document(&record)))
                .transpose(),
            EntityKind::Event => self
                .store
                .find_event(id)
                .await?
                .map(|record| to_index_value(&event_document(&record)))
                .transpose(),
        }
    }

    async fn all_documents(&self, kind: EntityKind) -> Result<Vec<Value>, SyncError> {
        match kind {
            EntityKind::Job => self
                .store
                .all_jobs()
                .await?
                .iter()
                .map(|record| to_index_value(&job_document(record)))
                .collect(),
            EntityKind::Event => self
                .store
                .all_events()
                .await?
                .iter()
                .map(|record| to_index_value(&event_document(record)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::WritePredicate;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use listings_search_repository::types::{IndexSettings, IndexStats, SearchRequest, SearchResponse};
    use listings_search_repository::{SearchIndexError, SqliteListingStore};
    use listings_search_shared::{EventRecord, JobRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(String, Vec<String>),
        Replace(String, usize),
        Delete(String, String),
    }

    /// Records every write; fails them all when `failing` is set.
    struct RecordingProvider {
        calls: Mutex<Vec<Call>>,
        failing: bool,
        attempts: AtomicUsize,
    }

    impl RecordingProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: false,
                attempts: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::new()
            }
        }

        fn record(&self, call: Call) -> Result<(), SearchIndexError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(SearchIndexError::http(503, "unavailable"));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchIndexProvider for RecordingProvider {
        async fn ensure_index(&self, _index: &str, _primary_key: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn update_settings(
            &self,
            _index: &str,
            _settings: &IndexSettings,
        ) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn settings(&self, _index: &str) -> Result<IndexSettings, SearchIndexError> {
            Ok(IndexSettings::default())
        }

        async fn add_documents(&self, index: &str, documents: &[Value]) -> Result<(), SearchIndexError> {
            let ids = documents
                .iter()
                .map(|d| d["id"].as_str().unwrap_or_default().to_string())
                .collect();
            self.record(Call::Add(index.to_string(), ids))
        }

        async fn replace_documents(
            &self,
            index: &str,
            documents: &[Value],
        ) -> Result<(), SearchIndexError> {
            self.record(Call::Replace(index.to_string(), documents.len()))
        }

        async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchIndexError> {
            self.record(Call::Delete(index.to_string(), id.to_string()))
        }

        async fn search(
            &self,
            _index: &str,
            _request: &SearchRequest,
            _cancel: &CancellationToken,
        ) -> Result<SearchResponse, SearchIndexError> {
            Ok(SearchResponse::empty())
        }

        async fn stats(&self, _index: &str) -> Result<IndexStats, SearchIndexError> {
            Ok(IndexStats::default())
        }
    }

    fn job(id: &str) -> JobRecord {
        JobRecord::new(id, format!("Job {id}"), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
    }

    fn setup(provider: Arc<RecordingProvider>) -> (SyncHooks, Arc<SqliteListingStore>) {
        let store = Arc::new(SqliteListingStore::in_memory().unwrap());
        let provider: Arc<dyn SearchIndexProvider> = provider;
        let hooks = SyncHooks::new(Some(provider), store.clone(), IndexNames::default());
        (hooks, store)
    }

    #[tokio::test]
    async fn test_create_adds_document() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, store) = setup(provider.clone());
        store.save_job(&job("job-1")).unwrap();

        let outcome = hooks
            .try_sync(EntityKind::Job, &WriteAction::Create { id: "job-1".to_string() })
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Upserted(1));
        assert_eq!(
            provider.calls(),
            vec![Call::Add("jobs".to_string(), vec!["job-1".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_update_of_missing_record_deletes_document() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, _store) = setup(provider.clone());

        let outcome = hooks
            .try_sync(EntityKind::Job, &WriteAction::Update { id: "gone".to_string() })
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Removed(1));
        assert_eq!(
            provider.calls(),
            vec![Call::Delete("jobs".to_string(), "gone".to_string())]
        );
    }

    #[tokio::test]
    async fn test_event_upsert_uses_events_index() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, store) = setup(provider.clone());
        let starts = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        store.save_event(&EventRecord::new("ev-1", "Meetup", starts)).unwrap();

        hooks
            .try_sync(EntityKind::Event, &WriteAction::Upsert { id: "ev-1".to_string() })
            .await
            .unwrap();

        assert_eq!(
            provider.calls(),
            vec![Call::Add("events".to_string(), vec!["ev-1".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_bulk_write_is_one_replace() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, store) = setup(provider.clone());
        for i in 0..5 {
            store.save_job(&job(&format!("job-{i}"))).unwrap();
        }

        let outcome = hooks
            .try_sync(EntityKind::Job, &WriteAction::BulkWrite)
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Reindexed(5));
        assert_eq!(provider.calls(), vec![Call::Replace("jobs".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_bulk_delete_by_ids() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, _store) = setup(provider.clone());

        let action = WriteAction::BulkDelete(WritePredicate::IdIn(vec![
            "a".to_string(),
            "b".to_string(),
        ]));
        let outcome = hooks.try_sync(EntityKind::Job, &action).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Removed(2));
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_delete_by_other_predicate_is_skipped() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, _store) = setup(provider.clone());

        let action = WriteAction::BulkDelete(WritePredicate::Other("postedAt < now".to_string()));
        let outcome = hooks.try_sync(EntityKind::Job, &action).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_provider_is_noop() {
        let store = Arc::new(SqliteListingStore::in_memory().unwrap());
        let hooks = SyncHooks::new(None, store, IndexNames::default());

        assert!(!hooks.is_enabled());
        let outcome = hooks
            .try_sync(EntityKind::Job, &WriteAction::BulkWrite)
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped);
        assert_eq!(hooks.reindex(EntityKind::Job).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failures_do_not_reach_the_write() {
        let provider = Arc::new(RecordingProvider::failing());
        let (hooks, store) = setup(provider.clone());
        let record = job("job-1");

        let result: Result<JobRecord, String> = hooks
            .around_write(
                EntityKind::Job,
                async {
                    store.save_job(&record).map_err(|e| e.to_string())?;
                    Ok::<_, String>(record.clone())
                },
                |saved| Some(WriteAction::Create { id: saved.id.clone() }),
            )
            .await;

        assert_eq!(result.unwrap().id, "job-1");
        assert_eq!(provider.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_write_skips_sync() {
        let provider = Arc::new(RecordingProvider::new());
        let (hooks, _store) = setup(provider.clone());

        let result: Result<(), &str> = hooks
            .around_write(EntityKind::Job, async { Err("constraint violated") }, |_| {
                Some(WriteAction::BulkWrite)
            })
            .await;

        assert_eq!(result, Err("constraint violated"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reindex_propagates_errors() {
        let provider = Arc::new(RecordingProvider::failing());
        let (hooks, store) = setup(provider);
        store.save_job(&job("job-1")).unwrap();

        let err = hooks.reindex(EntityKind::Job).await.unwrap_err();
        assert!(matches!(err, SyncError::IndexError(_)));
    }
}
