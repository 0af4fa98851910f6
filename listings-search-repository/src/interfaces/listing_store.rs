//! Relational store trait definition.
//!
//! The relational store is the source of truth. This trait covers only the
//! reads the sync hooks and the query fallback need.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::store_query::StoreQuery;
use listings_search_shared::{EventRecord, JobRecord};

/// Read access to listings and their relations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch one job with company and region resolved.
    async fn find_job(&self, id: &str) -> Result<Option<JobRecord>, StoreError>;

    /// Fetch one event with company and region resolved.
    async fn find_event(&self, id: &str) -> Result<Option<EventRecord>, StoreError>;

    /// Every job, used by full reindexing.
    async fn all_jobs(&self) -> Result<Vec<JobRecord>, StoreError>;

    /// Every event, used by full reindexing.
    async fn all_events(&self) -> Result<Vec<EventRecord>, StoreError>;

    /// Number of rows of `query.kind` matching the query.
    async fn count(&self, query: &StoreQuery) -> Result<u64, StoreError>;

    /// A window of jobs matching the query, in query order.
    async fn find_jobs(
        &self,
        query: &StoreQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<JobRecord>, StoreError>;

    /// A window of events matching the query, in query order.
    async fn find_events(
        &self,
        query: &StoreQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<EventRecord>, StoreError>;
}
