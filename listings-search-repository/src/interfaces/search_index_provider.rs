//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations so
//! the sync hooks and the query service can be driven by the HTTP client in
//! production and by in-memory fakes in tests.

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::errors::SearchIndexError;
use crate::types::{IndexSettings, IndexStats, SearchRequest, SearchResponse};

/// Abstracts the search engine behind index-scoped document operations.
///
/// Write methods return once the engine has finished applying the write:
/// implementations backed by an asynchronous task queue wait for the task to
/// reach a terminal state before returning.
///
/// Documents are passed as JSON objects keyed by `id`.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Create the index if it does not exist yet.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    /// * `primary_key` - The document field used as primary key
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index exists or was created
    /// * `Err(SearchIndexError)` - If the lookup failed for any reason other
    ///   than the index being absent, or if creation failed
    async fn ensure_index(&self, index: &str, primary_key: &str) -> Result<(), SearchIndexError>;

    /// Apply settings (searchable, filterable and sortable attributes).
    async fn update_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError>;

    /// Read the effective settings of an index.
    async fn settings(&self, index: &str) -> Result<IndexSettings, SearchIndexError>;

    /// Upsert documents by id.
    async fn add_documents(&self, index: &str, documents: &[Value]) -> Result<(), SearchIndexError>;

    /// Overwrite the documents whose ids appear in the batch.
    ///
    /// Documents already in the index but absent from `documents` are kept.
    async fn replace_documents(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<(), SearchIndexError>;

    /// Delete one document.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was deleted or did not exist
    /// * `Err(SearchIndexError)` - If the deletion fails
    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchIndexError>;

    /// Run a search.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse)` - Hits and the estimated total
    /// * `Err(SearchIndexError::Cancelled)` - If `cancel` fired first
    /// * `Err(SearchIndexError)` - If the search fails
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchIndexError>;

    /// Document statistics of an index.
    async fn stats(&self, index: &str) -> Result<IndexStats, SearchIndexError>;
}
