//! Error types for index synchronization.

use listings_search_repository::{SearchIndexError, StoreError};
use thiserror::Error;

/// Errors that can occur while synchronizing the index with the store.
///
/// These never reach the caller of a write: the hooks log and discard them.
/// Only an explicit reindex propagates them.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The search engine rejected or failed a call.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),

    /// The authoritative record could not be read.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// A record could not be turned into an index document.
    #[error("Mapping error: {0}")]
    MappingError(String),
}

impl SyncError {
    /// Create a mapping error.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::MappingError(msg.into())
    }
}
