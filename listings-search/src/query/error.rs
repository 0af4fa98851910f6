//! Query error types.

use listings_search_repository::{SearchIndexError, StoreError};
use thiserror::Error;

/// Errors returned to the caller of a listing query.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The search engine failed to answer.
    #[error("Index error: {0}")]
    IndexError(SearchIndexError),

    /// The relational fallback failed to answer.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// A hit could not be decoded into a document.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// The query violates the pagination contract.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The caller cancelled the query.
    #[error("Query cancelled")]
    Cancelled,
}

impl QueryError {
    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create an invalid query error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }
}

impl From<SearchIndexError> for QueryError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::Cancelled => Self::Cancelled,
            other => Self::IndexError(other),
        }
    }
}
