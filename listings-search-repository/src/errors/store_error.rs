//! Relational store error types.

use thiserror::Error;

/// Errors that can occur while reading listings from the relational store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The database rejected or failed a statement.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A row could not be turned into a record.
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// The store cannot serve requests (poisoned lock, closed pool, ...).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Create a mapping error.
    pub fn mapping(msg: impl Into<String>) -> Self {
        Self::MappingError(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}
