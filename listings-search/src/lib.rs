//! # Listings Search
//!
//! Search over job and event listings.
//!
//! Queries are answered by an external search engine when one is
//! configured and by the relational store otherwise. Writes to the store
//! are mirrored into the index by the sync hooks; this crate wires both
//! paths together and provides the operator CLI.

pub mod config;
pub mod indexes;
pub mod query;
pub mod seed;

pub use config::{Dependencies, SearchConfig};
pub use query::{QueryError, QueryService};

use thiserror::Error;

/// Errors that can occur during startup or while running a command.
#[derive(Error, Debug)]
pub enum ListingsError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search engine error.
    #[error("Search index error: {0}")]
    IndexError(#[from] listings_search_repository::SearchIndexError),

    /// Relational store error.
    #[error("Store error: {0}")]
    StoreError(#[from] listings_search_repository::StoreError),

    /// Index synchronization error.
    #[error("Sync error: {0}")]
    SyncError(#[from] listings_search_sync::SyncError),

    /// Query error.
    #[error("Query error: {0}")]
    QueryError(#[from] QueryError),

    /// Input that could not be parsed (seed files, query filters).
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ListingsError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
