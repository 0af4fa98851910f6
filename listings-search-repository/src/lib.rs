//! # Listings Search Repository
//!
//! This crate provides the storage side of listings search: the search engine
//! provider trait with its HTTP implementation (including task polling), and
//! the relational listing store trait with its SQLite implementation.

pub mod config;
pub mod errors;
pub mod http;
pub mod interfaces;
pub mod sqlite;
pub mod store_query;
pub mod types;

pub use config::{IndexClientConfig, IndexNames};
pub use errors::{SearchIndexError, StoreError};
pub use http::HttpIndexClient;
pub use interfaces::{ListingStore, SearchIndexProvider};
pub use sqlite::SqliteListingStore;
pub use store_query::{Column, Direction, OrderBy, Predicate, Scalar, StoreQuery};
pub use types::{IndexSettings, IndexStats, SearchRequest, SearchResponse};
