//! Listing queries against the search index or the relational store.

mod error;
pub mod fallback;
pub mod filters;
mod service;

pub use error::QueryError;
pub use service::QueryService;
