//! # Listings Search Sync
//!
//! This crate keeps the search index in step with the relational store.
//!
//! ## Architecture
//!
//! 1. **Mapper**: Pure transforms from records to flat index documents
//! 2. **Hooks**: Reacts to completed relational writes and mutates the index
//!
//! Synchronization is best-effort: a failed sync is logged and never fails
//! the write that triggered it.

pub mod errors;
pub mod hooks;
pub mod mapper;

pub use errors::SyncError;
pub use hooks::{SyncHooks, SyncOutcome, WriteAction, WritePredicate};
pub use mapper::{event_document, job_document, to_index_value};
