//! HTTP implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! against the search engine's REST API, plus the per-entity index settings.

mod client;
mod index_config;

pub use client::HttpIndexClient;
pub use index_config::{event_index_settings, index_settings_for, job_index_settings};
