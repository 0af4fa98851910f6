//! Record to index document mapping.
//!
//! Every function here is pure: the same record always yields the same
//! document, and nothing is read from or written to the outside world.

mod event;
mod job;
pub mod sanitize;

pub use event::{event_document, EVENT_DESCRIPTION_BUDGET};
pub use job::{job_document, JOB_DESCRIPTION_BUDGET};

use serde_json::Value;

use crate::errors::SyncError;
use listings_search_shared::IndexDocument;

/// Serialize a document into the JSON object the index provider accepts.
pub fn to_index_value<D: IndexDocument>(document: &D) -> Result<Value, SyncError> {
    serde_json::to_value(document).map_err(|e| {
        SyncError::mapping(format!(
            "Failed to serialize {} document {}: {}",
            D::KIND,
            document.id(),
            e
        ))
    })
}
