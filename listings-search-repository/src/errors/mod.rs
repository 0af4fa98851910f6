//! Error types for the listings search repository.

mod search_index_error;
mod store_error;

pub use search_index_error::SearchIndexError;
pub use store_error::StoreError;
