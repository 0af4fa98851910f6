//! Interface definitions for the search engine and the relational store.
//!
//! These traits allow dependency injection: the sync hooks and the query
//! service receive `Arc<dyn ...>` handles and never reach for globals.

mod listing_store;
mod search_index_provider;

pub use listing_store::ListingStore;
pub use search_index_provider::SearchIndexProvider;
