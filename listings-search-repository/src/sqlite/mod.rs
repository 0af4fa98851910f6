//! SQLite implementation of the listing store.
//!
//! Array columns (skills, tags) are stored as JSON text and queried through
//! the JSON1 table-valued functions of the bundled SQLite.

mod schema;
mod sql;
mod store;

pub use schema::SCHEMA_VERSION;
pub use store::SqliteListingStore;
