//! # Listings Search Shared
//!
//! Types shared by every crate of the listings search system: the relational
//! records, the flat documents stored in the search index, the already
//! validated query objects and the paginated response shape.

pub mod documents;
pub mod entity;
pub mod page;
pub mod query;
pub mod records;

pub use documents::{EventDocument, IndexDocument, JobDocument};
pub use entity::{EntityKind, ParseEntityKindError};
pub use page::{clamp_page, page_offset, total_pages, Page};
pub use query::{EventQuery, EventSort, JobQuery, JobSort, ParseSortError};
pub use records::{Company, EventRecord, JobRecord, Region};
