//! Synchronization hooks run after relational writes.

mod action;
mod sync;

pub use action::{WriteAction, WritePredicate};
pub use sync::{SyncHooks, SyncOutcome};
