//! Write actions observed on the relational store.

use std::fmt;

/// The filter a delete was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePredicate {
    /// `id = ?`
    IdEquals(String),
    /// `id IN (...)`
    IdIn(Vec<String>),
    /// Anything else, kept only for logging.
    Other(String),
}

/// A completed write on an indexed entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAction {
    Create { id: String },
    Update { id: String },
    Upsert { id: String },
    /// `createMany` / `updateMany`; affected ids are not known.
    BulkWrite,
    Delete(WritePredicate),
    BulkDelete(WritePredicate),
}

impl WriteAction {
    /// Classify a store operation.
    ///
    /// # Arguments
    ///
    /// * `operation` - The operation name (`create`, `updateMany`, ...)
    /// * `result_id` - Id of the row the operation returned, if any
    /// * `predicate` - The filter the operation was issued with, if any
    ///
    /// # Returns
    ///
    /// `None` for reads, unknown operations, and single-row writes that did
    /// not report an id.
    pub fn from_operation(
        operation: &str,
        result_id: Option<&str>,
        predicate: Option<WritePredicate>,
    ) -> Option<Self> {
        let id = || result_id.map(str::to_string);
        match operation {
            "create" => id().map(|id| WriteAction::Create { id }),
            "update" => id().map(|id| WriteAction::Update { id }),
            "upsert" => id().map(|id| WriteAction::Upsert { id }),
            "createMany" | "updateMany" => Some(WriteAction::BulkWrite),
            "delete" => {
                let predicate = predicate
                    .or_else(|| id().map(WritePredicate::IdEquals))
                    .unwrap_or_else(|| WritePredicate::Other(String::new()));
                Some(WriteAction::Delete(predicate))
            }
            "deleteMany" => Some(WriteAction::BulkDelete(
                predicate.unwrap_or_else(|| WritePredicate::Other(String::new())),
            )),
            _ => None,
        }
    }

    /// Ids whose documents this action removes. Empty when the predicate
    /// does not name ids.
    pub fn deleted_ids(&self) -> Vec<&str> {
        match self {
            WriteAction::Delete(WritePredicate::IdEquals(id)) => vec![id.as_str()],
            WriteAction::BulkDelete(WritePredicate::IdIn(ids)) => {
                ids.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteAction::Create { id } => write!(f, "create({})", id),
            WriteAction::Update { id } => write!(f, "update({})", id),
            WriteAction::Upsert { id } => write!(f, "upsert({})", id),
            WriteAction::BulkWrite => write!(f, "bulk write"),
            WriteAction::Delete(_) => write!(f, "delete"),
            WriteAction::BulkDelete(_) => write!(f, "bulk delete"),
        }
    }
}
