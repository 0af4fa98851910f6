//! Request and response types exchanged with the search engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of an engine task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    #[serde(alias = "processing")]
    Running,
    Succeeded,
    Failed,
    /// Cancelled on the engine side; treated as a failure.
    #[serde(alias = "canceled")]
    Cancelled,
}

impl TaskStatus {
    /// Whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// Handle returned by an enqueued write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Error details attached to a failed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Task state as reported by `GET /tasks/:uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub error: Option<TaskError>,
}

/// Body of `POST /indexes/:name/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub offset: usize,
    pub limit: usize,
    /// Conjunction of filter expressions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
    /// `field:asc|desc` keys; empty means relevance ranking.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
}

impl SearchRequest {
    pub fn new(q: Option<String>, offset: usize, limit: usize) -> Self {
        Self {
            q,
            offset,
            limit,
            filter: Vec::new(),
            sort: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: Vec<String>) -> Self {
        self.sort = sort;
        self
    }
}

/// Result of a search call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<Value>,
    #[serde(default)]
    pub estimated_total_hits: u64,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl SearchResponse {
    /// An empty response with no hits.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Document statistics of a single index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub number_of_documents: u64,
    #[serde(default)]
    pub is_indexing: bool,
    #[serde(default)]
    pub field_distribution: HashMap<String, u64>,
}

/// Index settings. Unset fields are left untouched by a settings update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displayed_attributes: Option<Vec<String>>,
}

/// One entry of `GET /indexes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    #[serde(default)]
    pub primary_key: Option<String>,
}

/// Page of index descriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexList {
    pub results: Vec<IndexInfo>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_status_accepts_engine_aliases() {
        let task: Task = serde_json::from_value(json!({
            "uid": 3,
            "indexUid": "jobs",
            "status": "processing"
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Running);
        assert!(!task.status.is_terminal());

        let status: TaskStatus = serde_json::from_value(json!("canceled")).unwrap();
        assert!(status.is_terminal());
    }

    #[test]
    fn test_search_request_skips_empty_lists() {
        let request = SearchRequest::new(None, 0, 20);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "offset": 0, "limit": 20 }));

        let request = SearchRequest::new(Some("rust".to_string()), 5, 5)
            .with_filter(vec!["remote = true".to_string()])
            .with_sort(vec!["salaryMin:desc".to_string()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["filter"], json!(["remote = true"]));
        assert_eq!(value["sort"], json!(["salaryMin:desc"]));
    }
}
