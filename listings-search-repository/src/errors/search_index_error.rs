//! Search index error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine over HTTP.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// The engine answered with a non-2xx status.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// A task did not reach a terminal state within the polling budget.
    #[error("Task {task_uid} not finished after {attempts} polls")]
    TaskTimeout { task_uid: u64, attempts: u32 },

    /// A task reached the `failed` state.
    #[error("Task {task_uid} failed: {message}")]
    TaskFailed {
        task_uid: u64,
        message: String,
        code: Option<String>,
    },

    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The client configuration is unusable (bad host URL, ...).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,
}

impl SearchIndexError {
    /// Create an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a task timeout error.
    pub fn task_timeout(task_uid: u64, attempts: u32) -> Self {
        Self::TaskTimeout { task_uid, attempts }
    }

    /// Create a task failure error.
    pub fn task_failed(task_uid: u64, message: impl Into<String>, code: Option<String>) -> Self {
        Self::TaskFailed {
            task_uid,
            message: message.into(),
            code,
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the engine reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Engine error code of a failed task, if any.
    pub fn task_error_code(&self) -> Option<&str> {
        match self {
            Self::TaskFailed { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchIndexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::ConnectionError(err.to_string())
        }
    }
}
