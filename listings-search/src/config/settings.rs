//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::ListingsError;
use listings_search_repository::config::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use listings_search_repository::{IndexClientConfig, IndexNames};
use listings_search_shared::EntityKind;

/// Default listings database file.
const DEFAULT_DATABASE_PATH: &str = "listings.db";

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Master switch for the search index.
    pub enabled: bool,
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub indexes: IndexNames,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub database_path: PathBuf,
}

impl SearchConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_ENABLED`: Use the search index (default: false)
    /// - `SEARCH_HOST`: Search engine URL
    /// - `SEARCH_API_KEY`: Bearer token for the search engine
    /// - `SEARCH_JOBS_INDEX`: Jobs index name (default: jobs)
    /// - `SEARCH_EVENTS_INDEX`: Events index name (default: events)
    /// - `SEARCH_TASK_POLL_INTERVAL_MS`: Task poll interval (default: 100)
    /// - `SEARCH_TASK_MAX_ATTEMPTS`: Task poll attempts (default: 50)
    /// - `DATABASE_PATH`: Listings database file (default: listings.db)
    pub fn from_env() -> Result<Self, ListingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ListingsError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let enabled = match get("SEARCH_ENABLED") {
            Some(value) => parse_bool("SEARCH_ENABLED", &value)?,
            None => false,
        };
        let poll_interval = match get("SEARCH_TASK_POLL_INTERVAL_MS") {
            Some(value) => Duration::from_millis(parse_number("SEARCH_TASK_POLL_INTERVAL_MS", &value)?),
            None => DEFAULT_POLL_INTERVAL,
        };
        let max_poll_attempts = match get("SEARCH_TASK_MAX_ATTEMPTS") {
            Some(value) => parse_number("SEARCH_TASK_MAX_ATTEMPTS", &value)?,
            None => DEFAULT_MAX_POLL_ATTEMPTS,
        };
        if max_poll_attempts == 0 {
            return Err(ListingsError::config("SEARCH_TASK_MAX_ATTEMPTS must be at least 1"));
        }

        let indexes = IndexNames::new(
            get("SEARCH_JOBS_INDEX").unwrap_or_else(|| EntityKind::Job.default_index_name().to_string()),
            get("SEARCH_EVENTS_INDEX")
                .unwrap_or_else(|| EntityKind::Event.default_index_name().to_string()),
        );

        Ok(Self {
            enabled,
            host: get("SEARCH_HOST"),
            api_key: get("SEARCH_API_KEY"),
            indexes,
            poll_interval,
            max_poll_attempts,
            database_path: get("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
        })
    }

    /// Client configuration, or `None` when the index is disabled or no
    /// host is set. `None` sends every query to the relational store.
    pub fn client_config(&self) -> Option<IndexClientConfig> {
        if !self.enabled {
            return None;
        }
        let host = self.host.as_ref()?;

        let mut config = IndexClientConfig::new(host.clone())
            .with_task_polling(self.poll_interval, self.max_poll_attempts);
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        Some(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ListingsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ListingsError::config(format!(
            "{} must be a boolean, got {:?}",
            key, value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ListingsError> {
    value
        .parse()
        .map_err(|_| ListingsError::config(format!("{} must be a number, got {:?}", key, value)))
}
