//! HTTP search engine client.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! on top of the engine's REST API. Writes are asynchronous on the engine
//! side: every write returns a task handle which is polled until it reaches a
//! terminal state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::IndexClientConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{
    IndexList, IndexSettings, IndexStats, SearchRequest, SearchResponse, Task, TaskInfo,
    TaskStatus,
};
use listings_search_shared::entity::PRIMARY_KEY;

/// Engine error code for a creation racing another creator.
const INDEX_ALREADY_EXISTS: &str = "index_already_exists";

/// HTTP client for the search engine.
///
/// # Example
///
/// ```ignore
/// use listings_search_repository::{HttpIndexClient, IndexClientConfig, SearchIndexProvider};
///
/// let config = IndexClientConfig::new("http://localhost:7700").with_api_key("master-key");
/// let client = HttpIndexClient::new(&config)?;
///
/// client.ensure_index("jobs", "id").await?;
/// client.add_documents("jobs", &[serde_json::json!({ "id": "job-1", "title": "Rust" })]).await?;
/// ```
pub struct HttpIndexClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl HttpIndexClient {
    /// Create a new client for the configured host.
    ///
    /// # Returns
    ///
    /// * `Ok(HttpIndexClient)` - A new client instance
    /// * `Err(SearchIndexError::ConfigError)` - If the host is not a usable base URL
    pub fn new(config: &IndexClientConfig) -> Result<Self, SearchIndexError> {
        let base_url = Url::parse(&config.host)
            .map_err(|e| SearchIndexError::config(format!("Invalid host {}: {}", config.host, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SearchIndexError::config(format!(
                "Host {} cannot be used as a base URL",
                config.host
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchIndexError::config(e.to_string()))?;

        info!(
            host = %config.host,
            authenticated = config.api_key.is_some(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            max_poll_attempts = config.max_poll_attempts,
            "Created search index client"
        );

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            poll_interval: config.poll_interval,
            max_poll_attempts: config.max_poll_attempts,
        })
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchIndexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SearchIndexError::config("Host cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send a request and turn any non-2xx answer into `SearchIndexError::Http`.
    async fn execute(&self, builder: RequestBuilder) -> Result<Response, SearchIndexError> {
        let response = builder
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            debug!(url = %url, body = %body, "Resource not found");
        } else {
            warn!(url = %url, status = %status, body = %body, "Search engine request failed");
        }
        Err(SearchIndexError::http(status.as_u16(), body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SearchIndexError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| SearchIndexError::parse(e.to_string()))
    }

    async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T, SearchIndexError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.request(method, url).json(body)).await?;
        Self::read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SearchIndexError> {
        let response = self.execute(self.request(Method::GET, url)).await?;
        Self::read_json(response).await
    }

    /// `GET /indexes`.
    pub async fn list_indexes(&self) -> Result<IndexList, SearchIndexError> {
        let url = self.endpoint(&["indexes"])?;
        self.get_json(url).await
    }

    /// `GET /indexes/:name`.
    pub async fn get_index(&self, index: &str) -> Result<Value, SearchIndexError> {
        let url = self.endpoint(&["indexes", index])?;
        self.get_json(url).await
    }

    /// `POST /indexes`. Returns the enqueued creation task.
    pub async fn create_index(
        &self,
        index: &str,
        primary_key: &str,
    ) -> Result<TaskInfo, SearchIndexError> {
        let url = self.endpoint(&["indexes"])?;
        self.send_json(
            Method::POST,
            url,
            &json!({ "uid": index, "primaryKey": primary_key }),
        )
        .await
    }

    /// `PATCH /indexes/:name/settings`. Returns the enqueued task.
    pub async fn enqueue_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<TaskInfo, SearchIndexError> {
        let url = self.endpoint(&["indexes", index, "settings"])?;
        self.send_json(Method::PATCH, url, settings).await
    }

    /// `POST` (upsert) or `PUT` (overwrite) `/indexes/:name/documents`.
    pub async fn enqueue_documents(
        &self,
        method: Method,
        index: &str,
        documents: &[Value],
    ) -> Result<TaskInfo, SearchIndexError> {
        let mut url = self.endpoint(&["indexes", index, "documents"])?;
        url.query_pairs_mut().append_pair("primaryKey", PRIMARY_KEY);
        self.send_json(method, url, documents).await
    }

    /// `DELETE /indexes/:name/documents/:id`. `None` when the document was
    /// already absent.
    pub async fn enqueue_delete(
        &self,
        index: &str,
        id: &str,
    ) -> Result<Option<TaskInfo>, SearchIndexError> {
        let url = self.endpoint(&["indexes", index, "documents", id])?;
        match self.execute(self.request(Method::DELETE, url)).await {
            Ok(response) => Self::read_json(response).await.map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET /tasks/:uid`.
    pub async fn get_task(&self, task_uid: u64) -> Result<Task, SearchIndexError> {
        let uid = task_uid.to_string();
        let url = self.endpoint(&["tasks", &uid])?;
        self.get_json(url).await
    }

    /// Poll a task until it succeeds, fails, or the attempt budget runs out.
    ///
    /// Polls happen every `poll_interval`, at most `max_poll_attempts` times.
    ///
    /// # Returns
    ///
    /// * `Ok(Task)` - The task in the `succeeded` state
    /// * `Err(SearchIndexError::TaskFailed)` - If the engine reported a failure
    /// * `Err(SearchIndexError::TaskTimeout)` - If no terminal state was observed
    #[instrument(skip(self, task), fields(task_uid = task.task_uid))]
    pub async fn wait_for_task(&self, task: &TaskInfo) -> Result<Task, SearchIndexError> {
        for attempt in 1..=self.max_poll_attempts {
            let current = self.get_task(task.task_uid).await?;
            if !current.status.is_terminal() {
                if attempt < self.max_poll_attempts {
                    tokio::time::sleep(self.poll_interval).await;
                }
                continue;
            }

            if current.status == TaskStatus::Succeeded {
                debug!(attempt = attempt, "Task succeeded");
                return Ok(current);
            }
            let (message, code) = match current.error {
                Some(err) => (err.message, err.code),
                None => (format!("task ended as {:?}", current.status), None),
            };
            error!(message = %message, code = ?code, "Task failed");
            return Err(SearchIndexError::task_failed(task.task_uid, message, code));
        }

        warn!(attempts = self.max_poll_attempts, "Task did not finish in time");
        Err(SearchIndexError::task_timeout(
            task.task_uid,
            self.max_poll_attempts,
        ))
    }

    async fn write_documents(
        &self,
        method: Method,
        index: &str,
        documents: &[Value],
    ) -> Result<(), SearchIndexError> {
        if documents.is_empty() {
            debug!(index = %index, "No documents to write");
            return Ok(());
        }

        let task = self.enqueue_documents(method, index, documents).await?;
        self.wait_for_task(&task).await?;
        debug!(index = %index, count = documents.len(), "Documents written");
        Ok(())
    }
}

#[async_trait]
impl SearchIndexProvider for HttpIndexClient {
    /// Create the index when, and only when, the lookup answers 404.
    ///
    /// A creation task failing with `index_already_exists` means another
    /// process created it concurrently, which satisfies the call.
    #[instrument(skip(self))]
    async fn ensure_index(&self, index: &str, primary_key: &str) -> Result<(), SearchIndexError> {
        match self.get_index(index).await {
            Ok(_) => {
                debug!("Index already exists");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                let task = self.create_index(index, primary_key).await?;
                match self.wait_for_task(&task).await {
                    Ok(_) => {
                        info!(index = %index, primary_key = %primary_key, "Created index");
                        Ok(())
                    }
                    Err(e) if e.task_error_code() == Some(INDEX_ALREADY_EXISTS) => {
                        debug!("Index created concurrently");
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, settings))]
    async fn update_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<(), SearchIndexError> {
        let task = self.enqueue_settings(index, settings).await?;
        self.wait_for_task(&task).await?;
        info!(index = %index, "Index settings applied");
        Ok(())
    }

    async fn settings(&self, index: &str) -> Result<IndexSettings, SearchIndexError> {
        let url = self.endpoint(&["indexes", index, "settings"])?;
        self.get_json(url).await
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add_documents(&self, index: &str, documents: &[Value]) -> Result<(), SearchIndexError> {
        self.write_documents(Method::POST, index, documents).await
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn replace_documents(
        &self,
        index: &str,
        documents: &[Value],
    ) -> Result<(), SearchIndexError> {
        self.write_documents(Method::PUT, index, documents).await
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, index: &str, id: &str) -> Result<(), SearchIndexError> {
        match self.enqueue_delete(index, id).await? {
            Some(task) => {
                self.wait_for_task(&task).await?;
                debug!("Document deleted");
            }
            None => debug!("Document already absent"),
        }
        Ok(())
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, SearchIndexError> {
        let url = self.endpoint(&["indexes", index, "search"])?;
        let call = self.send_json::<_, SearchResponse>(Method::POST, url, request);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(index = %index, "Search cancelled");
                Err(SearchIndexError::Cancelled)
            }
            result = call => result,
        }
    }

    async fn stats(&self, index: &str) -> Result<IndexStats, SearchIndexError> {
        let url = self.endpoint(&["indexes", index, "stats"])?;
        self.get_json(url).await
    }
}
