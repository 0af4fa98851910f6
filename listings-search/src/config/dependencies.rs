//! Dependency initialization and wiring for listings search.

use std::sync::Arc;
use tracing::info;

use crate::config::SearchConfig;
use crate::query::QueryService;
use crate::ListingsError;
use listings_search_repository::{HttpIndexClient, ListingStore, SearchIndexProvider, SqliteListingStore};
use listings_search_sync::SyncHooks;

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub config: SearchConfig,
    pub store: Arc<SqliteListingStore>,
    /// `None` when the search index is disabled or unconfigured.
    pub index_client: Option<Arc<HttpIndexClient>>,
    pub hooks: SyncHooks,
    pub queries: QueryService,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`SearchConfig::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ListingsError)` - If the configuration is invalid or the store cannot be opened
    pub fn new() -> Result<Self, ListingsError> {
        Self::from_config(SearchConfig::from_env()?)
    }

    /// Initialize all dependencies from an explicit configuration.
    pub fn from_config(config: SearchConfig) -> Result<Self, ListingsError> {
        let store = Arc::new(SqliteListingStore::open(&config.database_path)?);
        Self::with_store(config, store)
    }

    /// Wire the services around an already opened store.
    pub fn with_store(
        config: SearchConfig,
        store: Arc<SqliteListingStore>,
    ) -> Result<Self, ListingsError> {
        let index_client = match config.client_config() {
            Some(client_config) => {
                let client = HttpIndexClient::new(&client_config)?;
                info!(host = %client_config.host, "Search index enabled");
                Some(Arc::new(client))
            }
            None => {
                info!("Search index disabled, queries use the listings database");
                None
            }
        };

        let provider = index_client
            .clone()
            .map(|client| client as Arc<dyn SearchIndexProvider>);
        let listing_store: Arc<dyn ListingStore> = store.clone();

        let hooks = SyncHooks::new(provider.clone(), listing_store.clone(), config.indexes.clone());
        let queries = QueryService::new(provider, listing_store, config.indexes.clone());

        Ok(Self {
            config,
            store,
            index_client,
            hooks,
            queries,
        })
    }

    /// The index client as a provider, if configured.
    pub fn provider(&self) -> Option<Arc<dyn SearchIndexProvider>> {
        self.index_client
            .clone()
            .map(|client| client as Arc<dyn SearchIndexProvider>)
    }
}
