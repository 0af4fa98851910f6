//! Dual-path listing queries.
//!
//! Queries go to the search index when one is configured and to the
//! relational store otherwise. Both paths return the same `Page` shape and
//! apply the same pagination clamp.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::error::QueryError;
use super::fallback::{event_store_query, job_store_query};
use super::filters::{event_filters, event_sort, job_filters, job_sort, text_query};
use listings_search_repository::{
    IndexNames, ListingStore, SearchIndexProvider, SearchRequest, StoreError,
};
use listings_search_shared::{
    clamp_page, page_offset, total_pages, EventDocument, EventQuery, IndexDocument, JobDocument,
    JobQuery, Page,
};
use listings_search_sync::{event_document, job_document};

/// Answers filtered, paginated listing queries.
pub struct QueryService {
    provider: Option<Arc<dyn SearchIndexProvider>>,
    store: Arc<dyn ListingStore>,
    indexes: IndexNames,
}

/// Parts of an index search shared by every entity kind.
struct IndexSearch {
    q: Option<String>,
    filter: Vec<String>,
    sort: Vec<String>,
    page: u32,
    per_page: u32,
}

impl QueryService {
    pub fn new(
        provider: Option<Arc<dyn SearchIndexProvider>>,
        store: Arc<dyn ListingStore>,
        indexes: IndexNames,
    ) -> Self {
        Self {
            provider,
            store,
            indexes,
        }
    }

    /// Whether queries are answered by the search index.
    pub fn uses_index(&self) -> bool {
        self.provider.is_some()
    }

    /// Search job listings.
    ///
    /// # Arguments
    ///
    /// * `query` - Validated filters, sort and pagination
    /// * `cancel` - Aborts the query when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Page<JobDocument>)` - The served page; `page` may be lower than requested
    /// * `Err(QueryError::InvalidQuery)` - If `page` or `per_page` is zero
    /// * `Err(QueryError::Cancelled)` - If `cancel` fired first
    #[instrument(skip(self, query, cancel), fields(page = query.page, per_page = query.per_page))]
    pub async fn search_jobs(
        &self,
        query: &JobQuery,
        cancel: &CancellationToken,
    ) -> Result<Page<JobDocument>, QueryError> {
        validate(query.page, query.per_page)?;

        match &self.provider {
            Some(provider) => {
                let search = IndexSearch {
                    q: text_query(&query.q),
                    filter: job_filters(query),
                    sort: job_sort(query.sort),
                    page: query.page,
                    per_page: query.per_page,
                };
                self.search_index(provider.as_ref(), &self.indexes.jobs, search, cancel)
                    .await
            }
            None => {
                let store_query = job_store_query(query);
                let total = cancellable(cancel, self.store.count(&store_query)).await?;
                let page = clamp_page(query.page, total_pages(total, query.per_page));
                let records = cancellable(
                    cancel,
                    self.store.find_jobs(
                        &store_query,
                        page_offset(page, query.per_page),
                        query.per_page as usize,
                    ),
                )
                .await?;

                debug!(total = total, page = page, "Jobs served from store");
                Ok(Page::new(records, total, page, query.per_page)
                    .map(|record| job_document(&record)))
            }
        }
    }

    /// Search event listings.
    #[instrument(skip(self, query, cancel), fields(page = query.page, per_page = query.per_page))]
    pub async fn search_events(
        &self,
        query: &EventQuery,
        cancel: &CancellationToken,
    ) -> Result<Page<EventDocument>, QueryError> {
        validate(query.page, query.per_page)?;

        match &self.provider {
            Some(provider) => {
                let search = IndexSearch {
                    q: text_query(&query.q),
                    filter: event_filters(query),
                    sort: event_sort(query.sort),
                    page: query.page,
                    per_page: query.per_page,
                };
                self.search_index(provider.as_ref(), &self.indexes.events, search, cancel)
                    .await
            }
            None => {
                let store_query = event_store_query(query);
                let total = cancellable(cancel, self.store.count(&store_query)).await?;
                let page = clamp_page(query.page, total_pages(total, query.per_page));
                let records = cancellable(
                    cancel,
                    self.store.find_events(
                        &store_query,
                        page_offset(page, query.per_page),
                        query.per_page as usize,
                    ),
                )
                .await?;

                debug!(total = total, page = page, "Events served from store");
                Ok(Page::new(records, total, page, query.per_page)
                    .map(|record| event_document(&record)))
            }
        }
    }

    /// Run the search, re-running it once if the requested page lies past
    /// the last page so the items always belong to the returned page.
    async fn search_index<D: IndexDocument>(
        &self,
        provider: &dyn SearchIndexProvider,
        index: &str,
        search: IndexSearch,
        cancel: &CancellationToken,
    ) -> Result<Page<D>, QueryError> {
        let per_page = search.per_page;
        let mut request = SearchRequest::new(
            search.q,
            page_offset(search.page, per_page),
            per_page as usize,
        )
        .with_filter(search.filter)
        .with_sort(search.sort);

        let mut response = provider.search(index, &request, cancel).await?;
        let mut page = clamp_page(
            search.page,
            total_pages(response.estimated_total_hits, per_page),
        );

        if page != search.page {
            debug!(
                index = %index,
                requested = search.page,
                served = page,
                "Requested page out of range, searching again"
            );
            request.offset = page_offset(page, per_page);
            response = provider.search(index, &request, cancel).await?;
            // The total may have moved between the two searches.
            page = clamp_page(page, total_pages(response.estimated_total_hits, per_page));
        }

        let items = response
            .hits
            .into_iter()
            .map(serde_json::from_value::<D>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| QueryError::decode(format!("Malformed {} hit: {}", D::KIND, e)))?;

        debug!(
            index = %index,
            total = response.estimated_total_hits,
            page = page,
            "Served from index"
        );
        Ok(Page::new(items, response.estimated_total_hits, page, per_page))
    }
}

fn validate(page: u32, per_page: u32) -> Result<(), QueryError> {
    if page == 0 {
        return Err(QueryError::invalid("page must be at least 1"));
    }
    if per_page == 0 {
        return Err(QueryError::invalid("perPage must be at least 1"));
    }
    Ok(())
}

async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QueryError::Cancelled),
        result = call => result.map_err(QueryError::from),
    }
}
