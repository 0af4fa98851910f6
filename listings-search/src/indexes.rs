//! Index preparation.

use tracing::info;

use listings_search_repository::http::index_settings_for;
use listings_search_repository::{IndexNames, SearchIndexError, SearchIndexProvider};
use listings_search_shared::entity::PRIMARY_KEY;
use listings_search_shared::EntityKind;

/// Create every listing index that is missing and apply its settings.
///
/// Safe to run repeatedly and concurrently with other instances.
pub async fn prepare_indexes(
    provider: &dyn SearchIndexProvider,
    names: &IndexNames,
) -> Result<(), SearchIndexError> {
    for kind in EntityKind::ALL {
        let index = names.for_kind(kind);
        provider.ensure_index(index, PRIMARY_KEY).await?;
        provider
            .update_settings(index, &index_settings_for(kind))
            .await?;
        info!(index = %index, entity = %kind, "Index prepared");
    }
    Ok(())
}
