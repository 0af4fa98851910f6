use listings_search_shared::{EventDocument, EventRecord};

use super::sanitize::sanitize_description;

/// Character budget for event descriptions.
pub const EVENT_DESCRIPTION_BUDGET: usize = 400;

/// Map an event record (with resolved relations) to its index document.
pub fn event_document(record: &EventRecord) -> EventDocument {
    EventDocument {
        id: record.id.clone(),
        title: record.title.clone(),
        description: record
            .description
            .as_deref()
            .map(|html| sanitize_description(html, EVENT_DESCRIPTION_BUDGET))
            .unwrap_or_default(),
        company_name: record.company.as_ref().map(|c| c.name.clone()),
        company_slug: record.company.as_ref().map(|c| c.slug.clone()),
        region_code: record.region.as_ref().map(|r| r.code.clone()),
        city: record.city.clone(),
        country: record.country.clone(),
        online: record.online.unwrap_or(false),
        venue: record.venue.clone(),
        tags: record.tags.clone().unwrap_or_default(),
        starts_at: record.starts_at.timestamp(),
        ends_at: record.ends_at.map(|t| t.timestamp()),
        url: record.url.clone(),
    }
}
