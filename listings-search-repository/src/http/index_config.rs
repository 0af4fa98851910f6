//! Index settings for the listing indexes.
//!
//! Attribute names are the camelCase field names of the index documents.
//! Only attributes listed here can appear in filter or sort expressions.

use listings_search_shared::EntityKind;

use crate::types::IndexSettings;

fn names(fields: &[&str]) -> Option<Vec<String>> {
    Some(fields.iter().map(|f| f.to_string()).collect())
}

/// Settings for the jobs index.
///
/// - **searchable**: title, description, company name, city and the skill and tag lists
/// - **filterable**: every field a job query can constrain
/// - **sortable**: salary floor and posting date
pub fn job_index_settings() -> IndexSettings {
    IndexSettings {
        searchable_attributes: names(&[
            "title",
            "description",
            "companyName",
            "skills",
            "tags",
            "city",
        ]),
        filterable_attributes: names(&[
            "skills",
            "tags",
            "remote",
            "city",
            "country",
            "regionCode",
            "salaryMin",
            "currency",
            "experience",
        ]),
        sortable_attributes: names(&["salaryMin", "postedAt"]),
        displayed_attributes: None,
    }
}

/// Settings for the events index.
pub fn event_index_settings() -> IndexSettings {
    IndexSettings {
        searchable_attributes: names(&["title", "description", "companyName", "venue", "tags", "city"]),
        filterable_attributes: names(&[
            "tags",
            "online",
            "city",
            "country",
            "regionCode",
            "startsAt",
        ]),
        sortable_attributes: names(&["startsAt"]),
        displayed_attributes: None,
    }
}

/// Settings for the index holding `kind`.
pub fn index_settings_for(kind: EntityKind) -> IndexSettings {
    match kind {
        EntityKind::Job => job_index_settings(),
        EntityKind::Event => event_index_settings(),
    }
}
