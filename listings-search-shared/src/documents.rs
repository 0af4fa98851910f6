//! Flat documents stored in the search index.
//!
//! Documents only hold scalars and arrays. Optional display fields are
//! omitted from the JSON when absent rather than written as `null`, while
//! booleans and arrays are always present so each field keeps a stable type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

/// Common behaviour of every index document type.
pub trait IndexDocument: Serialize + DeserializeOwned + Send + Sync {
    /// The entity kind this document projects.
    const KIND: EntityKind;

    /// Primary key, identical to the source record id.
    fn id(&self) -> &str;
}

/// Index projection of a job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDocument {
    pub id: String,
    pub title: String,
    /// Sanitized, truncated plain text.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub remote: bool,
    pub skills: Vec<String>,
    pub tags: Vec<String>,
    /// Salary floor: the record's minimum, or its maximum when no minimum is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Unix seconds.
    pub posted_at: i64,
}

impl IndexDocument for JobDocument {
    const KIND: EntityKind = EntityKind::Job;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Index projection of an event listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub tags: Vec<String>,
    pub starts_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl IndexDocument for EventDocument {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_document_omits_absent_fields() {
        let doc = JobDocument {
            id: "job-1".to_string(),
            title: "Rust engineer".to_string(),
            description: String::new(),
            company_name: None,
            company_slug: None,
            region_code: None,
            city: None,
            country: None,
            remote: false,
            skills: vec![],
            tags: vec![],
            salary_min: None,
            salary_max: None,
            currency: None,
            experience: None,
            url: None,
            posted_at: 1_700_000_000,
        };

        let value = serde_json::to_value(&doc).unwrap();
        let object = value.as_object().unwrap();

        assert!(!object.contains_key("companyName"));
        assert!(!object.contains_key("salaryMin"));
        assert_eq!(value["skills"], json!([]));
        assert_eq!(value["remote"], json!(false));
        assert_eq!(value["postedAt"], json!(1_700_000_000));
    }

    #[test]
    fn test_event_document_from_index_hit() {
        let hit = json!({
            "id": "evt-1",
            "title": "RustConf",
            "description": "Talks",
            "online": true,
            "tags": ["rust"],
            "startsAt": 1_700_000_000,
            "_rankingScore": 0.9
        });

        let doc: EventDocument = serde_json::from_value(hit).unwrap();
        assert_eq!(doc.id(), "evt-1");
        assert!(doc.online);
        assert!(doc.venue.is_none());
        assert!(doc.ends_at.is_none());
    }
}
