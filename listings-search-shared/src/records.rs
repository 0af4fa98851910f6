//! Authoritative records as read from the relational store.
//!
//! Records carry their resolved relations. Nullable columns stay `Option`
//! here; normalization into stable index types happens in the mapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Company owning a job or organizing an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Geographic region a listing belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    /// Short code used for filtering (e.g. `BE`, `IDF`).
    pub code: String,
    pub name: String,
}

/// A job listing with its relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    /// Rich-text (HTML) description as entered by the poster.
    pub description: Option<String>,
    pub company: Option<Company>,
    pub region: Option<Region>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub remote: Option<bool>,
    pub skills: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: Option<String>,
    pub experience: Option<String>,
    pub url: Option<String>,
    pub posted_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a job with the required fields; everything else is unset.
    pub fn new(id: impl Into<String>, title: impl Into<String>, posted_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            company: None,
            region: None,
            city: None,
            country: None,
            remote: None,
            skills: None,
            tags: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            experience: None,
            url: None,
            posted_at,
        }
    }
}

/// An event listing with its relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Organizer.
    pub company: Option<Company>,
    pub region: Option<Region>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub online: Option<bool>,
    pub venue: Option<String>,
    pub tags: Option<Vec<String>>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl EventRecord {
    /// Create an event with the required fields; everything else is unset.
    pub fn new(id: impl Into<String>, title: impl Into<String>, starts_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            company: None,
            region: None,
            city: None,
            country: None,
            online: None,
            venue: None,
            tags: None,
            starts_at,
            ends_at: None,
            url: None,
        }
    }
}
