//! Already validated query objects.
//!
//! Upstream request parsing produces these; nothing in the core validates
//! them again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default page size when the caller does not pick one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Returned when a sort key is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sort order: {0}")]
pub struct ParseSortError(pub String);

/// Sort orders available on job listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSort {
    /// Relevance ranking by the search engine.
    #[default]
    Relevant,
    /// Newest postings first.
    Recent,
    /// Highest salary floor first.
    SalaryDesc,
}

impl JobSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSort::Relevant => "relevant",
            JobSort::Recent => "recent",
            JobSort::SalaryDesc => "salary_desc",
        }
    }
}

impl fmt::Display for JobSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobSort {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevant" => Ok(JobSort::Relevant),
            "recent" => Ok(JobSort::Recent),
            "salary_desc" => Ok(JobSort::SalaryDesc),
            other => Err(ParseSortError(other.to_string())),
        }
    }
}

/// Sort orders available on event listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSort {
    #[default]
    Relevant,
    /// Soonest start first.
    Upcoming,
    /// Latest start first.
    Recent,
}

impl EventSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSort::Relevant => "relevant",
            EventSort::Upcoming => "upcoming",
            EventSort::Recent => "recent",
        }
    }
}

impl fmt::Display for EventSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSort {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevant" => Ok(EventSort::Relevant),
            "upcoming" => Ok(EventSort::Upcoming),
            "recent" => Ok(EventSort::Recent),
            other => Err(ParseSortError(other.to_string())),
        }
    }
}

/// Filters, sort and pagination for job listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobQuery {
    /// Free text.
    pub q: Option<String>,
    pub city: Option<String>,
    /// Region code.
    pub region: Option<String>,
    pub country: Option<String>,
    pub remote: Option<bool>,
    /// Every skill must be present on the listing.
    pub skills: Vec<String>,
    pub tags: Vec<String>,
    /// Minimum acceptable salary, compared against the salary floor.
    pub salary_min: Option<i64>,
    pub currency: Option<String>,
    pub experience: Option<String>,
    pub sort: JobSort,
    /// 1-based.
    pub page: u32,
    pub per_page: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            q: None,
            city: None,
            region: None,
            country: None,
            remote: None,
            skills: Vec::new(),
            tags: Vec::new(),
            salary_min: None,
            currency: None,
            experience: None,
            sort: JobSort::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Filters, sort and pagination for event listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub online: Option<bool>,
    pub tags: Vec<String>,
    pub sort: EventSort,
    pub page: u32,
    pub per_page: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            q: None,
            city: None,
            region: None,
            country: None,
            online: None,
            tags: Vec::new(),
            sort: EventSort::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_query_defaults_from_partial_json() {
        let query: JobQuery =
            serde_json::from_str(r#"{"skills":["React"],"remote":true,"sort":"salary_desc","page":2,"perPage":5}"#)
                .unwrap();

        assert_eq!(query.skills, vec!["React".to_string()]);
        assert_eq!(query.remote, Some(true));
        assert_eq!(query.sort, JobSort::SalaryDesc);
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 5);
        assert!(query.tags.is_empty());
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("recent".parse::<JobSort>().unwrap(), JobSort::Recent);
        assert_eq!("upcoming".parse::<EventSort>().unwrap(), EventSort::Upcoming);
        assert!("salary_asc".parse::<JobSort>().is_err());
    }

    #[test]
    fn test_event_query_default_page() {
        let query = EventQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PER_PAGE);
        assert_eq!(query.sort, EventSort::Relevant);
    }
}
