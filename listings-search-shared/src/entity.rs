//! Indexed entity kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Primary key shared by every index document.
pub const PRIMARY_KEY: &str = "id";

/// The kinds of relational entities mirrored into the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Job,
    Event,
}

impl EntityKind {
    /// All indexed kinds, in the order they are prepared at startup.
    pub const ALL: [EntityKind; 2] = [EntityKind::Job, EntityKind::Event];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Job => "job",
            EntityKind::Event => "event",
        }
    }

    /// Index name used when no override is configured.
    pub fn default_index_name(&self) -> &'static str {
        match self {
            EntityKind::Job => "jobs",
            EntityKind::Event => "events",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown entity kind: {0}")]
pub struct ParseEntityKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "job" | "jobs" => Ok(EntityKind::Job),
            "event" | "events" => Ok(EntityKind::Event),
            _ => Err(ParseEntityKindError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_kind() {
        assert_eq!("job".parse::<EntityKind>().unwrap(), EntityKind::Job);
        assert_eq!("Events".parse::<EntityKind>().unwrap(), EntityKind::Event);
        assert!("company".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_default_index_names() {
        assert_eq!(EntityKind::Job.default_index_name(), "jobs");
        assert_eq!(EntityKind::Event.default_index_name(), "events");
    }
}
