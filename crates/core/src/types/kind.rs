//! Entity kind: the two record families served by the upstream API.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`EntityKind`].
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown entity kind: {0} (expected \"comic\" or \"character\")")]
pub struct EntityKindError(pub String);

/// The kind of a cached upstream record.
///
/// Determines which upstream endpoint a record is fetched from and which
/// field (`title` vs `name`) provides its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A comic issue; labelled by its upstream `title`.
    Comic,
    /// A character; labelled by its upstream `name`.
    Character,
}

impl EntityKind {
    /// The upstream path segment for a single-record lookup
    /// (`/comic/{id}` or `/character/{id}`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comic => "comic",
            Self::Character => "character",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = EntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comic" => Ok(Self::Comic),
            "character" => Ok(Self::Character),
            other => Err(EntityKindError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("comic".parse::<EntityKind>().unwrap(), EntityKind::Comic);
        assert_eq!(
            "character".parse::<EntityKind>().unwrap(),
            EntityKind::Character
        );
        assert!("comics".parse::<EntityKind>().is_err());
        assert!("".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&EntityKind::Character).unwrap();
        assert_eq!(json, "\"character\"");

        let parsed: EntityKind = serde_json::from_str("\"comic\"").unwrap();
        assert_eq!(parsed, EntityKind::Comic);
    }

    #[test]
    fn test_display_matches_path_segment() {
        assert_eq!(EntityKind::Comic.to_string(), "comic");
        assert_eq!(EntityKind::Character.to_string(), "character");
    }
}
