//! Component coordinates.
//!
//! A coordinate names exactly one launchable component as
//! `group:name:version`. Parsing is the only validation step in the
//! pipeline that happens before any resolver is consulted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::LaunchError;

/// Identity of a component: group, name and version.
///
/// Immutable once parsed. The canonical string form `group:name:version`
/// (see [`Coordinate::key`]) is also the key under which the component
/// appears in a resolved dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinate {
    group: String,
    name: String,
    version: String,
}

impl Coordinate {
    /// Build a coordinate from already-validated parts.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Canonical `group:name:version` key.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for Coordinate {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts.iter().any(|part| part.is_empty()) {
            return Err(LaunchError::InvalidCoordinate(s.to_string()));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl TryFrom<String> for Coordinate {
    type Error = LaunchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coordinate> for String {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let coordinate: Coordinate = "org:example-app:1.0".parse().unwrap();
        assert_eq!(coordinate.group(), "org");
        assert_eq!(coordinate.name(), "example-app");
        assert_eq!(coordinate.version(), "1.0");
        assert_eq!(coordinate.key(), "org:example-app:1.0");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["bad", "a:b", "a:b:c:d", "a::c", ":b:c", "a:b:", ""] {
            let result: Result<Coordinate, _> = bad.parse();
            assert!(
                matches!(result, Err(LaunchError::InvalidCoordinate(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let coordinate: Coordinate = "org:app:2.1.3".parse().unwrap();
        let round_tripped: Coordinate = coordinate.to_string().parse().unwrap();
        assert_eq!(coordinate, round_tripped);
    }

    #[test]
    fn test_serde_string_form() {
        let coordinate: Coordinate = serde_yaml::from_str("\"org:app:1.0\"").unwrap();
        assert_eq!(coordinate.key(), "org:app:1.0");
        assert!(serde_yaml::from_str::<Coordinate>("\"not-a-coordinate\"").is_err());
    }
}
