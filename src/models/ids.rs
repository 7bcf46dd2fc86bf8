//! Identifiers for upstream Lichess entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Swiss tournament ID as issued by Lichess.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(String);

impl TournamentId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TournamentId({})", self.0)
    }
}

impl From<String> for TournamentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TournamentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A team as resolved by the upstream directory.
///
/// `name` is the canonical display name and is what team state is keyed by,
/// never the fragment a user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
}

impl TeamRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
