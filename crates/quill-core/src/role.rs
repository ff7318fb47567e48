use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical role for a signed-in user.
///
/// Privilege precedence when a token carries several roles:
/// `Admin` > `Author` > `Reader`. Anything absent or unrecognized collapses
/// to `Reader`, the least-privileged value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Author,
    #[default]
    Reader,
}

impl Role {
    /// Return the string representation used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Author => "AUTHOR",
            Self::Reader => "READER",
        }
    }

    /// Parse a single scalar role claim.
    ///
    /// Strips a leading `ROLE_` prefix, matches case-insensitively, and
    /// collapses unknown values to [`Role::Reader`]. Multi-role claims
    /// (lists, comma-joined strings) are handled one layer up, where the
    /// raw claim shape is known.
    #[must_use]
    pub fn from_claim(value: &str) -> Self {
        let trimmed = value.trim();
        let stripped = trimmed.strip_prefix("ROLE_").unwrap_or(trimmed);
        match stripped.to_ascii_uppercase().as_str() {
            "ADMIN" => Self::Admin,
            "AUTHOR" => Self::Author,
            _ => Self::Reader,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
