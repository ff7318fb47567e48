use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;

/// Resolved session user id.
///
/// Numeric whenever any source supplied one; a string (typically an email
/// address) is a degraded fallback only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl UserId {
    /// Numeric view of the id, parsing numeric-looking strings.
    #[must_use]
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Canonical in-memory record of the signed-in user.
///
/// Built once per login/init by merging token claims with the fetched
/// profile, and replaced wholesale on every transition — never mutated
/// field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Primary id: numeric when known, else a string fallback.
    pub id: UserId,
    /// Explicit numeric id when any source provided one.
    pub numeric_id: Option<i64>,
    /// Email address when known and email-shaped.
    pub email_id: Option<String>,
    pub name: String,
    pub email: String,
    /// Always derived from the token, never from the profile.
    pub role: Role,
}

impl Identity {
    /// The numeric id used for ownership comparisons.
    #[must_use]
    pub fn canonical_numeric_id(&self) -> Option<i64> {
        self.numeric_id.or_else(|| self.id.as_numeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn user_id_numeric_view() {
        assert_eq!(UserId::Numeric(7).as_numeric(), Some(7));
        assert_eq!(UserId::Text("42".into()).as_numeric(), Some(42));
        assert_eq!(UserId::Text(" 42 ".into()).as_numeric(), Some(42));
        assert_eq!(UserId::Text("jane@x.com".into()).as_numeric(), None);
    }

    #[test]
    fn canonical_numeric_id_prefers_explicit_field() {
        let identity = Identity {
            id: UserId::Text("jane@x.com".into()),
            numeric_id: Some(5),
            email_id: Some("jane@x.com".into()),
            name: "jane".into(),
            email: "jane@x.com".into(),
            role: Role::Reader,
        };
        assert_eq!(identity.canonical_numeric_id(), Some(5));
    }

    #[test]
    fn canonical_numeric_id_falls_back_to_id() {
        let identity = Identity {
            id: UserId::Numeric(9),
            numeric_id: None,
            email_id: None,
            name: "User".into(),
            email: "9".into(),
            role: Role::Author,
        };
        assert_eq!(identity.canonical_numeric_id(), Some(9));
    }

    #[test]
    fn canonical_numeric_id_none_for_email_only() {
        let identity = Identity {
            id: UserId::Text("jane@x.com".into()),
            numeric_id: None,
            email_id: Some("jane@x.com".into()),
            name: "jane".into(),
            email: "jane@x.com".into(),
            role: Role::Reader,
        };
        assert_eq!(identity.canonical_numeric_id(), None);
    }
}
