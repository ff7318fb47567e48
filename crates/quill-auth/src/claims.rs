//! Unverified claims carried inside the bearer token, and the role/id
//! normalization that turns their wire shapes into canonical types.
//!
//! Backends emit these fields in several inconsistent shapes: the role may
//! be a single string, a list, or a comma-joined string of `ROLE_*` tokens;
//! the id may be a number, a numeric string, or absent with an email in
//! `sub`. Everything downstream consumes only the canonical forms produced
//! here.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use quill_core::Role;

/// Raw `role` claim as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRole {
    One(String),
    Many(Vec<String>),
}

/// Raw id claim: numbers and numeric strings both occur.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Numeric(i64),
    Text(String),
}

impl RawId {
    /// Numeric view, parsing numeric-looking strings.
    #[must_use]
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// String view, for degraded id fallbacks.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Numeric(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Decoded, unverified token payload.
///
/// Every field may be absent; nothing here is trusted. Access must tolerate
/// missing data everywhere.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    /// Subject: a numeric-looking id or an email address.
    pub sub: Option<String>,
    /// Role claim, also accepted from the `roles`/`authorities` keys.
    #[serde(default, alias = "roles", alias = "authorities")]
    pub role: Option<RawRole>,
    /// Explicit numeric-looking id, distinct from the subject.
    pub id: Option<RawId>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub given_name: Option<String>,
    /// Expiry as a Unix timestamp.
    pub exp: Option<i64>,
}

impl Claims {
    /// Canonical role from the raw claim. Profiles never carry authority
    /// information, so this is the only role source.
    #[must_use]
    pub fn normalize_role(&self) -> Role {
        normalize_role(self.role.as_ref())
    }

    /// The id source for resolution: the explicit `id` claim when present,
    /// else the subject.
    #[must_use]
    pub fn user_key(&self) -> Option<RawId> {
        self.id
            .clone()
            .or_else(|| self.sub.clone().map(RawId::Text))
    }

    /// Best-effort expiry check on the optional `exp` claim.
    ///
    /// Absent `exp` means "not expired" — the server remains the real gate.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp.is_some_and(|exp| exp <= now.timestamp())
    }

    /// Display-name fallback chain: name, username, given name, the local
    /// part of the email, else the literal `"User"`.
    #[must_use]
    pub fn display_name(&self, email: Option<&str>) -> String {
        [
            self.name.as_deref(),
            self.username.as_deref(),
            self.given_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
        .or_else(|| {
            email
                .and_then(|e| e.split('@').next())
                .filter(|local| !local.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| "User".to_string())
    }
}

/// Map the raw role claim to a canonical [`Role`].
///
/// Multi-role claims (lists, or comma-joined strings) are scanned for the
/// exact `ROLE_ADMIN` / `ROLE_AUTHOR` tokens with highest privilege winning;
/// anything else in a multi-role claim collapses to `Reader`. A single
/// scalar instead has its `ROLE_` prefix stripped and is matched
/// case-insensitively.
#[must_use]
pub fn normalize_role(raw: Option<&RawRole>) -> Role {
    match raw {
        None => Role::Reader,
        Some(RawRole::One(s)) if s.contains(',') => {
            from_multi_role(s.split(',').map(str::trim))
        }
        Some(RawRole::One(s)) => Role::from_claim(s),
        Some(RawRole::Many(items)) => from_multi_role(items.iter().map(|s| s.trim())),
    }
}

fn from_multi_role<'a>(tokens: impl Iterator<Item = &'a str>) -> Role {
    let tokens: Vec<&str> = tokens.collect();
    if tokens.contains(&"ROLE_ADMIN") {
        Role::Admin
    } else if tokens.contains(&"ROLE_AUTHOR") {
        Role::Author
    } else {
        Role::Reader
    }
}

/// Loose email-shape check, matching what the backend treats as an email id.
#[must_use]
pub fn looks_like_email(value: &str) -> bool {
    value.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_role_defaults_to_reader() {
        assert_eq!(normalize_role(None), Role::Reader);
        assert_eq!(
            normalize_role(Some(&RawRole::One(String::new()))),
            Role::Reader
        );
    }

    #[test]
    fn unknown_role_defaults_to_reader() {
        assert_eq!(
            normalize_role(Some(&RawRole::One("totally-unknown-role".into()))),
            Role::Reader
        );
    }

    #[test]
    fn single_scalar_is_prefix_stripped_and_case_folded() {
        assert_eq!(
            normalize_role(Some(&RawRole::One("ROLE_AUTHOR".into()))),
            Role::Author
        );
        assert_eq!(
            normalize_role(Some(&RawRole::One("AUTHOR".into()))),
            Role::Author
        );
        assert_eq!(
            normalize_role(Some(&RawRole::One("author".into()))),
            Role::Author
        );
        assert_eq!(
            normalize_role(Some(&RawRole::One("admin".into()))),
            Role::Admin
        );
    }

    #[test]
    fn comma_joined_roles_use_privilege_precedence() {
        assert_eq!(
            normalize_role(Some(&RawRole::One("ROLE_READER,ROLE_ADMIN".into()))),
            Role::Admin
        );
        assert_eq!(
            normalize_role(Some(&RawRole::One("ROLE_READER,ROLE_AUTHOR".into()))),
            Role::Author
        );
        assert_eq!(
            normalize_role(Some(&RawRole::One("ROLE_READER,ROLE_GUEST".into()))),
            Role::Reader
        );
        // Whitespace around the tokens is tolerated.
        assert_eq!(
            normalize_role(Some(&RawRole::One(" ROLE_ADMIN , ROLE_READER ".into()))),
            Role::Admin
        );
    }

    #[test]
    fn admin_wins_regardless_of_order() {
        assert_eq!(
            normalize_role(Some(&RawRole::One("ROLE_ADMIN,ROLE_AUTHOR,ROLE_READER".into()))),
            Role::Admin
        );
        assert_eq!(
            normalize_role(Some(&RawRole::One("ROLE_AUTHOR,ROLE_ADMIN".into()))),
            Role::Admin
        );
    }

    #[test]
    fn role_lists_only_match_exact_prefixed_tokens() {
        assert_eq!(
            normalize_role(Some(&RawRole::Many(vec![
                "ROLE_READER".into(),
                "ROLE_ADMIN".into()
            ]))),
            Role::Admin
        );
        // A list member without the exact literal spelling does not match.
        assert_eq!(
            normalize_role(Some(&RawRole::Many(vec!["admin".into()]))),
            Role::Reader
        );
    }

    #[test]
    fn user_key_prefers_explicit_id_over_subject() {
        let claims = Claims {
            sub: Some("jane@x.com".into()),
            id: Some(RawId::Numeric(7)),
            ..Claims::default()
        };
        assert_eq!(claims.user_key(), Some(RawId::Numeric(7)));

        let subject_only = Claims {
            sub: Some("jane@x.com".into()),
            ..Claims::default()
        };
        assert_eq!(
            subject_only.user_key(),
            Some(RawId::Text("jane@x.com".into()))
        );
    }

    #[test]
    fn display_name_fallback_chain() {
        let named = Claims {
            name: Some("Jane Doe".into()),
            username: Some("jdoe".into()),
            ..Claims::default()
        };
        assert_eq!(named.display_name(None), "Jane Doe");

        let username_only = Claims {
            username: Some("jdoe".into()),
            ..Claims::default()
        };
        assert_eq!(username_only.display_name(None), "jdoe");

        let bare = Claims::default();
        assert_eq!(bare.display_name(Some("jane@x.com")), "jane");
        assert_eq!(bare.display_name(None), "User");

        // Blank entries are skipped, not taken.
        let blank_name = Claims {
            name: Some("   ".into()),
            given_name: Some("Jane".into()),
            ..Claims::default()
        };
        assert_eq!(blank_name.display_name(None), "Jane");
    }

    #[test]
    fn expiry_check_tolerates_absence() {
        let now = Utc::now();
        let no_exp = Claims::default();
        assert!(!no_exp.is_expired(now));

        let expired = Claims {
            exp: Some(now.timestamp() - 10),
            ..Claims::default()
        };
        assert!(expired.is_expired(now));

        let live = Claims {
            exp: Some(now.timestamp() + 3600),
            ..Claims::default()
        };
        assert!(!live.is_expired(now));
    }

    #[test]
    fn role_claim_accepts_alternate_keys() {
        let from_roles: Claims =
            serde_json::from_str(r#"{"roles": "ROLE_AUTHOR"}"#).expect("parse");
        assert_eq!(from_roles.normalize_role(), Role::Author);

        let from_authorities: Claims =
            serde_json::from_str(r#"{"authorities": ["ROLE_READER", "ROLE_ADMIN"]}"#)
                .expect("parse");
        assert_eq!(from_authorities.normalize_role(), Role::Admin);
    }
}
