//! Merge of token claims and the fetched profile into the canonical
//! [`Identity`].
//!
//! The profile is authoritative for id/name/email when it carries a
//! numeric-looking id; the role always comes from the token. A missing or
//! unusable profile degrades to token-only data — expected, not fatal.

use quill_core::{Identity, UserId};

use crate::api::Profile;
use crate::claims::{looks_like_email, Claims, RawId};
use crate::token_store::TokenStore;

/// Build the canonical identity and mirror the numeric id into the store
/// when one is known. An unknown numeric id leaves the store untouched —
/// only explicit logout clears it.
pub fn resolve(claims: &Claims, profile: Option<&Profile>, store: &TokenStore) -> Identity {
    let role = claims.normalize_role();
    let user_key = claims.user_key();

    // Claims-side email: the explicit claim, else an email-shaped subject.
    let claim_email = claims.email.clone().or_else(|| {
        user_key.as_ref().and_then(|key| match key {
            RawId::Text(s) if looks_like_email(s) => Some(s.clone()),
            _ => None,
        })
    });

    let authoritative = profile
        .and_then(|p| p.id.as_ref().and_then(RawId::as_numeric).map(|pid| (p, pid)));

    let identity = match authoritative {
        Some((p, pid)) => {
            let email = p
                .email
                .clone()
                .or_else(|| claim_email.clone())
                .unwrap_or_else(|| subject_text(user_key.as_ref()));
            let name = p
                .name
                .clone()
                .unwrap_or_else(|| claims.display_name(claim_email.as_deref()));
            Identity {
                id: UserId::Numeric(pid),
                numeric_id: Some(pid),
                email_id: email_shaped(&email),
                name,
                email,
                role,
            }
        }
        None => {
            let numeric = user_key.as_ref().and_then(RawId::as_numeric);
            let email = claim_email
                .clone()
                .unwrap_or_else(|| subject_text(user_key.as_ref()));
            let id = numeric.map_or_else(
                || UserId::Text(subject_text(user_key.as_ref())),
                UserId::Numeric,
            );
            Identity {
                id,
                numeric_id: numeric,
                email_id: email_shaped(&email),
                name: claims.display_name(claim_email.as_deref()),
                email,
                role,
            }
        }
    };

    if identity.numeric_id.is_some() {
        if let Err(error) = store.set_numeric_user_id(identity.numeric_id) {
            tracing::warn!(%error, "failed to persist numeric user id");
        }
    }

    identity
}

fn subject_text(key: Option<&RawId>) -> String {
    key.map(RawId::as_text).unwrap_or_default()
}

fn email_shaped(value: &str) -> Option<String> {
    looks_like_email(value).then(|| value.to_string())
}
