//! Ownership checks for comments and posts.
//!
//! Resource user ids arrive from the REST API in several shapes: a bare
//! number, a numeric string, or an object carrying `numericId`/`id`. All
//! comparisons here go through numeric coercion — there is deliberately no
//! string or email fallback, so a failed coercion means "not owned".

use serde_json::Value;

use crate::identity::Identity;

fn coerce_scalar(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce an id of any wire shape into a numeric id.
///
/// Objects are probed for `numericId` first, then `id`. Emails and other
/// non-numeric strings yield `None`.
#[must_use]
pub fn ensure_numeric_id(value: &Value) -> Option<i64> {
    match value {
        Value::Object(map) => map
            .get("numericId")
            .and_then(coerce_scalar)
            .or_else(|| map.get("id").and_then(coerce_scalar)),
        other => coerce_scalar(other),
    }
}

/// True iff `resource_user_id` and the current identity both coerce to a
/// numeric id and those ids are equal.
#[must_use]
pub fn is_owned_by_current_user(resource_user_id: &Value, identity: &Identity) -> bool {
    match (
        ensure_numeric_id(resource_user_id),
        identity.canonical_numeric_id(),
    ) {
        (Some(resource), Some(current)) => resource == current,
        _ => false,
    }
}

/// Convenience wrapper for comment payloads: probes `comment.user.id`.
#[must_use]
pub fn is_comment_author(comment: &Value, identity: &Identity) -> bool {
    comment
        .get("user")
        .and_then(|user| user.get("id"))
        .is_some_and(|id| is_owned_by_current_user(id, identity))
}
