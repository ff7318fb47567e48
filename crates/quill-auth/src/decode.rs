//! Bearer-token payload decoding.
//!
//! Decodes the payload segment only — no signature verification. The server
//! is the real authorization gate; the client needs the claims solely for
//! display and view gating.

use base64::Engine as _;

use crate::claims::Claims;
use crate::error::AuthError;

/// Decode a bearer token's payload into [`Claims`].
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` when the token is not three
/// dot-separated segments, the payload is not valid base64url, or the
/// decoded payload is not valid JSON.
pub fn decode(token: &str) -> Result<Claims, AuthError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::MalformedToken(
            "expected three dot-separated segments".into(),
        ));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::MalformedToken(format!("base64 decode failed: {e}")))?;
    serde_json::from_slice(&payload)
        .map_err(|e| AuthError::MalformedToken(format!("payload parse failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quill_core::Role;

    fn make_token(payload: &str) -> String {
        let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header = engine.encode(r#"{"alg":"HS256"}"#);
        let body = engine.encode(payload);
        let signature = engine.encode("fake_sig");
        format!("{header}.{body}.{signature}")
    }

    #[test]
    fn decodes_typical_payload() {
        let token = make_token(
            r#"{"sub":"42","role":"ROLE_AUTHOR","email":"jane@x.com","name":"Jane"}"#,
        );
        let claims = decode(&token).expect("decode");
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.normalize_role(), Role::Author);
        assert_eq!(claims.email.as_deref(), Some("jane@x.com"));
    }

    #[test]
    fn decodes_comma_joined_roles() {
        let token = make_token(r#"{"sub":"7","role":"ROLE_READER,ROLE_ADMIN"}"#);
        let claims = decode(&token).expect("decode");
        assert_eq!(claims.normalize_role(), Role::Admin);
    }

    #[test]
    fn tolerates_missing_fields() {
        let token = make_token("{}");
        let claims = decode(&token).expect("decode");
        assert!(claims.sub.is_none());
        assert_eq!(claims.normalize_role(), Role::Reader);
    }

    #[test]
    fn rejects_wrong_segment_count() {
        let err = decode("not-a-token").expect_err("should fail");
        assert!(err.to_string().contains("three dot-separated segments"));

        let err = decode("a.b").expect_err("should fail");
        assert!(err.to_string().contains("three dot-separated segments"));
    }

    #[test]
    fn rejects_bad_base64() {
        let err = decode("header.!!!invalid!!!.signature").expect_err("should fail");
        assert!(err.to_string().contains("base64 decode failed"));
    }

    #[test]
    fn rejects_non_json_payload() {
        let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let token = format!(
            "{}.{}.{}",
            engine.encode("{}"),
            engine.encode("not json"),
            engine.encode("sig")
        );
        let err = decode(&token).expect_err("should fail");
        assert!(err.to_string().contains("payload parse failed"));
    }
}
