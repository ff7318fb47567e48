//! REST auth and profile endpoints.
//!
//! The session controller talks to the backend only through the [`AuthApi`]
//! trait; [`RestAuthApi`] is the `reqwest` implementation and tests
//! substitute an in-memory double.

use serde::Deserialize;

use quill_config::ApiConfig;
use quill_core::Role;

use crate::claims::RawId;
use crate::error::AuthError;

/// Authoritative user record from `GET /users/profile`.
///
/// The id may arrive as a number or a numeric string depending on the
/// backend version; only a numeric-looking id makes the profile usable as
/// the identity source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Profile {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Remote auth endpoints as seen by the session controller.
pub trait AuthApi {
    /// `POST /auth/login`. `Ok(None)` means the backend answered without a
    /// token — a failed login, not a transport error.
    async fn login(&self, username: &str, password: &str) -> Result<Option<String>, AuthError>;

    /// `POST /auth/register`. New accounts start as readers.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError>;

    /// `GET /users/profile`, bearer-authenticated.
    async fn fetch_profile(&self, token: &str) -> Result<Profile, AuthError>;

    /// Best-effort server-side token invalidation.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// `POST /auth/forgot-password`.
    async fn forgot_password(&self, email: &str) -> Result<(), AuthError>;

    /// `POST /auth/reset-password`.
    async fn reset_password(&self, reset_token: &str, new_password: &str)
        -> Result<(), AuthError>;
}

/// `reqwest`-backed implementation against the blog REST API.
#[derive(Debug, Clone)]
pub struct RestAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl RestAuthApi {
    /// # Errors
    ///
    /// Returns `AuthError::Api` if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Api(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// # Errors
    ///
    /// Returns `AuthError::Api` if the HTTP client cannot be constructed.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AuthError> {
        Self::new(config.base_url.trim_end_matches('/'), config.timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn check_status(
    resp: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, AuthError> {
    if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(AuthError::Unauthorized);
    }
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::Api(format!("{context}: HTTP {status}: {body}")));
    }
    Ok(resp)
}

impl AuthApi for RestAuthApi {
    async fn login(&self, username: &str, password: &str) -> Result<Option<String>, AuthError> {
        #[derive(Deserialize)]
        struct LoginResponse {
            jwt: Option<String>,
        }

        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                // The API field is `username` but carries the email.
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Api(format!("login: {e}")))?;

        let resp = check_status(resp, "login").await?;
        let body: LoginResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Api(format!("parse login response: {e}")))?;
        Ok(body.jwt.filter(|jwt| !jwt.is_empty()))
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                // The API names this `passwordHash` but expects the plain
                // password; hashing happens server-side.
                "passwordHash": password,
                "role": Role::Reader.as_str(),
            }))
            .send()
            .await
            .map_err(|e| AuthError::Api(format!("register: {e}")))?;

        check_status(resp, "register").await?;
        Ok(())
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile, AuthError> {
        let resp = self
            .client
            .get(self.url("/users/profile"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::ProfileFetch(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !resp.status().is_success() {
            return Err(AuthError::ProfileFetch(format!("HTTP {}", resp.status())));
        }
        resp.json()
            .await
            .map_err(|e| AuthError::ProfileFetch(format!("parse profile: {e}")))
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Api(format!("logout: {e}")))?;

        check_status(resp, "logout").await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.url("/auth/forgot-password"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(|e| AuthError::Api(format!("forgot password: {e}")))?;

        check_status(resp, "forgot password").await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.url("/auth/reset-password"))
            .json(&serde_json::json!({
                "token": reset_token,
                "newPassword": new_password,
            }))
            .send()
            .await
            .map_err(|e| AuthError::Api(format!("reset password: {e}")))?;

        check_status(resp, "reset password").await?;
        Ok(())
    }
}
