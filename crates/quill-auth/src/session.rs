//! Session lifecycle around the token store and the auth API.
//!
//! One controller per running app instance, injected into the view layer —
//! no globals. All network failures are converted to session state (the
//! `error` string) at this boundary; nothing propagates to UI callers.

use std::fmt;

use chrono::Utc;
use tokio::sync::Mutex;

use quill_config::QuillConfig;
use quill_core::{Identity, Role};

use crate::api::{AuthApi, RestAuthApi};
use crate::claims::Claims;
use crate::decode;
use crate::error::AuthError;
use crate::resolver;
use crate::token_store::TokenStore;

const MALFORMED_TOKEN_MESSAGE: &str = "Invalid authentication token. Please log in again.";
const EXPIRED_TOKEN_MESSAGE: &str = "Session expired. Please log in again.";

/// Lifecycle of the client session.
///
/// ```text
/// uninitialized → loading → authenticated
///                         → anonymous
/// authenticated → anonymous          (logout)
/// anonymous → loading → authenticated  (login)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Authenticated,
    Anonymous,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Authenticated => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    identity: Option<Identity>,
    error: Option<String>,
    /// Bumped on every logout/forced logout. A profile fetch that was in
    /// flight when the epoch moved must not write its result back —
    /// otherwise a stale response could resurrect the identity.
    epoch: u64,
}

/// Owns the current [`Identity`] and the auth flows around it.
pub struct SessionController<A: AuthApi> {
    api: A,
    store: TokenStore,
    inner: Mutex<SessionInner>,
}

impl SessionController<RestAuthApi> {
    /// Controller wired from configuration: REST client plus the default
    /// keyring-backed token store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the HTTP client or store cannot be set up.
    pub fn from_config(config: &QuillConfig) -> Result<Self, AuthError> {
        let api = RestAuthApi::from_config(&config.api)?;
        let store = TokenStore::from_config(&config.auth)?;
        Ok(Self::new(api, store))
    }
}

impl<A: AuthApi> SessionController<A> {
    #[must_use]
    pub fn new(api: A, store: TokenStore) -> Self {
        Self {
            api,
            store,
            inner: Mutex::new(SessionInner {
                state: SessionState::Uninitialized,
                identity: None,
                error: None,
                epoch: 0,
            }),
        }
    }

    /// Restore the session from a previously stored token on app start.
    ///
    /// Decodes the stored token, attempts a best-effort profile fetch, and
    /// resolves the identity. A malformed or expired token forces a local
    /// logout with a user-visible message; no token means anonymous.
    pub async fn initialize(&self) {
        let Some(token) = self.store.token() else {
            let mut inner = self.inner.lock().await;
            inner.state = SessionState::Anonymous;
            return;
        };

        let epoch = self.begin_loading().await;

        let claims = match decode::decode(&token) {
            Ok(claims) => claims,
            Err(error) => {
                tracing::warn!(%error, "stored token is not decodable; clearing session");
                self.force_logout(MALFORMED_TOKEN_MESSAGE).await;
                return;
            }
        };
        if claims.is_expired(Utc::now()) {
            tracing::warn!("stored token is expired; clearing session");
            self.force_logout(EXPIRED_TOKEN_MESSAGE).await;
            return;
        }

        self.settle(epoch, &token, claims).await;
    }

    /// Authenticate against the backend.
    ///
    /// Returns `true` on success. A response without a token, or any API
    /// error, returns `false` and leaves the previous identity untouched;
    /// the error (if any) is exposed via [`Self::error`].
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let (epoch, prev_state) = {
            let mut inner = self.inner.lock().await;
            let prev = inner.state;
            inner.state = SessionState::Loading;
            inner.error = None;
            (inner.epoch, prev)
        };

        let jwt = match self.api.login(email, password).await {
            Ok(Some(jwt)) => jwt,
            Ok(None) => {
                self.restore(epoch, prev_state, None).await;
                return false;
            }
            Err(error) => {
                tracing::debug!(%error, "login failed");
                self.restore(epoch, prev_state, Some(error.to_string())).await;
                return false;
            }
        };

        if let Err(error) = self.store.set_token(&jwt) {
            self.restore(epoch, prev_state, Some(error.to_string())).await;
            return false;
        }

        let claims = match decode::decode(&jwt) {
            Ok(claims) => claims,
            Err(error) => {
                tracing::warn!(%error, "login returned an undecodable token");
                self.force_logout(MALFORMED_TOKEN_MESSAGE).await;
                return false;
            }
        };

        self.settle(epoch, &jwt, claims).await;

        let inner = self.inner.lock().await;
        inner.epoch == epoch && inner.state == SessionState::Authenticated
    }

    /// Create an account, then log in with the same credentials.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> bool {
        if let Err(error) = self.api.register(name, email, password).await {
            tracing::debug!(%error, "registration failed");
            let mut inner = self.inner.lock().await;
            inner.error = Some(error.to_string());
            return false;
        }
        self.login(email, password).await
    }

    /// End the session. Always succeeds locally; server-side token
    /// invalidation is best-effort.
    pub async fn logout(&self) {
        let token = self.store.token();
        {
            let mut inner = self.inner.lock().await;
            inner.epoch += 1;
            inner.identity = None;
            inner.state = SessionState::Anonymous;
            inner.error = None;
        }

        if let Some(token) = token {
            if let Err(error) = self.api.logout(&token).await {
                tracing::debug!(%error, "server-side token invalidation failed; logging out locally");
            }
        }
        if let Err(error) = self.store.clear_all() {
            tracing::warn!(%error, "failed to clear stored credentials");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.identity.is_some()
    }

    /// Exact-match role check, no hierarchy: callers needing "author or
    /// admin" check both and OR the results.
    pub async fn has_role(&self, role: Role) -> bool {
        self.inner
            .lock()
            .await
            .identity
            .as_ref()
            .is_some_and(|identity| identity.role == role)
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.inner.lock().await.identity.clone()
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.lock().await.error.clone()
    }

    /// Access to the underlying store, for consumers that only need the
    /// cached numeric id (e.g. ownership checks).
    #[must_use]
    pub const fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Access to the underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    // --- Internals ---

    async fn begin_loading(&self) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.state = SessionState::Loading;
        inner.error = None;
        inner.epoch
    }

    /// Best-effort profile fetch, then atomic identity replacement.
    ///
    /// The write-back is guarded by the epoch captured before the fetch: if
    /// a logout happened while the request was in flight, the result is
    /// dropped instead of resurrecting the session.
    async fn settle(&self, epoch: u64, token: &str, claims: Claims) {
        let profile = match self.api.fetch_profile(token).await {
            Ok(profile) => Some(profile),
            Err(error) => {
                tracing::warn!(%error, "profile fetch failed; continuing with token-only identity");
                None
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            tracing::debug!("session changed while profile fetch was in flight; dropping result");
            return;
        }
        let identity = resolver::resolve(&claims, profile.as_ref(), &self.store);
        inner.identity = Some(identity);
        inner.state = SessionState::Authenticated;
        inner.error = None;
    }

    async fn restore(&self, epoch: u64, prev_state: SessionState, error: Option<String>) {
        let mut inner = self.inner.lock().await;
        if inner.epoch == epoch {
            inner.state = prev_state;
            inner.error = error;
        }
    }

    async fn force_logout(&self, message: &str) {
        {
            let mut inner = self.inner.lock().await;
            inner.epoch += 1;
            inner.identity = None;
            inner.state = SessionState::Anonymous;
            inner.error = Some(message.to_string());
        }
        if let Err(error) = self.store.clear_all() {
            tracing::warn!(%error, "failed to clear stored credentials");
        }
    }
}
