//! Durable client-local storage for the bearer token and the canonical
//! numeric user id.
//!
//! The token goes to the OS keychain when available, with a file fallback
//! under the state directory. The numeric id is a plain file — it is not a
//! secret, only a cached projection used for ownership checks without
//! re-running full identity resolution.

use std::fs;
use std::path::PathBuf;

use quill_config::AuthConfig;

use crate::error::AuthError;

const DEFAULT_KEYRING_SERVICE: &str = "quill-client";
const KEYRING_USER: &str = "bearer-token";
const TOKEN_FILE_NAME: &str = "token";
const USER_ID_FILE_NAME: &str = "user_id";

#[derive(Debug, Clone)]
pub struct TokenStore {
    service: String,
    state_dir: PathBuf,
    use_keyring: bool,
}

impl TokenStore {
    /// Store rooted at `~/.quill`, using the OS keychain for the token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the home directory cannot be
    /// resolved.
    pub fn new(service: &str) -> Result<Self, AuthError> {
        let state_dir = dirs::home_dir().map(|h| h.join(".quill")).ok_or_else(|| {
            AuthError::TokenStore("home directory not found — cannot store credentials".into())
        })?;
        Ok(Self {
            service: service.to_string(),
            state_dir,
            use_keyring: true,
        })
    }

    /// Store described by the auth config section.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if no state directory can be resolved.
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.has_state_dir_override() {
            let mut store = Self::with_dir(config.state_dir.trim());
            store.service.clone_from(&config.keyring_service);
            store.use_keyring = true;
            Ok(store)
        } else {
            Self::new(&config.keyring_service)
        }
    }

    /// Store confined to `dir`, bypassing the keychain. Used by tests and
    /// sandboxed environments.
    #[must_use]
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            service: DEFAULT_KEYRING_SERVICE.to_string(),
            state_dir: dir.into(),
            use_keyring: false,
        }
    }

    // --- Token ---

    /// Persist the bearer token. Falls back to a 0600 file under the state
    /// directory if the keyring is unavailable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if both keyring and file storage fail.
    pub fn set_token(&self, token: &str) -> Result<(), AuthError> {
        if self.use_keyring {
            match keyring::Entry::new(&self.service, KEYRING_USER) {
                Ok(entry) => match entry.set_password(token) {
                    Ok(()) => return Ok(()),
                    Err(error) => {
                        tracing::warn!(%error, "keyring store failed; falling back to file");
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "keyring unavailable; falling back to file");
                }
            }
        }
        self.write_secret_file(TOKEN_FILE_NAME, token)
    }

    /// Load the bearer token. Priority: keyring → `QUILL_AUTH__TOKEN` env →
    /// file.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        if self.use_keyring
            && let Ok(entry) = keyring::Entry::new(&self.service, KEYRING_USER)
            && let Ok(token) = entry.get_password()
            && !token.is_empty()
        {
            return Some(token);
        }

        if let Ok(token) = std::env::var("QUILL_AUTH__TOKEN") {
            if !token.is_empty() {
                return Some(token);
            }
        }

        self.read_file(TOKEN_FILE_NAME)
    }

    /// Remove the stored token from the keyring and the fallback file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the fallback file cannot be removed.
    pub fn clear_token(&self) -> Result<(), AuthError> {
        if self.use_keyring {
            // Ignore keyring errors — the credential may not exist.
            if let Ok(entry) = keyring::Entry::new(&self.service, KEYRING_USER) {
                let _ = entry.delete_credential();
            }
        }
        self.remove_file(TOKEN_FILE_NAME)
    }

    // --- Numeric user id ---

    /// Mirror the canonical numeric user id.
    ///
    /// `None` is ignored rather than stored: a caller that failed to obtain
    /// a numeric id must never clobber a previously stored valid value.
    /// Only [`Self::clear_all`] removes it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the id file cannot be written.
    pub fn set_numeric_user_id(&self, id: Option<i64>) -> Result<(), AuthError> {
        let Some(id) = id else {
            tracing::debug!("no numeric user id available; keeping stored value");
            return Ok(());
        };
        self.ensure_state_dir()?;
        let path = self.state_dir.join(USER_ID_FILE_NAME);
        fs::write(&path, id.to_string())
            .map_err(|e| AuthError::TokenStore(format!("write {}: {e}", path.display())))
    }

    /// The cached numeric user id, if a valid one is stored.
    #[must_use]
    pub fn numeric_user_id(&self) -> Option<i64> {
        self.read_file(USER_ID_FILE_NAME)
            .and_then(|s| s.trim().parse().ok())
    }

    /// Clear both the token and the cached numeric id. Used on logout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if a stored file cannot be removed.
    pub fn clear_all(&self) -> Result<(), AuthError> {
        self.clear_token()?;
        self.remove_file(USER_ID_FILE_NAME)
    }

    // --- Private file helpers ---

    fn ensure_state_dir(&self) -> Result<(), AuthError> {
        fs::create_dir_all(&self.state_dir).map_err(|e| {
            AuthError::TokenStore(format!("mkdir {}: {e}", self.state_dir.display()))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) =
                fs::set_permissions(&self.state_dir, fs::Permissions::from_mode(0o700))
            {
                tracing::warn!("failed to chmod 0700 {}: {e}", self.state_dir.display());
            }
        }
        Ok(())
    }

    fn write_secret_file(&self, name: &str, contents: &str) -> Result<(), AuthError> {
        self.ensure_state_dir()?;
        let path = self.state_dir.join(name);
        fs::write(&path, contents)
            .map_err(|e| AuthError::TokenStore(format!("write {}: {e}", path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .map_err(|e| AuthError::TokenStore(format!("chmod {}: {e}", path.display())))?;
        }

        Ok(())
    }

    fn read_file(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.state_dir.join(name))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn remove_file(&self, name: &str) -> Result<(), AuthError> {
        let path = self.state_dir.join(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                AuthError::TokenStore(format!("failed to delete {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn state_dir(&self) -> &std::path::Path {
        &self.state_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_round_trip_via_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());

        assert!(store.token().is_none());
        store.set_token("header.payload.sig").expect("store");
        assert_eq!(store.token().as_deref(), Some("header.payload.sig"));

        store.clear_token().expect("clear");
        assert!(store.token().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_permissions_are_restrictive() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());
        store.set_token("secret").expect("store");

        let mode = fs::metadata(store.state_dir().join(TOKEN_FILE_NAME))
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600, "token file should be 0600");
    }

    #[test]
    fn numeric_user_id_round_trip() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());

        assert!(store.numeric_user_id().is_none());
        store.set_numeric_user_id(Some(42)).expect("store");
        assert_eq!(store.numeric_user_id(), Some(42));
    }

    #[test]
    fn absent_id_never_clobbers_stored_value() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());

        store.set_numeric_user_id(Some(7)).expect("store");
        store.set_numeric_user_id(None).expect("no-op");
        assert_eq!(store.numeric_user_id(), Some(7));
    }

    #[test]
    fn garbage_id_file_reads_as_none() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());

        fs::write(tmp.path().join(USER_ID_FILE_NAME), "jane@x.com").expect("write");
        assert!(store.numeric_user_id().is_none());
    }

    #[test]
    fn clear_all_removes_both_keys() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());

        store.set_token("jwt").expect("store token");
        store.set_numeric_user_id(Some(5)).expect("store id");

        store.clear_all().expect("clear");
        assert!(store.token().is_none());
        assert!(store.numeric_user_id().is_none());
    }

    #[test]
    fn clear_all_on_empty_store_is_ok() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = TokenStore::with_dir(tmp.path());
        store.clear_all().expect("clear on empty");
    }
}
