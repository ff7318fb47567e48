//! Token storage configuration.

use serde::{Deserialize, Serialize};

fn default_keyring_service() -> String {
    "quill-client".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// OS keychain service name used for the bearer token.
    ///
    /// Override (e.g. to `"quill-client-test"`) to avoid touching production
    /// credentials during testing.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Override for the local state directory holding the token fallback
    /// file and the cached numeric user id. Empty means `~/.quill`.
    #[serde(default)]
    pub state_dir: String,
}

impl AuthConfig {
    #[must_use]
    pub fn has_state_dir_override(&self) -> bool {
        !self.state_dir.trim().is_empty()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            state_dir: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = AuthConfig::default();
        assert_eq!(config.keyring_service, "quill-client");
        assert!(!config.has_state_dir_override());
    }

    #[test]
    fn state_dir_override_detection() {
        let config = AuthConfig {
            keyring_service: default_keyring_service(),
            state_dir: "/tmp/quill-test".into(),
        };
        assert!(config.has_state_dir_override());
    }
}
