//! # quill-config
//!
//! Layered configuration loading for the Quill client using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QUILL_*` prefix, `__` as separator)
//! 2. Project-level `.quill/config.toml`
//! 3. User-level `~/.config/quill/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QUILL_API__BASE_URL` -> `api.base_url`,
//! `QUILL_AUTH__KEYRING_SERVICE` -> `auth.keyring_service`, etc. The `__`
//! (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use quill_config::QuillConfig;
//!
//! // Load from all sources (dotenvy + TOML + env):
//! let config = QuillConfig::load_with_dotenv().expect("config");
//!
//! // Or without dotenvy (env vars must already be set):
//! let config = QuillConfig::load().expect("config");
//!
//! println!("API base URL: {}", config.api.base_url);
//! ```

mod api;
mod auth;
mod error;

pub use api::ApiConfig;
pub use auth::AuthConfig;
pub use error::ConfigError;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl QuillConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables (`QUILL_*` prefix)
    /// 2. `.quill/config.toml` (project-local)
    /// 3. `~/.config/quill/config.toml` (user-global)
    /// 4. Default values
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract().map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the app
    /// shell and tests.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".quill/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment = figment.merge(Env::prefixed("QUILL_").split("__"));

        figment
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quill").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir
    /// looking for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        // Fallback: try current directory
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_loads() {
        let config = QuillConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.auth.keyring_service, "quill-client");
        assert!(!config.auth.has_state_dir_override());
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        let mut config = QuillConfig::default();
        config.api.base_url = "  ".into();
        let err = config.validate().expect_err("should reject");
        assert!(err.to_string().contains("api.base_url"));
    }
}
