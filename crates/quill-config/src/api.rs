//! REST API endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the blog REST API (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
