//! Remote API connection settings.

use std::time::Duration;

use duration_str::deserialize_duration;
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Connection settings for the remote course-management API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every request path is appended to. Defaults to
    /// `http://localhost:5000/api` when omitted.
    pub base_url: Url,
    /// Timeout applied by the HTTP client to every request.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    /// Whether the client keeps a cookie store, so that cookies set by the
    /// API (such as a refresh cookie) are sent back on later requests.
    pub cookies: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(30),
            cookies: true,
        }
    }
}
