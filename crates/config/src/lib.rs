//! Campus configuration structures to map the campus.toml configuration.

#![deny(missing_docs)]

mod api;
mod auth;
mod loader;
mod session;

use std::path::Path;

pub use api::ApiConfig;
pub use auth::AuthConfig;
use serde::Deserialize;
pub use session::SessionConfig;

/// Main configuration structure for the Campus client.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote API connection settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Authentication endpoints and the unauthenticated entry point.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Credentials used to open a session, if any.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates the API URL and the authentication paths.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}
