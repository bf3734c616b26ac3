//! Authentication endpoint configuration.

use serde::Deserialize;

/// Paths of the authentication endpoints, relative to the API base URL.
///
/// Requests to these paths never trigger a credential refresh when they are
/// answered with `401 Unauthorized`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Endpoint that exchanges user credentials for a session token.
    pub login_path: String,
    /// Endpoint that creates a new account.
    pub register_path: String,
    /// Endpoint that exchanges the current token for a fresh one.
    pub refresh_path: String,
    /// Location the client is sent to when the session can no longer be recovered.
    pub login_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".into(),
            register_path: "/auth/register".into(),
            refresh_path: "/auth/refresh-token".into(),
            login_redirect: "/login".into(),
        }
    }
}
