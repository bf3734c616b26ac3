//! Credentials for opening a session from a non-interactive front-end.

use secrecy::SecretString;
use serde::Deserialize;

/// Login credentials, usually provided through `{{ env.VAR }}` expansion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// The user name to log in with.
    pub username: Option<String>,
    /// The password to log in with.
    pub password: Option<SecretString>,
}
