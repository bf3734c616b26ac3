use config::AuthConfig;

/// The authentication endpoints of the API.
///
/// Auth routes never trigger a credential refresh. The login and refresh endpoints are
/// also sent without an `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthRoutes {
    login: String,
    register: String,
    refresh: String,
    login_redirect: String,
}

impl AuthRoutes {
    /// The login endpoint.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// The registration endpoint.
    pub fn register(&self) -> &str {
        &self.register
    }

    /// The credential refresh endpoint.
    pub fn refresh(&self) -> &str {
        &self.refresh
    }

    /// Where the client is sent when its session ends.
    pub fn login_redirect(&self) -> &str {
        &self.login_redirect
    }

    /// Returns true for the login, registration and refresh endpoints.
    pub fn is_auth_route(&self, path: &str) -> bool {
        let path = normalize(path);

        [&self.login, &self.register, &self.refresh]
            .into_iter()
            .any(|route| normalize(route) == path)
    }

    /// Returns true if requests to `path` carry the session's bearer token.
    pub fn stamps_credential(&self, path: &str) -> bool {
        let path = normalize(path);

        path != normalize(&self.login) && path != normalize(&self.refresh)
    }
}

impl From<&AuthConfig> for AuthRoutes {
    fn from(config: &AuthConfig) -> Self {
        Self {
            login: config.login_path.clone(),
            register: config.register_path.clone(),
            refresh: config.refresh_path.clone(),
            login_redirect: config.login_redirect.clone(),
        }
    }
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.trim_end_matches('/')
}
