use std::sync::Arc;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// The authenticated user's identity snapshot, as sent by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Unique login name.
    pub user_name: String,
    /// Roles such as `Student` or `Teacher`.
    pub user_roles: Vec<String>,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone_number: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Patronymic.
    pub father_name: Option<String>,
    /// Gender as entered in the profile.
    pub gender: Option<String>,
    /// Date of birth as formatted by the API.
    pub date_of_birth: Option<String>,
    /// Country of residence.
    pub country: Option<String>,
    /// City of residence.
    pub city: Option<String>,
    /// Study group.
    pub group: Option<String>,
    /// Profile photo location.
    pub photo_url: Option<String>,
}

impl User {
    /// Returns true if the user holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.user_roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// A bearer token together with the user it belongs to.
///
/// This is also the body the API answers login and refresh calls with.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    /// The opaque bearer token.
    pub token: SecretString,
    /// The user the token was issued to.
    #[serde(default)]
    pub user: Option<User>,
}

/// Holds the credential of the current session.
///
/// Clones share the same session. Token and user are always replaced together, so
/// readers see either the previous or the new credential.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    credential: Arc<RwLock<Option<Credential>>>,
}

impl SessionStore {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current bearer token, if logged in.
    pub async fn current_token(&self) -> Option<SecretString> {
        self.credential.read().await.as_ref().map(|c| c.token.clone())
    }

    /// The current user, if logged in.
    pub async fn current_user(&self) -> Option<User> {
        self.credential.read().await.as_ref().and_then(|c| c.user.clone())
    }

    /// Returns true if a credential is held.
    pub async fn is_authenticated(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Replaces the credential.
    pub async fn replace_credential(&self, token: SecretString, user: Option<User>) {
        self.replace(Credential { token, user }).await;
    }

    /// Replaces the credential with one received from the API.
    pub async fn replace(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }

    /// Replaces the user snapshot, keeping the token. Does nothing when logged out.
    pub async fn update_user(&self, user: User) {
        match self.credential.write().await.as_mut() {
            Some(credential) => credential.user = Some(user),
            None => log::debug!("Ignoring user update for a session that is not logged in"),
        }
    }

    /// Forgets the credential.
    pub async fn clear(&self) {
        *self.credential.write().await = None;
    }
}
