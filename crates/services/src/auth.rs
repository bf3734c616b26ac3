//! Login, registration and logout.

use gateway::{ApiRequest, Credential, Gateway, StatusCode, User};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use crate::expect_status;

/// Credentials entered on the login form.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Login name.
    pub user_name: String,
    /// Password.
    pub password: SecretString,
}

/// The contents of the registration form.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Login name.
    pub user_name: String,
    /// Contact email.
    pub email: String,
    /// Password.
    pub password: SecretString,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Patronymic.
    pub father_name: Option<String>,
    /// Phone number.
    pub phone_number: Option<String>,
}

impl RegisterRequest {
    fn to_json(&self) -> serde_json::Value {
        json!({
            "userName": self.user_name,
            "email": self.email,
            "password": self.password.expose_secret(),
            "firstName": self.first_name,
            "lastName": self.last_name,
            "fatherName": self.father_name,
            "phoneNumber": self.phone_number,
        })
    }
}

/// Session lifecycle operations.
pub struct AuthService<'a> {
    gateway: &'a Gateway,
}

impl<'a> AuthService<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Logs in and stores the returned credential in the session.
    pub async fn login(&self, request: &LoginRequest) -> crate::Result<Option<User>> {
        let body = json!({
            "userName": request.user_name,
            "password": request.password.expose_secret(),
        });

        let request = ApiRequest::post(self.gateway.routes().login()).json(&body)?;
        self.start_session(request).await
    }

    /// Creates an account and logs in as the new user.
    pub async fn register(&self, request: &RegisterRequest) -> crate::Result<Option<User>> {
        let request = ApiRequest::post(self.gateway.routes().register()).json(&request.to_json())?;
        self.start_session(request).await
    }

    /// Forgets the session and navigates to the login page.
    pub async fn logout(&self) {
        self.gateway.session().clear().await;
        self.gateway.navigator().navigate(self.gateway.routes().login_redirect());

        log::info!("Logged out");
    }

    async fn start_session(&self, request: ApiRequest) -> crate::Result<Option<User>> {
        let response = self.gateway.send(request).await?;
        let credential: Credential = expect_status(response, &[StatusCode::OK, StatusCode::CREATED])?.json()?;
        let user = credential.user.clone();

        match &user {
            Some(user) => log::info!("Logged in as {}", user.user_name),
            None => log::info!("Logged in"),
        }

        self.gateway.session().replace(credential).await;

        Ok(user)
    }
}
