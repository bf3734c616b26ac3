//! Authenticated HTTP gateway for the Campus API.
//!
//! Every call to the remote API goes through [`Gateway`]. It stamps requests with the
//! bearer token held by the [`SessionStore`], and when the API answers `401 Unauthorized`
//! it runs a single credential refresh shared by every caller that hit the same failure.
//! Callers arriving while the refresh is in flight are parked and replayed with the new
//! token once it is committed. If the refresh fails, the session is cleared, the user is
//! notified once and sent to the login location, and every parked caller is rejected.

#![deny(missing_docs)]

mod classify;
mod error;
mod gateway;
mod refresh;
mod request;
mod response;
mod routes;
mod session;
mod sink;

pub use classify::{ErrorCategory, classify};
pub use error::GatewayError;
pub use gateway::{Gateway, GatewayBuilder};
pub use request::{ApiPath, ApiRequest, FileUpload, FormData, FormValue, RequestBody};
pub use response::ApiResponse;
pub use routes::AuthRoutes;
pub use session::{Credential, SessionStore, User};
pub use sink::{Level, LogNavigator, LogNotifier, Navigator, Notification, Notifier};

pub use reqwest::{Method, StatusCode};

/// Result type returned by every gateway operation.
pub type Result<T> = std::result::Result<T, GatewayError>;
