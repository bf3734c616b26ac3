use std::sync::Arc;

use reqwest::StatusCode;

/// Errors surfaced by the gateway to its callers.
///
/// The type is `Clone` so that a single refresh failure can be delivered to every caller
/// that was parked behind it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The API answered with a non-success status.
    #[error("Request to '{path}' failed with status {status}")]
    Status {
        /// The status the API answered with.
        status: StatusCode,
        /// The request path, relative to the API base URL.
        path: String,
        /// The `message` field of a JSON error body, if there was one.
        message: Option<String>,
        /// The raw response body.
        body: String,
    },

    /// No response was received.
    #[error("Transport error: {0}")]
    Transport(Arc<reqwest::Error>),

    /// The session credential could not be refreshed. The session has been ended.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(Box<GatewayError>),

    /// The refresh task terminated before delivering an outcome.
    #[error("Session refresh was aborted")]
    RefreshAborted,

    /// The request path could not be turned into a URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// A request body could not be encoded.
    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// A response body did not have the expected shape.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// The HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl GatewayError {
    /// The HTTP status behind this error, if the API answered at all.
    ///
    /// For a failed refresh this is the status of the refresh call.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// The message the API put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Returns true if this error ended the session.
    pub fn is_session_terminated(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(Arc::new(error))
    }
}
