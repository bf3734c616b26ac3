use reqwest::StatusCode;

/// The generic user-facing category of a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// `400 Bad Request`.
    InvalidRequest,
    /// `401 Unauthorized` from an authentication endpoint.
    InvalidCredentials,
    /// `403 Forbidden`.
    Forbidden,
    /// `404 Not Found`.
    NotFound,
}

impl ErrorCategory {
    /// The notification text for this category. The server's own message wins where the
    /// API provides a useful one.
    pub fn message(self, server_message: Option<&str>) -> String {
        match (self, server_message) {
            (Self::InvalidRequest | Self::InvalidCredentials, Some(message)) => message.to_string(),
            (Self::InvalidRequest, None) => "Invalid request.".to_string(),
            (Self::InvalidCredentials, None) => "Session expired. Please login again.".to_string(),
            (Self::Forbidden, _) => "You don't have permission to perform this action.".to_string(),
            (Self::NotFound, _) => "Requested resource not found.".to_string(),
        }
    }
}

/// Maps a failed response to its notification category.
///
/// Statuses without a generic meaning return `None` and are left to the caller. A `401`
/// only has one here when it comes from an auth route; elsewhere it is handled by the
/// refresh path.
pub fn classify(status: StatusCode, auth_route: bool) -> Option<ErrorCategory> {
    match status {
        StatusCode::BAD_REQUEST => Some(ErrorCategory::InvalidRequest),
        StatusCode::UNAUTHORIZED if auth_route => Some(ErrorCategory::InvalidCredentials),
        StatusCode::FORBIDDEN => Some(ErrorCategory::Forbidden),
        StatusCode::NOT_FOUND => Some(ErrorCategory::NotFound),
        _ => None,
    }
}
