use gateway::{GatewayError, StatusCode};

/// Errors returned by the domain services.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// The call through the gateway failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The API answered with a success status the operation does not expect.
    #[error("Unexpected status {0} from the API")]
    UnexpectedStatus(StatusCode),
}

impl ServiceError {
    /// The HTTP status behind the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Gateway(error) => error.status(),
            Self::UnexpectedStatus(status) => Some(*status),
        }
    }
}
