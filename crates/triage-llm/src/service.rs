//! Errors shared by the external service clients.

use thiserror::Error;

/// External-service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Timeout after {0} seconds")]
    Timeout(u32),

    #[error("Missing credential: {0} not set")]
    MissingApiKey(&'static str),
}

/// Result type for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;
