use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::types::Failure;

/// Authentication errors for the middleware layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Ticket rejected, bad validation response, or principal declined.
    #[error("Not authenticated: {0}")]
    Unauthenticated(Failure),

    /// Login server unreachable or verifier error.
    #[error("Authentication error: {0}")]
    Internal(#[from] crate::error::Error),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(ref failure) => {
                tracing::warn!(reason = %failure, "CAS login failed");
                (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
            }
            Self::Internal(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}
