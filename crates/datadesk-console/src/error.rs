//! Error types for the console crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use datadesk_pg::DbError;
use thiserror::Error;

/// Errors that can escape a console handler as an HTTP response. Most
/// recoverable failures are rendered inline on the page that caused them
/// instead; these are the ones with no page to land on.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Failed to start the server.
    #[error("failed to start console: {0}")]
    StartupFailed(String),

    /// Authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Authorization failed.
    #[error("not authorized")]
    NotAuthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let status = match &self {
            ConsoleError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ConsoleError::NotAuthorized => StatusCode::FORBIDDEN,
            ConsoleError::NotFound(_) => StatusCode::NOT_FOUND,
            ConsoleError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
