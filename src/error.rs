use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Error taxonomy for the auth endpoints.
///
/// `InvalidCredentials` is returned for unknown emails, inactive accounts and
/// wrong passwords alike, so a caller cannot probe which addresses are
/// registered. `Internal` carries the underlying cause for the server log;
/// the client only ever sees "Server error".
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or inconsistent input. HTTP 400.
    #[error("{0}")]
    Validation(&'static str),

    /// Email already registered. HTTP 409.
    #[error("Email already registered")]
    Conflict,

    /// Bad email/password combination. HTTP 401.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No authenticated session. HTTP 401.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Storage, hashing or session-store failure. HTTP 500.
    #[error("Server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref cause) = self {
            error!(error = %cause, "internal error");
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        // The UNIQUE constraint on users.email is the authoritative guard
        // against duplicate registration; the application-level existence
        // check is only a fast path.
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                return ApiError::Conflict;
            }
        }
        ApiError::Internal(err.into())
    }
}
