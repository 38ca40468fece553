//! The single boundary that maps core error kinds onto HTTP status codes and
//! the uniform error envelope. Handlers never build status codes themselves.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use vidra_core::api::ApiErrorBody;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// The uniform rejection the auth gate surfaces for every failure in its
    /// chain; the distinguishing detail stays in the server log.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized request")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl From<vidra_core::Error> for AppError {
    fn from(err: vidra_core::Error) -> Self {
        use vidra_core::Error;
        match err {
            Error::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized | Error::TokenExpired | Error::TokenInvalid => {
                tracing::debug!(kind = ?err, "authentication rejected");
                Self::unauthorized()
            }
            // A mismatch during rotation is a hard failure: force re-login.
            Error::TokenMismatch => {
                tracing::warn!("refresh token mismatch; session requires re-login");
                Self::new(StatusCode::UNAUTHORIZED, "refresh token is expired or used")
            }
            Error::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            Error::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            Error::Internal(detail) => {
                // Full detail server-side only; the caller gets a generic line.
                tracing::error!(%detail, "internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "something went wrong")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody::new(self.status.as_u16(), self.message, self.errors);
        (self.status, Json(body)).into_response()
    }
}
