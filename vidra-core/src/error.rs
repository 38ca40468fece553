use thiserror::Error;

/// Error taxonomy shared by every component.
///
/// Component methods never build HTTP responses; they fail with one of these
/// kinds and a single boundary layer in the server maps kind to status code.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized request")]
    Unauthorized,

    #[error("access token expired")]
    TokenExpired,

    #[error("invalid access token")]
    TokenInvalid,

    #[error("refresh token mismatch")]
    TokenMismatch,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for every kind the auth gate collapses into a uniform 401.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Error::Unauthorized
                | Error::TokenExpired
                | Error::TokenInvalid
                | Error::TokenMismatch
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            return Error::Conflict("duplicate resource".to_string());
        }
        Error::Internal(format!("store failure: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
