pub mod auth_handlers;
pub mod engagement_handlers;
pub mod video_handlers;

use uuid::Uuid;

use crate::errors::AppError;

/// Path and query ids arrive as strings so a malformed id surfaces as a 400
/// in the standard envelope rather than a bare extractor rejection.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::bad_request(format!("invalid {what} id")))
}
