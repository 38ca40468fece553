//! The auth gate. Extracts the bearer credential, verifies it, resolves the
//! acting identity, and attaches it to the request. Purely advisory to
//! downstream handlers: it never mutates state.
//!
//! Fails closed: every failure in the chain surfaces as the same uniform
//! 401 so callers cannot distinguish expired from malformed tokens; the
//! distinct kinds go to the log instead.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::auth::cookies::{ACCESS_COOKIE, read_cookie};
use crate::errors::AppError;
use crate::infra::app_state::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Header takes precedence over the cookie.
    let token = bearer_token(&request)
        .or_else(|| read_cookie(request.headers(), ACCESS_COOKIE))
        .ok_or_else(|| {
            debug!("request carried no access credential");
            AppError::unauthorized()
        })?;

    let user_id = state.tokens.verify_access(&token).map_err(|err| {
        debug!(kind = ?err, "access token rejected");
        AppError::unauthorized()
    })?;

    let user = match state.identities.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(%user_id, "access token subject no longer exists");
            return Err(AppError::unauthorized());
        }
        Err(err) => {
            error!(%err, "identity lookup failed during auth");
            return Err(AppError::unauthorized());
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}
