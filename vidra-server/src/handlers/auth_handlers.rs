//! Session endpoints: register, login, refresh, logout, current user.
//!
//! Login and refresh hand the pair back both ways the clients consume it:
//! in the body and as the HTTP-only cookie pair.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vidra_core::api::ApiResponse;
use vidra_core::auth::SessionTokens;
use vidra_core::domain::{LoginRequest, RegisterRequest, User};

use crate::auth::cookies::{
    ACCESS_COOKIE, REFRESH_COOKIE, clear_cookie, read_cookie, session_cookie,
};
use crate::errors::{AppError, AppResult};
use crate::infra::app_state::AppState;

/// Refresh cookies outlive many access windows; rotation or revocation is
/// what actually ends them.
const REFRESH_COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user: User,
    #[serde(flatten)]
    pub tokens: SessionTokens,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let new_user = request.validate()?;
    let password_hash = state.hasher.hash(&request.password)?;
    let user = state
        .identities
        .create_user_with_password(&new_user, &password_hash)
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(user, "user registered successfully")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let identifier = request.identifier()?;

    // Unknown identifier and wrong password are indistinguishable to the
    // caller.
    let user = state
        .identities
        .find_by_identifier(&identifier)
        .await?
        .ok_or_else(invalid_credentials)?;
    let password_hash = state
        .identities
        .get_password_hash(user.id)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !state.hasher.verify(&request.password, &password_hash)? {
        return Err(invalid_credentials());
    }

    let tokens = state.tokens.issue_session(user.id).await?;
    info!(user_id = %user.id, "user logged in");

    Ok((
        session_cookies(&state, &tokens),
        Json(ApiResponse::ok(
            SessionPayload { user, tokens },
            "user logged in successfully",
        )),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    // Cookie first, JSON body as fallback. The body is read raw so a
    // malformed payload is a 400 in the standard envelope rather than a
    // silent extractor rejection.
    let presented = match read_cookie(&headers, REFRESH_COOKIE) {
        Some(token) => token,
        None if body.trim().is_empty() => {
            debug!("refresh request carried no refresh token");
            return Err(AppError::unauthorized());
        }
        None => {
            let request: RefreshRequest = serde_json::from_str(&body)
                .map_err(|_| AppError::bad_request("malformed refresh request body"))?;
            request.refresh_token.ok_or_else(|| {
                debug!("refresh request carried no refresh token");
                AppError::unauthorized()
            })?
        }
    };

    let user_id = state.tokens.resolve_refresh(&presented).await?;
    let tokens = state.tokens.rotate(user_id, &presented).await?;
    debug!(%user_id, "session rotated");

    Ok((
        session_cookies(&state, &tokens),
        Json(ApiResponse::ok(tokens, "session refreshed successfully")),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<impl IntoResponse> {
    state.tokens.revoke(user.id).await?;
    info!(user_id = %user.id, "user logged out");

    let secure = state.config.auth.secure_cookies;
    Ok((
        AppendHeaders([
            (SET_COOKIE, clear_cookie(ACCESS_COOKIE, secure)),
            (SET_COOKIE, clear_cookie(REFRESH_COOKIE, secure)),
        ]),
        Json(ApiResponse::message_only("user logged out successfully")),
    ))
}

pub async fn current_user(
    Extension(user): Extension<User>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(ApiResponse::ok(user, "user fetched successfully")))
}

fn invalid_credentials() -> AppError {
    AppError::new(StatusCode::UNAUTHORIZED, "invalid credentials")
}

fn session_cookies(
    state: &AppState,
    tokens: &SessionTokens,
) -> AppendHeaders<[(HeaderName, String); 2]> {
    let secure = state.config.auth.secure_cookies;
    AppendHeaders([
        (
            SET_COOKIE,
            session_cookie(ACCESS_COOKIE, &tokens.access_token, tokens.expires_in, secure),
        ),
        (
            SET_COOKIE,
            session_cookie(
                REFRESH_COOKIE,
                &tokens.refresh_token,
                REFRESH_COOKIE_MAX_AGE_SECS,
                secure,
            ),
        ),
    ])
}
