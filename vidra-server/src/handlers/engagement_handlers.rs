//! Toggle endpoints. Each call flips one (actor, subject, kind) edge and
//! returns the resulting state with the subject's fresh counter.

use axum::{Extension, Json, extract::{Path, State}};
use tracing::debug;
use vidra_core::api::ApiResponse;
use vidra_core::domain::{EngagementKind, EngagementState, ToggleOutcome, User};

use crate::errors::AppResult;
use crate::handlers::parse_id;
use crate::infra::app_state::AppState;

pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path((kind, subject_id)): Path<(String, String)>,
) -> AppResult<Json<ApiResponse<ToggleOutcome>>> {
    let kind = EngagementKind::from_path_segment(&kind).ok_or_else(|| {
        crate::errors::AppError::bad_request(format!("unknown like target `{kind}`"))
    })?;
    let subject_id = parse_id(&subject_id, "subject")?;

    let outcome = state.ledger.toggle(user.id, subject_id, kind).await?;
    debug!(actor = %user.id, subject = %subject_id, kind = kind.as_str(),
        state = ?outcome.state, "like toggled");

    let message = match outcome.state {
        EngagementState::Active => "liked successfully",
        EngagementState::Inactive => "unliked successfully",
    };
    Ok(Json(ApiResponse::ok(outcome, message)))
}

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(channel_id): Path<String>,
) -> AppResult<Json<ApiResponse<ToggleOutcome>>> {
    let channel_id = parse_id(&channel_id, "channel")?;

    let outcome = state
        .ledger
        .toggle(user.id, channel_id, EngagementKind::ChannelSubscription)
        .await?;
    debug!(actor = %user.id, channel = %channel_id, state = ?outcome.state,
        "subscription toggled");

    let message = match outcome.state {
        EngagementState::Active => "subscribed successfully",
        EngagementState::Inactive => "unsubscribed successfully",
    };
    Ok(Json(ApiResponse::ok(outcome, message)))
}
