//! Route table. Public and gated routers are built separately, then merged
//! under the `/api/v1` prefix with the shared layers.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::auth_middleware;
use crate::handlers::{auth_handlers, engagement_handlers, video_handlers};
use crate::infra::app_state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/refresh", post(auth_handlers::refresh))
        .route("/videos", get(video_handlers::list_videos))
        .route("/videos/{id}", get(video_handlers::get_video));

    let gated = Router::new()
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/users/me", get(auth_handlers::current_user))
        .route(
            "/engagement/{kind}/{subject_id}",
            post(engagement_handlers::toggle_like),
        )
        .route(
            "/subscriptions/{channel_id}",
            post(engagement_handlers::toggle_subscription),
        )
        .route(
            "/dashboard/stats/{channel_id}",
            get(video_handlers::channel_stats),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", public.merge(gated))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
