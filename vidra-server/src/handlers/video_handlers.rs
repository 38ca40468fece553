//! Video listing and retrieval, plus the channel dashboard read.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::debug;
use vidra_core::api::ApiResponse;
use vidra_core::domain::{
    ChannelStats, SortDirection, SortField, Video, VideoListQuery, VideoPage,
};

use crate::errors::{AppError, AppResult};
use crate::handlers::parse_id;
use crate::infra::app_state::AppState;

/// Public query-string shape for the listing. Everything arrives as an
/// optional string so a malformed value becomes a 400 in the standard
/// envelope; defaults and allow-lists are applied when converting to a
/// [`VideoListQuery`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

fn parse_page_param(raw: Option<String>, name: &str, default: i64) -> Result<i64, AppError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::bad_request(format!("invalid {name} parameter"))),
        None => Ok(default),
    }
}

impl ListVideosParams {
    fn into_query(self) -> Result<VideoListQuery, AppError> {
        let defaults = VideoListQuery::default();

        let page = parse_page_param(self.page, "page", defaults.page)?;
        let limit = parse_page_param(self.limit, "limit", defaults.limit)?;

        let owner_id = match self.user_id {
            Some(raw) => Some(parse_id(&raw, "user")?),
            None => None,
        };

        // The direction only applies when the sort field itself is on the
        // allow-list; an unknown field falls back to the default ordering.
        let (sort_by, sort_dir) = match self.sort_by.as_deref().and_then(SortField::parse) {
            Some(field) => {
                let dir = match self.sort_type.as_deref() {
                    Some("asc") => SortDirection::Asc,
                    _ => SortDirection::Desc,
                };
                (field, dir)
            }
            None => (defaults.sort_by, defaults.sort_dir),
        };

        Ok(VideoListQuery {
            page,
            limit,
            title_query: self.query.filter(|q| !q.trim().is_empty()),
            owner_id,
            sort_by,
            sort_dir,
        })
    }
}

pub async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<ListVideosParams>,
) -> AppResult<Json<ApiResponse<VideoPage>>> {
    let query = params.into_query()?;
    let page = state.stats.list_videos(query).await?;
    Ok(Json(ApiResponse::ok(page, "videos fetched successfully")))
}

pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> AppResult<Json<ApiResponse<Video>>> {
    let video_id = parse_id(&video_id, "video")?;

    // The read bumps the view counter; a miss is a plain 404.
    let video = state
        .videos
        .record_view(video_id)
        .await?
        .ok_or_else(|| AppError::new(axum::http::StatusCode::NOT_FOUND, "video not found"))?;
    debug!(%video_id, views = video.views, "video viewed");
    Ok(Json(ApiResponse::ok(video, "video fetched successfully")))
}

pub async fn channel_stats(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> AppResult<Json<ApiResponse<ChannelStats>>> {
    let channel_id = parse_id(&channel_id, "channel")?;
    let stats = state.stats.channel_stats(channel_id).await?;
    Ok(Json(ApiResponse::ok(
        stats,
        "channel stats fetched successfully",
    )))
}
