//! Video resources and the listing query model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    /// Duration in seconds.
    pub duration: f64,
    /// Monotonic view counter, bumped on each view-read. Not an engagement
    /// counter; the ledger never touches it.
    pub views: i64,
    /// Derived counter: live VideoLike edges pointing at this video.
    pub like_count: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: f64,
    pub is_published: bool,
}

/// Allow-listed sort fields for the public listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    /// Accepts the public query-string spelling; anything outside the
    /// allow-list falls back to the default ordering.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(SortField::CreatedAt),
            "views" => Some(SortField::Views),
            "duration" => Some(SortField::Duration),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Views => "views",
            SortField::Duration => "duration",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filter, sort and page selection for the published-video listing.
#[derive(Debug, Clone)]
pub struct VideoListQuery {
    pub page: i64,
    pub limit: i64,
    /// Case-insensitive title substring.
    pub title_query: Option<String>,
    pub owner_id: Option<Uuid>,
    pub sort_by: SortField,
    pub sort_dir: SortDirection,
}

impl Default for VideoListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            title_query: None,
            owner_id: None,
            sort_by: SortField::default(),
            sort_dir: SortDirection::default(),
        }
    }
}

impl VideoListQuery {
    /// Saturating, so an absurd page number selects an empty slice past the
    /// end instead of overflowing.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of results plus the total count taken at the same instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPage {
    pub items: Vec<Video>,
    pub page: i64,
    pub limit: i64,
    pub total_docs: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}
