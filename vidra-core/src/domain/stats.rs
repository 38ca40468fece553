use serde::Serialize;
use uuid::Uuid;

/// Per-channel dashboard metrics. `subscriber_count` reads the channel's
/// derived counter; the totals are sums over the channel's own videos.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub channel_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub subscriber_count: i64,
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
}

/// Aggregates over one owner's videos, computed in a single query.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerTotals {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
}
