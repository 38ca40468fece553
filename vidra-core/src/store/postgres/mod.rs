//! Postgres store backend.
//!
//! Plain-SQL repositories over a shared `PgPool`. Every race-sensitive write
//! is either a single conditional statement (pointer compare-and-swap,
//! `ON CONFLICT DO NOTHING`) or a short transaction coupling an edge mutation
//! with its counter.

mod engagement;
mod identity;
mod videos;

pub use engagement::PostgresEngagementRepository;
pub use identity::PostgresIdentityRepository;
pub use videos::PostgresVideoRepository;

use crate::domain::EngagementKind;

/// Table and counter column a kind's derived counter lives in.
pub(crate) fn counter_target(kind: EngagementKind) -> (&'static str, &'static str) {
    match kind {
        EngagementKind::VideoLike => ("videos", "like_count"),
        EngagementKind::CommentLike => ("comments", "like_count"),
        EngagementKind::TweetLike => ("tweets", "like_count"),
        EngagementKind::ChannelSubscription => ("users", "subscriber_count"),
    }
}
