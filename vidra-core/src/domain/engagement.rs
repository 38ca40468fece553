//! Engagement edges: records whose existence encodes a boolean relationship
//! (liked, subscribed) between an actor and a subject. The edge itself never
//! leaves the store; components see only states and counters.

use serde::{Deserialize, Serialize};

/// Which relationship an edge encodes. The kind selects the subject
/// collection and its derived counter; the toggle algorithm itself is
/// identical across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    VideoLike,
    CommentLike,
    TweetLike,
    ChannelSubscription,
}

impl EngagementKind {
    pub const ALL: [EngagementKind; 4] = [
        EngagementKind::VideoLike,
        EngagementKind::CommentLike,
        EngagementKind::TweetLike,
        EngagementKind::ChannelSubscription,
    ];

    /// Stable storage discriminant.
    pub fn as_str(self) -> &'static str {
        match self {
            EngagementKind::VideoLike => "video_like",
            EngagementKind::CommentLike => "comment_like",
            EngagementKind::TweetLike => "tweet_like",
            EngagementKind::ChannelSubscription => "channel_subscription",
        }
    }

    /// Parse the `{kind}` path segment of the like-toggle route. Subscriptions
    /// have their own route and are not addressable here.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "video" => Some(EngagementKind::VideoLike),
            "comment" => Some(EngagementKind::CommentLike),
            "tweet" => Some(EngagementKind::TweetLike),
            _ => None,
        }
    }
}

/// Whether the edge is live after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementState {
    Active,
    Inactive,
}

/// Result of a toggle: the new state and the subject's derived counter as of
/// the same atomic operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub state: EngagementState,
    pub counter: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_map_to_like_kinds_only() {
        assert_eq!(
            EngagementKind::from_path_segment("video"),
            Some(EngagementKind::VideoLike)
        );
        assert_eq!(
            EngagementKind::from_path_segment("comment"),
            Some(EngagementKind::CommentLike)
        );
        assert_eq!(
            EngagementKind::from_path_segment("tweet"),
            Some(EngagementKind::TweetLike)
        );
        assert_eq!(EngagementKind::from_path_segment("subscription"), None);
        assert_eq!(EngagementKind::from_path_segment("playlist"), None);
    }

    #[test]
    fn discriminants_are_distinct_and_stable() {
        let mut seen = std::collections::HashSet::new();
        for kind in EngagementKind::ALL {
            assert!(seen.insert(kind.as_str()));
        }
        assert_eq!(EngagementKind::VideoLike.as_str(), "video_like");
    }
}
