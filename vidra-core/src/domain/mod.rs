//! Domain types shared across components.

pub mod engagement;
pub mod stats;
pub mod user;
pub mod video;

pub use engagement::{EngagementKind, EngagementState, ToggleOutcome};
pub use stats::{ChannelStats, OwnerTotals};
pub use user::{Claims, LoginRequest, NewUser, RegisterRequest, User};
pub use video::{NewVideo, SortDirection, SortField, Video, VideoListQuery, VideoPage};
