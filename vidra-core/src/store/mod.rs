//! Repository ports. Every component receives these as explicit
//! dependencies at construction; nothing reaches for an ambient handle.
//!
//! Each method is a single atomic store operation scoped to one row or one
//! subject. Race resolution happens here, never via application locks.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    EngagementKind, NewUser, NewVideo, OwnerTotals, User, Video, VideoListQuery,
};
use crate::error::Result;

/// Identity storage, including the single refresh-token pointer per user.
/// Only the token service mutates the pointer.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Fails with `Conflict` when the username or email is already taken;
    /// the existence check and the insert are one atomic operation.
    async fn create_user_with_password(&self, user: &NewUser, password_hash: &str)
    -> Result<User>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Lookup by username or email (the same normalized identifier matches
    /// either column).
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>>;

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>>;

    /// Unconditional overwrite of the refresh pointer; `None` clears it.
    /// Fails with `NotFound` when the identity does not exist.
    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<()>;

    /// Atomic compare-and-swap: install `next` only while the stored pointer
    /// still equals `presented`. Returns whether the swap happened. Two
    /// concurrent swaps from the same `presented` value see exactly one
    /// `true`.
    async fn swap_refresh_token(
        &self,
        user_id: Uuid,
        presented: &str,
        next: &str,
    ) -> Result<bool>;

    /// Resolve the identity currently holding `token` as its pointer.
    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Uuid>>;
}

/// What happened to an edge-insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The edge was created and the counter incremented; value as of the
    /// same atomic operation.
    Inserted(i64),
    /// A concurrent duplicate insert raced ahead; the counter was left
    /// untouched. Carries the current counter value.
    AlreadyHeld(i64),
}

/// Edge storage plus the coupled derived counters. The edge mutation and the
/// counter mutation are one atomic unit per subject.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Conditional insert guarded by the (actor, subject, kind) uniqueness
    /// invariant. Fails with `NotFound` when the subject does not exist.
    async fn acquire_edge(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<AcquireOutcome>;

    /// Conditional delete; on a hit the counter is decremented in the same
    /// operation and the new value returned. `None` means no live edge.
    async fn release_edge(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<Option<i64>>;

    /// Count of live edges for one subject and kind.
    async fn edge_count(&self, subject_id: Uuid, kind: EngagementKind) -> Result<i64>;

    /// Current derived-counter value for one subject and kind.
    async fn counter_value(&self, subject_id: Uuid, kind: EngagementKind) -> Result<i64>;

    /// Recompute every counter of `kind` as the count of its live edges,
    /// correcting mismatches. Touches counters only, never edges. Returns
    /// the number of corrected subjects.
    async fn reconcile_counters(&self, kind: EngagementKind) -> Result<u64>;
}

/// Video resources: listing, stats input and the monotonic view counter.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: &NewVideo) -> Result<Video>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>>;

    /// Bump the view counter and return the updated video.
    async fn record_view(&self, id: Uuid) -> Result<Option<Video>>;

    /// One logical query returning the page slice and the total matching
    /// count at the same instant.
    async fn list_videos(&self, query: &VideoListQuery) -> Result<(Vec<Video>, i64)>;

    /// Aggregates over one owner's videos in a single query.
    async fn owner_totals(&self, owner_id: Uuid) -> Result<OwnerTotals>;
}
