//! In-memory store backend.
//!
//! Implements every repository port over plain maps behind one mutex, so each
//! port method is a single atomic operation exactly like its SQL counterpart.
//! Used for isolated service and HTTP tests; the coupled edge+counter
//! mutation and the refresh-pointer compare-and-swap keep the same semantics
//! the Postgres backend gets from transactions and conditional writes.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::{
    EngagementKind, NewUser, NewVideo, OwnerTotals, SortDirection, SortField, User, Video,
    VideoListQuery,
};
use crate::error::{Error, Result};
use crate::store::{AcquireOutcome, EngagementRepository, IdentityRepository, VideoRepository};

#[derive(Debug)]
struct UserRow {
    user: User,
    password_hash: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, UserRow>,
    videos: HashMap<Uuid, Video>,
    /// Comment like-counters; comment content is outside this core.
    comments: HashMap<Uuid, i64>,
    /// Tweet like-counters.
    tweets: HashMap<Uuid, i64>,
    edges: HashSet<(Uuid, Uuid, EngagementKind)>,
}

impl Inner {
    fn counter_mut(&mut self, subject_id: Uuid, kind: EngagementKind) -> Option<&mut i64> {
        match kind {
            EngagementKind::VideoLike => {
                self.videos.get_mut(&subject_id).map(|v| &mut v.like_count)
            }
            EngagementKind::CommentLike => self.comments.get_mut(&subject_id),
            EngagementKind::TweetLike => self.tweets.get_mut(&subject_id),
            EngagementKind::ChannelSubscription => self
                .users
                .get_mut(&subject_id)
                .map(|row| &mut row.user.subscriber_count),
        }
    }

    fn counter(&self, subject_id: Uuid, kind: EngagementKind) -> Option<i64> {
        match kind {
            EngagementKind::VideoLike => self.videos.get(&subject_id).map(|v| v.like_count),
            EngagementKind::CommentLike => self.comments.get(&subject_id).copied(),
            EngagementKind::TweetLike => self.tweets.get(&subject_id).copied(),
            EngagementKind::ChannelSubscription => self
                .users
                .get(&subject_id)
                .map(|row| row.user.subscriber_count),
        }
    }

    fn subjects_of(&self, kind: EngagementKind) -> Vec<Uuid> {
        match kind {
            EngagementKind::VideoLike => self.videos.keys().copied().collect(),
            EngagementKind::CommentLike => self.comments.keys().copied().collect(),
            EngagementKind::TweetLike => self.tweets.keys().copied().collect(),
            EngagementKind::ChannelSubscription => self.users.keys().copied().collect(),
        }
    }

    fn live_edge_count(&self, subject_id: Uuid, kind: EngagementKind) -> i64 {
        self.edges
            .iter()
            .filter(|(_, s, k)| *s == subject_id && *k == kind)
            .count() as i64
    }
}

/// Shared in-memory backend; cheap to clone handles via `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a comment as a likeable subject.
    pub fn register_comment(&self, id: Uuid) {
        self.inner.lock().comments.insert(id, 0);
    }

    /// Register a tweet as a likeable subject.
    pub fn register_tweet(&self, id: Uuid) {
        self.inner.lock().tweets.insert(id, 0);
    }

    /// Overwrite a derived counter without touching edges. Exists to set up
    /// drift for reconciliation tests and migration-repair scenarios.
    pub fn force_counter(&self, subject_id: Uuid, kind: EngagementKind, value: i64) {
        let mut inner = self.inner.lock();
        if let Some(counter) = inner.counter_mut(subject_id, kind) {
            *counter = value;
        }
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn create_user_with_password(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User> {
        let mut inner = self.inner.lock();
        let taken = inner
            .users
            .values()
            .any(|row| row.user.username == user.username || row.user.email == user.email);
        if taken {
            return Err(Error::Conflict(
                "user with this username or email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            subscriber_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(
            created.id,
            UserRow {
                user: created.clone(),
                password_hash: password_hash.to_string(),
                refresh_token: None,
            },
        );
        Ok(created)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.lock().users.get(&id).map(|row| row.user.clone()))
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .users
            .values()
            .find(|row| row.user.username == identifier || row.user.email == identifier)
            .map(|row| row.user.clone()))
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .inner
            .lock()
            .users
            .get(&user_id)
            .map(|row| row.password_hash.clone()))
    }

    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<()> {
        let mut inner = self.inner.lock();
        let row = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| Error::NotFound("identity".to_string()))?;
        row.refresh_token = token.map(str::to_string);
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_id: Uuid,
        presented: &str,
        next: &str,
    ) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Some(row) = inner.users.get_mut(&user_id) else {
            return Ok(false);
        };
        if row.refresh_token.as_deref() == Some(presented) {
            row.refresh_token = Some(next.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Uuid>> {
        Ok(self
            .inner
            .lock()
            .users
            .values()
            .find(|row| row.refresh_token.as_deref() == Some(token))
            .map(|row| row.user.id))
    }
}

#[async_trait]
impl EngagementRepository for MemoryStore {
    async fn acquire_edge(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<AcquireOutcome> {
        let mut inner = self.inner.lock();
        if inner.counter(subject_id, kind).is_none() {
            return Err(Error::NotFound("engagement subject".to_string()));
        }
        if inner.edges.insert((actor_id, subject_id, kind)) {
            let counter = inner
                .counter_mut(subject_id, kind)
                .expect("subject checked above");
            *counter += 1;
            Ok(AcquireOutcome::Inserted(*counter))
        } else {
            Ok(AcquireOutcome::AlreadyHeld(
                inner.counter(subject_id, kind).expect("subject checked above"),
            ))
        }
    }

    async fn release_edge(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<Option<i64>> {
        let mut inner = self.inner.lock();
        if !inner.edges.remove(&(actor_id, subject_id, kind)) {
            return Ok(None);
        }
        let counter = inner
            .counter_mut(subject_id, kind)
            .ok_or_else(|| Error::NotFound("engagement subject".to_string()))?;
        *counter -= 1;
        Ok(Some(*counter))
    }

    async fn edge_count(&self, subject_id: Uuid, kind: EngagementKind) -> Result<i64> {
        Ok(self.inner.lock().live_edge_count(subject_id, kind))
    }

    async fn counter_value(&self, subject_id: Uuid, kind: EngagementKind) -> Result<i64> {
        self.inner
            .lock()
            .counter(subject_id, kind)
            .ok_or_else(|| Error::NotFound("engagement subject".to_string()))
    }

    async fn reconcile_counters(&self, kind: EngagementKind) -> Result<u64> {
        let mut inner = self.inner.lock();
        let mut corrected = 0;
        for subject_id in inner.subjects_of(kind) {
            let live = inner.live_edge_count(subject_id, kind);
            let counter = inner
                .counter_mut(subject_id, kind)
                .expect("subject ids taken from the same map");
            if *counter != live {
                *counter = live;
                corrected += 1;
            }
        }
        Ok(corrected)
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn create_video(&self, video: &NewVideo) -> Result<Video> {
        let created = Video {
            id: Uuid::new_v4(),
            owner_id: video.owner_id,
            title: video.title.clone(),
            description: video.description.clone(),
            video_url: video.video_url.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            duration: video.duration,
            views: 0,
            like_count: 0,
            is_published: video.is_published,
            created_at: Utc::now(),
        };
        self.inner.lock().videos.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.inner.lock().videos.get(&id).cloned())
    }

    async fn record_view(&self, id: Uuid) -> Result<Option<Video>> {
        let mut inner = self.inner.lock();
        Ok(inner.videos.get_mut(&id).map(|video| {
            video.views += 1;
            video.clone()
        }))
    }

    async fn list_videos(&self, query: &VideoListQuery) -> Result<(Vec<Video>, i64)> {
        let inner = self.inner.lock();
        let needle = query
            .title_query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<Video> = inner
            .videos
            .values()
            .filter(|v| v.is_published)
            .filter(|v| query.owner_id.is_none_or(|owner| v.owner_id == owner))
            .filter(|v| {
                needle
                    .as_deref()
                    .is_none_or(|n| v.title.to_lowercase().contains(n))
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            let ordering = match query.sort_by {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Views => a.views.cmp(&b.views),
                SortField::Duration => a.duration.total_cmp(&b.duration),
                SortField::Title => a.title.cmp(&b.title),
            };
            match query.sort_dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.offset().max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((items, total))
    }

    async fn owner_totals(&self, owner_id: Uuid) -> Result<OwnerTotals> {
        let inner = self.inner.lock();
        let mut totals = OwnerTotals::default();
        for video in inner.videos.values().filter(|v| v.owner_id == owner_id) {
            totals.total_videos += 1;
            totals.total_views += video.views;
            totals.total_likes += video.like_count;
        }
        Ok(totals)
    }
}
