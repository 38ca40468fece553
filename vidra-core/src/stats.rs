//! Derived per-channel metrics and the paginated public listing.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ChannelStats, VideoListQuery, VideoPage};
use crate::error::{Error, Result};
use crate::store::{IdentityRepository, VideoRepository};

pub struct StatsAggregator {
    identities: Arc<dyn IdentityRepository>,
    videos: Arc<dyn VideoRepository>,
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator").finish_non_exhaustive()
    }
}

impl StatsAggregator {
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        videos: Arc<dyn VideoRepository>,
    ) -> Self {
        Self { identities, videos }
    }

    /// Dashboard metrics for one channel. The subscriber count reads the
    /// channel's live derived counter; the video totals are summed in one
    /// query. A channel with no videos is a valid zero-valued result.
    pub async fn channel_stats(&self, channel_id: Uuid) -> Result<ChannelStats> {
        let channel = self
            .identities
            .get_user_by_id(channel_id)
            .await?
            .ok_or_else(|| Error::NotFound("channel".to_string()))?;
        let totals = self.videos.owner_totals(channel_id).await?;

        Ok(ChannelStats {
            channel_id: channel.id,
            username: channel.username,
            full_name: channel.full_name,
            avatar_url: channel.avatar_url,
            subscriber_count: channel.subscriber_count,
            total_videos: totals.total_videos,
            total_views: totals.total_views,
            total_likes: totals.total_likes,
        })
    }

    /// Published-video listing: filtered, sorted by an allow-listed field,
    /// offset-paginated, with items and total count taken at the same
    /// instant.
    pub async fn list_videos(&self, query: VideoListQuery) -> Result<VideoPage> {
        if query.page <= 0 || query.limit <= 0 {
            return Err(Error::Validation(
                "page and limit must be positive integers".to_string(),
            ));
        }

        let (items, total_docs) = self.videos.list_videos(&query).await?;
        let total_pages = ((total_docs + query.limit - 1) / query.limit).max(1);

        Ok(VideoPage {
            items,
            page: query.page,
            limit: query.limit,
            total_docs,
            total_pages,
            has_next: query.page < total_pages,
            has_prev: query.page > 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EngagementKind, NewUser, NewVideo, SortDirection, SortField,
    };
    use crate::engagement::EngagementLedger;
    use crate::store::memory::MemoryStore;

    async fn user(store: &Arc<MemoryStore>, name: &str) -> Uuid {
        store
            .create_user_with_password(
                &NewUser {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    full_name: name.to_string(),
                    avatar_url: None,
                },
                "hash",
            )
            .await
            .unwrap()
            .id
    }

    async fn video(store: &Arc<MemoryStore>, owner: Uuid, title: &str, published: bool) -> Uuid {
        store
            .create_video(&NewVideo {
                owner_id: owner,
                title: title.to_string(),
                description: String::new(),
                video_url: format!("https://cdn.example.com/{title}"),
                thumbnail_url: None,
                duration: 60.0,
                is_published: published,
            })
            .await
            .unwrap()
            .id
    }

    fn aggregator(store: &Arc<MemoryStore>) -> StatsAggregator {
        StatsAggregator::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn zero_video_channel_yields_zeros_not_an_error() {
        let store = Arc::new(MemoryStore::new());
        let channel = user(&store, "quiet").await;

        let stats = aggregator(&store).channel_stats(channel).await.unwrap();
        assert_eq!(stats.subscriber_count, 0);
        assert_eq!(stats.total_videos, 0);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.total_likes, 0);
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        assert!(matches!(
            aggregator(&store).channel_stats(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn channel_stats_combine_counters_and_video_totals() {
        let store = Arc::new(MemoryStore::new());
        let channel = user(&store, "creator").await;
        let v1 = video(&store, channel, "one", true).await;
        let v2 = video(&store, channel, "two", false).await;

        // Views bump on read; likes and subscriptions through the ledger.
        store.record_view(v1).await.unwrap();
        store.record_view(v1).await.unwrap();
        store.record_view(v2).await.unwrap();

        let ledger = EngagementLedger::new(store.clone());
        for _ in 0..2 {
            ledger
                .toggle(Uuid::new_v4(), v1, EngagementKind::VideoLike)
                .await
                .unwrap();
        }
        for _ in 0..3 {
            ledger
                .toggle(Uuid::new_v4(), channel, EngagementKind::ChannelSubscription)
                .await
                .unwrap();
        }

        let stats = aggregator(&store).channel_stats(channel).await.unwrap();
        assert_eq!(stats.subscriber_count, 3);
        assert_eq!(stats.total_videos, 2);
        assert_eq!(stats.total_views, 3);
        assert_eq!(stats.total_likes, 2);
        assert_eq!(stats.username, "creator");
    }

    #[tokio::test]
    async fn listing_rejects_non_positive_page_or_limit() {
        let store = Arc::new(MemoryStore::new());
        let agg = aggregator(&store);

        for (page, limit) in [(0, 10), (1, 0), (-1, 10)] {
            let result = agg
                .list_videos(VideoListQuery {
                    page,
                    limit,
                    ..VideoListQuery::default()
                })
                .await;
            assert!(matches!(result, Err(Error::Validation(_))));
        }
    }

    #[tokio::test]
    async fn second_page_of_fifteen_published_videos() {
        let store = Arc::new(MemoryStore::new());
        let owner = user(&store, "uploader").await;
        for n in 0..15 {
            video(&store, owner, &format!("clip {n:02}"), true).await;
        }
        // Unpublished videos never count.
        video(&store, owner, "draft", false).await;

        let page = aggregator(&store)
            .list_videos(VideoListQuery {
                page: 2,
                limit: 10,
                ..VideoListQuery::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_docs, 15);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn absurd_page_number_yields_empty_page_without_overflow() {
        let store = Arc::new(MemoryStore::new());
        let owner = user(&store, "uploader").await;
        for n in 0..3 {
            video(&store, owner, &format!("clip {n}"), true).await;
        }

        let page = aggregator(&store)
            .list_videos(VideoListQuery {
                page: i64::MAX,
                limit: 10,
                ..VideoListQuery::default()
            })
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total_docs, 3);
        assert_eq!(page.total_pages, 1);
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn empty_result_still_reports_one_page() {
        let store = Arc::new(MemoryStore::new());
        let page = aggregator(&store)
            .list_videos(VideoListQuery::default())
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_docs, 0);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[tokio::test]
    async fn title_filter_is_case_insensitive_and_owner_filter_applies() {
        let store = Arc::new(MemoryStore::new());
        let alice = user(&store, "alice").await;
        let bob = user(&store, "bob").await;
        video(&store, alice, "Rust Streams Deep Dive", true).await;
        video(&store, alice, "Cooking pasta", true).await;
        video(&store, bob, "rust for beginners", true).await;

        let page = aggregator(&store)
            .list_videos(VideoListQuery {
                title_query: Some("RUST".to_string()),
                ..VideoListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_docs, 2);

        let page = aggregator(&store)
            .list_videos(VideoListQuery {
                title_query: Some("rust".to_string()),
                owner_id: Some(alice),
                ..VideoListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_docs, 1);
        assert_eq!(page.items[0].title, "Rust Streams Deep Dive");
    }

    #[tokio::test]
    async fn sorting_respects_allow_listed_field_and_direction() {
        let store = Arc::new(MemoryStore::new());
        let owner = user(&store, "sorter").await;
        let a = video(&store, owner, "aardvark", true).await;
        let b = video(&store, owner, "zebra", true).await;
        store.record_view(b).await.unwrap();

        let page = aggregator(&store)
            .list_videos(VideoListQuery {
                sort_by: SortField::Title,
                sort_dir: SortDirection::Asc,
                ..VideoListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items[0].id, a);

        let page = aggregator(&store)
            .list_videos(VideoListQuery {
                sort_by: SortField::Views,
                sort_dir: SortDirection::Desc,
                ..VideoListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items[0].id, b);
    }
}
