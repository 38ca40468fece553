use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::{NewVideo, OwnerTotals, SortDirection, Video, VideoListQuery};
use crate::error::Result;
use crate::store::VideoRepository;

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_url, thumbnail_url, \
     duration, views, like_count, is_published, created_at";

#[derive(Debug, Clone)]
pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a VideoListQuery) {
        builder.push(" WHERE is_published = TRUE");
        if let Some(owner_id) = query.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(needle) = query
            .title_query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            builder
                .push(" AND title ILIKE ")
                .push_bind(format!("%{needle}%"));
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VideoPageRow {
    #[sqlx(flatten)]
    video: Video,
    total_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OwnerTotalsRow {
    total_videos: i64,
    total_views: i64,
    total_likes: i64,
}

#[async_trait]
impl VideoRepository for PostgresVideoRepository {
    async fn create_video(&self, video: &NewVideo) -> Result<Video> {
        let created = sqlx::query_as::<_, Video>(&format!(
            "INSERT INTO videos \
             (id, owner_id, title, description, video_url, thumbnail_url, duration, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(video.duration)
        .bind(video.is_published)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    async fn record_view(&self, id: Uuid) -> Result<Option<Video>> {
        let video = sqlx::query_as::<_, Video>(&format!(
            "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(video)
    }

    async fn list_videos(&self, query: &VideoListQuery) -> Result<(Vec<Video>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {VIDEO_COLUMNS}, count(*) OVER () AS total_count FROM videos"
        ));
        Self::push_filters(&mut builder, query);

        // Sort column comes from the allow-listed enum, never from input.
        builder
            .push(" ORDER BY ")
            .push(query.sort_by.column())
            .push(match query.sort_dir {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            });
        builder
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let rows: Vec<VideoPageRow> = builder.build_query_as().fetch_all(&self.pool).await?;

        if let Some(first) = rows.first() {
            let total = first.total_count;
            return Ok((rows.into_iter().map(|r| r.video).collect(), total));
        }

        // Page past the end: the window count vanished with the slice, so
        // recount under the same filters.
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM videos");
        Self::push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok((Vec::new(), total))
    }

    async fn owner_totals(&self, owner_id: Uuid) -> Result<OwnerTotals> {
        let row = sqlx::query_as::<_, OwnerTotalsRow>(
            "SELECT count(*) AS total_videos, \
                    COALESCE(sum(views), 0)::bigint AS total_views, \
                    COALESCE(sum(like_count), 0)::bigint AS total_likes \
             FROM videos WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(OwnerTotals {
            total_videos: row.total_videos,
            total_views: row.total_views,
            total_likes: row.total_likes,
        })
    }
}
