use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::EngagementKind;
use crate::error::{Error, Result};
use crate::store::postgres::counter_target;
use crate::store::{AcquireOutcome, EngagementRepository};

#[derive(Debug, Clone)]
pub struct PostgresEngagementRepository {
    pool: PgPool,
}

impl PostgresEngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementRepository for PostgresEngagementRepository {
    async fn acquire_edge(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<AcquireOutcome> {
        let (table, column) = counter_target(kind);
        let mut tx = self.pool.begin().await?;

        // The composite primary key resolves concurrent duplicate inserts:
        // exactly one of them reports a row.
        let inserted = sqlx::query(
            "INSERT INTO engagement_edges (actor_id, subject_id, kind) \
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(actor_id)
        .bind(subject_id)
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            let counter = sqlx::query_scalar::<_, i64>(&format!(
                "UPDATE {table} SET {column} = {column} + 1 WHERE id = $1 RETURNING {column}"
            ))
            .bind(subject_id)
            .fetch_optional(&mut *tx)
            .await?;

            match counter {
                Some(counter) => {
                    tx.commit().await?;
                    Ok(AcquireOutcome::Inserted(counter))
                }
                None => {
                    tx.rollback().await?;
                    Err(Error::NotFound("engagement subject".to_string()))
                }
            }
        } else {
            let counter = sqlx::query_scalar::<_, i64>(&format!(
                "SELECT {column} FROM {table} WHERE id = $1"
            ))
            .bind(subject_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("engagement subject".to_string()))?;
            tx.commit().await?;
            Ok(AcquireOutcome::AlreadyHeld(counter))
        }
    }

    async fn release_edge(
        &self,
        actor_id: Uuid,
        subject_id: Uuid,
        kind: EngagementKind,
    ) -> Result<Option<i64>> {
        let (table, column) = counter_target(kind);
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM engagement_edges \
             WHERE actor_id = $1 AND subject_id = $2 AND kind = $3",
        )
        .bind(actor_id)
        .bind(subject_id)
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if !deleted {
            tx.rollback().await?;
            return Ok(None);
        }

        let counter = sqlx::query_scalar::<_, i64>(&format!(
            "UPDATE {table} SET {column} = {column} - 1 WHERE id = $1 RETURNING {column}"
        ))
        .bind(subject_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("engagement subject".to_string()))?;

        tx.commit().await?;
        Ok(Some(counter))
    }

    async fn edge_count(&self, subject_id: Uuid, kind: EngagementKind) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT count(*) FROM engagement_edges WHERE subject_id = $1 AND kind = $2",
        )
        .bind(subject_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn counter_value(&self, subject_id: Uuid, kind: EngagementKind) -> Result<i64> {
        let (table, column) = counter_target(kind);
        let counter = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT {column} FROM {table} WHERE id = $1"
        ))
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("engagement subject".to_string()))?;
        Ok(counter)
    }

    async fn reconcile_counters(&self, kind: EngagementKind) -> Result<u64> {
        let (table, column) = counter_target(kind);
        let mut tx = self.pool.begin().await?;

        // Subjects with live edges whose counter drifted.
        let resynced = sqlx::query(&format!(
            "UPDATE {table} t SET {column} = live.n \
             FROM (SELECT subject_id, count(*) AS n FROM engagement_edges \
                   WHERE kind = $1 GROUP BY subject_id) AS live \
             WHERE t.id = live.subject_id AND t.{column} <> live.n"
        ))
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Subjects with a nonzero counter but no edges left at all.
        let zeroed = sqlx::query(&format!(
            "UPDATE {table} t SET {column} = 0 \
             WHERE t.{column} <> 0 AND NOT EXISTS \
                   (SELECT 1 FROM engagement_edges e \
                    WHERE e.subject_id = t.id AND e.kind = $1)"
        ))
        .bind(kind.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(resynced + zeroed)
    }
}
