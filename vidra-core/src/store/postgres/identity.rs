use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NewUser, User};
use crate::error::{Error, Result};
use crate::store::IdentityRepository;

const USER_COLUMNS: &str = "id, username, email, full_name, avatar_url, subscriber_count, \
     created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn create_user_with_password(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, full_name, avatar_url, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match Error::from(err) {
            Error::Conflict(_) => Error::Conflict(
                "user with this username or email already exists".to_string(),
            ),
            other => other,
        })?;
        Ok(created)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 OR email = $1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hash)
    }

    async fn set_refresh_token(&self, user_id: Uuid, token: Option<&str>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $1, updated_at = now() WHERE id = $2",
        )
        .bind(token)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("identity".to_string()));
        }
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        user_id: Uuid,
        presented: &str,
        next: &str,
    ) -> Result<bool> {
        // The WHERE clause carries the anti-replay guarantee: a stale
        // presented value matches zero rows.
        let result = sqlx::query(
            "UPDATE users SET refresh_token = $1, updated_at = now() \
             WHERE id = $2 AND refresh_token = $3",
        )
        .bind(next)
        .bind(user_id)
        .bind(presented)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE refresh_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }
}
