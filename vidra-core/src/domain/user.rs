//! Identity types and the request shapes the auth surface accepts.
//!
//! The refresh-token pointer and password hash never appear on [`User`];
//! they are reachable only through the identity repository so a serialized
//! user can never leak credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A registered identity. Also acts as a channel: other users subscribe to
/// it and `subscriber_count` is the derived counter for those edges.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Unique username, stored lowercase.
    pub username: String,
    /// Unique email, stored lowercase.
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    /// Derived counter: live ChannelSubscription edges pointing at this user.
    pub subscriber_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create an identity; the credential hash travels
/// separately so this struct stays safe to log.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// JWT claims carried by access tokens. Stateless: nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub sub: Uuid,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl RegisterRequest {
    pub const MIN_PASSWORD_LEN: usize = 8;

    pub fn validate(&self) -> Result<NewUser> {
        let username = self.username.trim().to_lowercase();
        let email = self.email.trim().to_lowercase();
        let full_name = self.full_name.trim().to_string();

        if username.is_empty() || email.is_empty() || full_name.is_empty() {
            return Err(Error::Validation("all fields are required".to_string()));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
            || !(3..=30).contains(&username.len())
        {
            return Err(Error::Validation(
                "username must be 3-30 characters, alphanumeric or underscore".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(Error::Validation("invalid email address".to_string()));
        }
        if self.password.len() < Self::MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {} characters",
                Self::MIN_PASSWORD_LEN
            )));
        }

        Ok(NewUser {
            username,
            email,
            full_name,
            avatar_url: self.avatar_url.clone(),
        })
    }
}

/// Login accepts a username or an email; at least one must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// The identifier used for lookup, normalized.
    pub fn identifier(&self) -> Result<String> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Validation("user credentials required".to_string()))
    }
}
