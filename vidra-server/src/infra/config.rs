//! Environment-backed configuration. `.env` is honored in development via
//! dotenvy before this loads.

use anyhow::{Context, Result};
use vidra_core::auth::DEFAULT_ACCESS_TTL_SECS;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    /// How often the background pass reconciles derived counters.
    pub reconcile_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    /// Set the Secure flag on session cookies. On everywhere except local
    /// plain-HTTP development.
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env_or("VIDRA_HOST", "0.0.0.0"),
                port: parse_env("VIDRA_PORT", 8080)?,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            auth: AuthConfig {
                jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
                access_ttl_secs: parse_env("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?,
                secure_cookies: parse_env("SECURE_COOKIES", true)?,
            },
            reconcile_interval_secs: parse_env("RECONCILE_INTERVAL_SECS", 300)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid {key}: `{raw}`")),
        Err(_) => Ok(default),
    }
}
