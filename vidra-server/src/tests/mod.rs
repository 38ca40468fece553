//! HTTP tests over the full router with the in-memory store backend.

mod engagement_flow;

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{Value, json};
use vidra_core::auth::ArgonHasher;
use vidra_core::store::memory::MemoryStore;

use crate::infra::app_state::AppState;
use crate::infra::config::{AuthConfig, Config, DatabaseConfig, ServerConfig};
use crate::routes::build_router;

pub(crate) const PASSWORD: &str = "correct-horse-battery";

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-signing-secret".to_string(),
            access_ttl_secs: 900,
            secure_cookies: false,
        },
        reconcile_interval_secs: 300,
    })
}

/// Router over a fresh [`MemoryStore`]; the store handle is returned so tests
/// can seed subjects directly.
pub(crate) fn test_server() -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::assemble(
        test_config(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(ArgonHasher),
    );
    let server = TestServer::new(build_router(state)).expect("router should start");
    (server, store)
}

/// Register `username` and return the created user object.
pub(crate) async fn register(server: &TestServer, username: &str) -> Value {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "fullName": format!("{username} test"),
            "password": PASSWORD,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Register + login; returns (user, access token, refresh token).
pub(crate) async fn login(server: &TestServer, username: &str) -> (Value, String, String) {
    let user = register(server, username).await;
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": username, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    (user, access, refresh)
}
