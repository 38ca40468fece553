mod auth;
mod errors;
mod handlers;
mod infra;
mod routes;

#[cfg(test)]
mod tests;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidra_core::auth::ArgonHasher;
use vidra_core::store::postgres::{
    PostgresEngagementRepository, PostgresIdentityRepository, PostgresVideoRepository,
};

use crate::infra::{app_state::AppState, config::Config, reconciler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,vidra_server=debug,vidra_core=debug")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to postgres")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let identities = Arc::new(PostgresIdentityRepository::new(pool.clone()));
    let edges = Arc::new(PostgresEngagementRepository::new(pool.clone()));
    let videos = Arc::new(PostgresVideoRepository::new(pool.clone()));
    let state = AppState::assemble(
        config.clone(),
        identities,
        edges,
        videos,
        Arc::new(ArgonHasher::default()),
    );

    tokio::spawn(reconciler::run(
        state.ledger.clone(),
        Duration::from_secs(config.reconcile_interval_secs),
    ));

    let app = routes::build_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "vidra server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
