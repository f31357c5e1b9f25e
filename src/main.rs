use anyhow::Context;
use blog_api::{
    AppState, PostgresRepository, PostgresSessionStore,
    config::{AppConfig, Env},
    create_router,
    repository::RepositoryState,
    session::SessionState,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, storage, then the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration; refuses to start on a bad environment
    dotenv::dotenv().ok();
    let config = AppConfig::load().context("invalid configuration")?;

    // 2. Log filter
    // RUST_LOG wins; otherwise sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blog_api=debug,tower_http=info".into());

    // 3. Log format by environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Storage Initialization
    let state = match config.db_url.clone() {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&db_url)
                .await
                .context("failed to connect to Postgres; check DATABASE_URL")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run database migrations")?;

            AppState {
                repo: Arc::new(PostgresRepository::new(pool.clone())) as RepositoryState,
                sessions: Arc::new(PostgresSessionStore::new(pool)) as SessionState,
                config,
            }
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage, data will not persist");
            AppState::in_memory(config)
        }
    };

    // 5. Router and Server Startup
    let bind_addr = state.config.bind_addr.clone();
    let app = create_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("OpenAPI document available at /api-docs/openapi.json");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
