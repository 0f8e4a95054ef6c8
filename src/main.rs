use std::{net::SocketAddr, sync::Arc};

mod app;
mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod services;

use app::{build_router, AppState};
use auth::{google::GoogleOAuth, rate_limit::RateLimitState};
use config::Config;
use db::{LogStore, MemoryStore, PgStore, ProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poomad_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let (logs, profiles): (Arc<dyn LogStore>, Arc<dyn ProfileStore>) =
        match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url).await?;
                store.migrate().await?;
                tracing::info!("Database migrations applied");
                let store = Arc::new(store);
                let logs: Arc<dyn LogStore> = store.clone();
                let profiles: Arc<dyn ProfileStore> = store;
                (logs, profiles)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using the in-memory store, data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                let logs: Arc<dyn LogStore> = store.clone();
                let profiles: Arc<dyn ProfileStore> = store;
                (logs, profiles)
            }
        };

    let google = match &config.google {
        Some(google) => Some(GoogleOAuth::new(google, &config)?),
        None => {
            tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set; sign-in is disabled");
            None
        }
    };

    let rate_limiter = RateLimitState::new();
    auth::rate_limit::spawn_cleanup_worker(rate_limiter.clone());

    let state = AppState {
        logs,
        profiles,
        config: config.clone(),
        rate_limiter,
        google,
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    // Client IP is needed for the sign-in rate limit
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
