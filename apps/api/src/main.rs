mod cache;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod notify;
mod report;
mod resume;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::DetailCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GeminiClient, OpenAiClient, ProviderRegistry};
use crate::notify::Notifier;
use crate::routes::build_router;
use crate::scoring::coordinator::ScoreFlights;
use crate::scoring::progress::ProgressTracker;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("fitboard_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fitboard API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis-backed job-detail cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = DetailCache::new(redis, config.cache_ttl_secs);
    info!("Redis client initialized");

    // Initialize whichever LLM providers have keys configured
    let providers = Arc::new(ProviderRegistry::new(
        config
            .openai_api_key
            .clone()
            .map(|key| OpenAiClient::new(key, config.scoring_timeout_secs)),
        config
            .gemini_api_key
            .clone()
            .map(|key| GeminiClient::new(key, config.scoring_timeout_secs)),
    ));
    info!(
        "LLM providers configured: {:?}",
        providers.configured_names()
    );

    // Build app state — every cross-cutting store is constructed here and
    // injected; nothing lives in a module-level singleton.
    let state = AppState {
        db,
        cache,
        providers,
        notifier: Notifier::new(),
        progress: ProgressTracker::new(),
        flights: ScoreFlights::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // single-user dashboard, no auth

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
