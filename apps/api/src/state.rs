use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::DetailCache;
use crate::config::Config;
use crate::llm_client::ProviderRegistry;
use crate::notify::Notifier;
use crate::scoring::coordinator::ScoreFlights;
use crate::scoring::progress::ProgressTracker;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every cross-cutting store (notifications, progress, the
/// single-flight set) lives here explicitly — constructed once in `main`,
/// torn down with the process, never a module-level singleton.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: DetailCache,
    pub providers: Arc<ProviderRegistry>,
    pub notifier: Notifier,
    pub progress: ProgressTracker,
    pub flights: ScoreFlights,
    pub config: Config,
}
