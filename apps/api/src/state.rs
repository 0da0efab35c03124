use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::reports::store::ArtifactStore;
use crate::scoring::catalog::InstrumentCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis client backing the report render queue.
    pub redis: RedisClient,
    /// Where rendered reports live. S3 in production.
    pub artifacts: Arc<dyn ArtifactStore>,
    /// Validated instrument definitions, read-only after startup.
    pub catalog: Arc<InstrumentCatalog>,
}
