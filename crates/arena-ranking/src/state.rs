//! Application state shared across handlers

use sqlx::PgPool;

use arena_core::RankingServiceConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Service configuration
    pub config: RankingServiceConfig,
}

impl AppState {
    pub fn new(db: PgPool, config: RankingServiceConfig) -> Self {
        Self { db, config }
    }
}
