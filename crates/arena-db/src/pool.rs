//! Database connection pool management

use sqlx::postgres::{PgPool, PgPoolOptions};

use arena_core::DatabaseSettings;

use crate::{DbError, Result};

/// Create a new PostgreSQL pool from settings.
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections.unwrap_or(1))
        .acquire_timeout(settings.connect_timeout())
        .idle_timeout(Some(settings.idle_timeout()))
        .connect(&settings.url)
        .await
        .map_err(|e| DbError::Connection(e.to_string()))
}
