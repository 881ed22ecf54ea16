//! Arena database layer
//!
//! PostgreSQL persistence for both services: tournaments, participants,
//! matches, and the ranking tables (scores, participation, processed
//! events). Repositories wrap a shared [`sqlx::PgPool`]; conflict
//! resolution is expressed as `ON CONFLICT` upserts and conditional
//! updates so concurrent writers never overwrite each other.

pub mod error;
pub mod models;
pub mod pool;
pub mod repositories;

pub use error::{DbError, Result};
pub use pool::create_pool;

use arena_core::DatabaseSettings;
use sqlx::PgPool;

/// Create the pool and run migrations.
pub async fn init(settings: &DatabaseSettings) -> Result<PgPool> {
    tracing::info!("initializing database connection pool");
    let pool = create_pool(settings).await?;

    tracing::info!("running database migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DbError::Migration(e.to_string()))?;

    tracing::info!("database initialization complete");
    Ok(pool)
}
