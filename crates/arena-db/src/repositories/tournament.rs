//! Tournament repository - tournament CRUD and status updates

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::{TournamentFormat, TournamentStatus};

use crate::models::Tournament;
use crate::{DbError, Result};

/// Optional filters for tournament listing.
#[derive(Debug, Clone, Default)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    pub game: Option<String>,
    pub format: Option<TournamentFormat>,
}

/// Repository for tournament operations
pub struct TournamentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TournamentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new tournament
    pub async fn create(&self, tournament: &Tournament) -> Result<Tournament> {
        let result = sqlx::query_as::<_, Tournament>(
            r#"
            INSERT INTO tournaments (
                id, name, game, format, status, max_participants,
                registration_deadline, start_time, end_time, creator_id,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(tournament.id)
        .bind(&tournament.name)
        .bind(&tournament.game)
        .bind(tournament.format)
        .bind(tournament.status)
        .bind(tournament.max_participants)
        .bind(tournament.registration_deadline)
        .bind(tournament.start_time)
        .bind(tournament.end_time)
        .bind(tournament.creator_id)
        .bind(tournament.created_at)
        .bind(tournament.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Find tournament by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tournament>> {
        let result = sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// List tournaments, newest first, with optional filters
    pub async fn list(
        &self,
        filter: &TournamentFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Tournament>> {
        let result = sqlx::query_as::<_, Tournament>(
            r#"
            SELECT * FROM tournaments
            WHERE ($1::tournament_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR game = $2)
              AND ($3::tournament_format IS NULL OR format = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.status)
        .bind(filter.game.as_deref())
        .bind(filter.format)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Count tournaments matching the filter
    pub async fn count(&self, filter: &TournamentFilter) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM tournaments
            WHERE ($1::tournament_status IS NULL OR status = $1)
              AND ($2::text IS NULL OR game = $2)
              AND ($3::tournament_format IS NULL OR format = $3)
            "#,
        )
        .bind(filter.status)
        .bind(filter.game.as_deref())
        .bind(filter.format)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }

    /// Update the mutable tournament fields
    pub async fn update(&self, tournament: &Tournament) -> Result<Tournament> {
        let result = sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments SET
                name = $2,
                game = $3,
                max_participants = $4,
                registration_deadline = $5,
                start_time = $6,
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tournament.id)
        .bind(&tournament.name)
        .bind(&tournament.game)
        .bind(tournament.max_participants)
        .bind(tournament.registration_deadline)
        .bind(tournament.start_time)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Set the tournament status, stamping `end_time` when provided
    pub async fn set_status(
        &self,
        id: Uuid,
        status: TournamentStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<Tournament> {
        let result = sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments SET
                status = $2,
                end_time = COALESCE($3, end_time),
                updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(end_time)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Delete a tournament; cascades to participants and matches
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
