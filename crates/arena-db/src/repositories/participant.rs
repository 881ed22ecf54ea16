//! Participant repository - registration, check-in, and seeding

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Participant;
use crate::{DbError, Result};

/// Repository for participant operations
pub struct ParticipantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a participant. A second registration of the same user in
    /// the same tournament surfaces as [`DbError::Duplicate`].
    pub async fn create(&self, participant: &Participant) -> Result<Participant> {
        let result = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (
                id, tournament_id, user_id, display_name, seed, status,
                is_waitlisted, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(participant.id)
        .bind(participant.tournament_id)
        .bind(participant.user_id)
        .bind(&participant.display_name)
        .bind(participant.seed)
        .bind(participant.status)
        .bind(participant.is_waitlisted)
        .bind(participant.created_at)
        .bind(participant.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_query(e, "participant already registered"))?;

        Ok(result)
    }

    /// Find participant by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>> {
        let result = sqlx::query_as::<_, Participant>("SELECT * FROM participants WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// List participants of a tournament, seeded entries first
    pub async fn list_by_tournament(&self, tournament_id: Uuid) -> Result<Vec<Participant>> {
        let result = sqlx::query_as::<_, Participant>(
            r#"
            SELECT * FROM participants
            WHERE tournament_id = $1
            ORDER BY CASE WHEN seed > 0 THEN 0 ELSE 1 END, seed, created_at
            "#,
        )
        .bind(tournament_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Count non-waitlisted participants
    pub async fn count_active(&self, tournament_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM participants WHERE tournament_id = $1 AND NOT is_waitlisted",
        )
        .bind(tournament_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }

    /// Update display name, seed, waitlist flag, and status
    pub async fn update(&self, participant: &Participant) -> Result<Participant> {
        let result = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants SET
                display_name = $2,
                seed = $3,
                status = $4,
                is_waitlisted = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(participant.id)
        .bind(&participant.display_name)
        .bind(participant.seed)
        .bind(participant.status)
        .bind(participant.is_waitlisted)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Assign a seed to a single entry
    pub async fn set_seed(&self, id: Uuid, seed: i32) -> Result<()> {
        sqlx::query("UPDATE participants SET seed = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(seed)
            .bind(Utc::now())
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    /// Remove an entry
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
