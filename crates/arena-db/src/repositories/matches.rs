//! Match repository - bracket persistence, scoring, and advancement

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::MatchStatus;

use crate::models::Match;
use crate::{DbError, Result};

/// Result of trying to seat an entry in a successor match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotFill {
    /// Seated in participant slot 1
    Slot1,
    /// Seated in participant slot 2
    Slot2,
    /// The entry already occupies a slot; nothing written
    AlreadySeated,
    /// Both slots taken by other entries; nothing written
    Full,
}

/// Repository for match operations
pub struct MatchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace a tournament's bracket: delete existing matches and insert
    /// the new ones in one transaction.
    pub async fn replace_for_tournament(
        &self,
        tournament_id: Uuid,
        matches: &[Match],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        for m in matches {
            sqlx::query(
                r#"
                INSERT INTO matches (
                    id, tournament_id, round, match_number,
                    participant1_id, participant2_id, winner_id, loser_id,
                    score1, score2, status, notes, proofs,
                    scheduled_time, completed_time,
                    next_match_id, loser_next_match_id, bracket_type,
                    previous_match_ids, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                        $13, $14, $15, $16, $17, $18, $19, $20, $21)
                "#,
            )
            .bind(m.id)
            .bind(m.tournament_id)
            .bind(m.round)
            .bind(m.match_number)
            .bind(m.participant1_id)
            .bind(m.participant2_id)
            .bind(m.winner_id)
            .bind(m.loser_id)
            .bind(m.score1)
            .bind(m.score2)
            .bind(m.status)
            .bind(&m.notes)
            .bind(&m.proofs)
            .bind(m.scheduled_time)
            .bind(m.completed_time)
            .bind(m.next_match_id)
            .bind(m.loser_next_match_id)
            .bind(m.bracket_type)
            .bind(&m.previous_match_ids)
            .bind(m.created_at)
            .bind(m.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        Ok(())
    }

    /// Find match by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Match>> {
        let result = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// List matches of a tournament in bracket order, optionally filtered
    /// by round or by a participating entry.
    pub async fn list_by_tournament(
        &self,
        tournament_id: Uuid,
        round: Option<i32>,
        participant: Option<Uuid>,
    ) -> Result<Vec<Match>> {
        let result = sqlx::query_as::<_, Match>(
            r#"
            SELECT * FROM matches
            WHERE tournament_id = $1
              AND ($2::int IS NULL OR round = $2)
              AND ($3::uuid IS NULL OR participant1_id = $3 OR participant2_id = $3)
            ORDER BY match_number
            "#,
        )
        .bind(tournament_id)
        .bind(round)
        .bind(participant)
        .fetch_all(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Count all matches of a tournament
    pub async fn count_by_tournament(&self, tournament_id: Uuid) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM matches WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_one(self.pool)
                .await
                .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }

    /// Count matches that still have to be played
    pub async fn count_open(&self, tournament_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM matches WHERE tournament_id = $1 AND status IN ('pending', 'in_progress')",
        )
        .bind(tournament_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }

    /// Persist a scored outcome atomically: scores, winner/loser, notes,
    /// proofs, status, and completion time in one write.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_result(
        &self,
        id: Uuid,
        score1: i32,
        score2: i32,
        winner_id: Option<Uuid>,
        loser_id: Option<Uuid>,
        notes: Option<&str>,
        proofs: Option<&[String]>,
        completed_time: DateTime<Utc>,
    ) -> Result<Match> {
        let result = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches SET
                score1 = $2,
                score2 = $3,
                winner_id = $4,
                loser_id = $5,
                notes = COALESCE($6, notes),
                proofs = COALESCE($7, proofs),
                status = 'completed',
                completed_time = $8,
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(score1)
        .bind(score2)
        .bind(winner_id)
        .bind(loser_id)
        .bind(notes)
        .bind(proofs)
        .bind(completed_time)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Seat an entry in the first open slot of a match. The conditional
    /// updates never overwrite a filled slot, so two advancements racing
    /// for the same successor each land in their own slot.
    pub async fn fill_first_open_slot(&self, id: Uuid, entry_id: Uuid) -> Result<SlotFill> {
        let slot1 = sqlx::query(
            r#"
            UPDATE matches SET participant1_id = $2, updated_at = $3
            WHERE id = $1
              AND participant1_id IS NULL
              AND participant2_id IS DISTINCT FROM $2
            "#,
        )
        .bind(id)
        .bind(entry_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        if slot1.rows_affected() > 0 {
            return Ok(SlotFill::Slot1);
        }

        let slot2 = sqlx::query(
            r#"
            UPDATE matches SET participant2_id = $2, updated_at = $3
            WHERE id = $1
              AND participant2_id IS NULL
              AND participant1_id IS DISTINCT FROM $2
            "#,
        )
        .bind(id)
        .bind(entry_id)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        if slot2.rows_affected() > 0 {
            return Ok(SlotFill::Slot2);
        }

        let occupied: Option<(Option<Uuid>, Option<Uuid>)> =
            sqlx::query_as("SELECT participant1_id, participant2_id FROM matches WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| DbError::Query(e.to_string()))?;

        match occupied {
            Some((p1, p2)) if p1 == Some(entry_id) || p2 == Some(entry_id) => {
                Ok(SlotFill::AlreadySeated)
            }
            Some(_) => Ok(SlotFill::Full),
            None => Err(DbError::NotFound(format!("match {id}"))),
        }
    }

    /// Mark a pending match as cancelled (e.g. an unused reset final)
    pub async fn cancel(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE matches SET status = $2, updated_at = $3 WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(MatchStatus::Cancelled)
        .bind(Utc::now())
        .execute(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    /// Delete a tournament's matches (bracket re-generation)
    pub async fn delete_by_tournament(&self, tournament_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM matches WHERE tournament_id = $1")
            .bind(tournament_id)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
