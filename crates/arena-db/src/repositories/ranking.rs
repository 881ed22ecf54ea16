//! Ranking repository - idempotent ingest and leaderboard queries

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use arena_core::{MatchOutcome, MatchResultEvent};

use crate::models::UserScore;
use crate::{DbError, Result};

/// Repository for the ranking tables: scores, tournament participation,
/// and the processed-event ledger.
pub struct RankingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RankingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply a match-result event exactly once.
    ///
    /// Everything happens in a single transaction: the idempotency check,
    /// the per-user counter upserts, the participation upsert, and the
    /// ledger insert. A concurrent duplicate delivery passes the check
    /// but collides on the ledger primary key, rolling its updates back.
    /// Returns `false` when the event had already been applied.
    pub async fn apply_match_result(&self, event: &MatchResultEvent) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        let already: Option<(Uuid,)> =
            sqlx::query_as("SELECT match_id FROM processed_match_events WHERE match_id = $1")
                .bind(event.match_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DbError::Query(e.to_string()))?;

        if already.is_some() {
            tx.commit()
                .await
                .map_err(|e| DbError::Transaction(e.to_string()))?;
            return Ok(false);
        }

        let now = Utc::now();
        for user in &event.users {
            let won = i32::from(user.outcome == MatchOutcome::Win);
            let drawn = i32::from(user.outcome == MatchOutcome::Draw);
            let lost = 1 - won - drawn;

            sqlx::query(
                r#"
                INSERT INTO user_scores (
                    user_id, game_id, score, matches_played,
                    matches_won, matches_drawn, matches_lost, updated_at
                )
                VALUES ($1, $2, $3, 1, $4, $5, $6, $7)
                ON CONFLICT (user_id, game_id) DO UPDATE SET
                    score = user_scores.score + EXCLUDED.score,
                    matches_played = user_scores.matches_played + 1,
                    matches_won = user_scores.matches_won + EXCLUDED.matches_won,
                    matches_drawn = user_scores.matches_drawn + EXCLUDED.matches_drawn,
                    matches_lost = user_scores.matches_lost + EXCLUDED.matches_lost,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(user.user_id)
            .bind(&event.game_id)
            .bind(user.outcome.score_points())
            .bind(won)
            .bind(drawn)
            .bind(lost)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::Query(e.to_string()))?;

            if let Some(tournament_id) = event.tournament_id {
                sqlx::query(
                    r#"
                    INSERT INTO user_tournament_participation (user_id, game_id, tournament_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(user.user_id)
                .bind(&event.game_id)
                .bind(tournament_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::Query(e.to_string()))?;
            }
        }

        sqlx::query(
            r#"
            INSERT INTO processed_match_events (match_id, tournament_id, game_id, processed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event.match_id)
        .bind(event.tournament_id)
        .bind(&event.game_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from_query(e, "match event already processed"))?;

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(e.to_string()))?;

        Ok(true)
    }

    /// Fetch a user's counters for a game
    pub async fn find_user_score(&self, user_id: Uuid, game_id: &str) -> Result<Option<UserScore>> {
        let result = sqlx::query_as::<_, UserScore>(
            "SELECT * FROM user_scores WHERE user_id = $1 AND game_id = $2",
        )
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Players of a game with a strictly higher score
    pub async fn count_higher_scores(&self, game_id: &str, score: i64) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM user_scores WHERE game_id = $1 AND score > $2")
                .bind(game_id)
                .bind(score)
                .fetch_one(self.pool)
                .await
                .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }

    /// Distinct tournaments the user has played in for a game
    pub async fn count_tournaments_played(&self, user_id: Uuid, game_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT tournament_id) FROM user_tournament_participation
            WHERE user_id = $1 AND game_id = $2
            "#,
        )
        .bind(user_id)
        .bind(game_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }

    /// Leaderboard page: players with at least one match, best score
    /// first, earlier updaters breaking ties.
    pub async fn leaderboard(
        &self,
        game_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserScore>> {
        let result = sqlx::query_as::<_, UserScore>(
            r#"
            SELECT * FROM user_scores
            WHERE game_id = $1 AND matches_played > 0
            ORDER BY score DESC, updated_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(game_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(result)
    }

    /// Players qualifying for the leaderboard
    pub async fn leaderboard_total(&self, game_id: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_scores WHERE game_id = $1 AND matches_played > 0",
        )
        .bind(game_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(count)
    }
}
