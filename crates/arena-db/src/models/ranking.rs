//! Ranking row models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user per-game counters. Invariants maintained by the ingest
/// transaction: `matches_played = won + drawn + lost` and
/// `score = 3*won + drawn`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserScore {
    pub user_id: Uuid,
    pub game_id: String,
    pub score: i64,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_drawn: i32,
    pub matches_lost: i32,
    pub updated_at: DateTime<Utc>,
}

/// Idempotency ledger row. Presence means "already applied".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcessedMatchEvent {
    pub match_id: Uuid,
    pub tournament_id: Option<Uuid>,
    pub game_id: String,
    pub processed_at: DateTime<Utc>,
}
