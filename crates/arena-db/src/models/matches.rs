//! Match row model

use arena_core::{BracketType, MatchStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A match row. Forward links (`next_match_id`, `loser_next_match_id`)
/// form the bracket DAG; `previous_match_ids` is their inverse.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Match {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: i32,
    /// Unique within the tournament.
    pub match_number: i32,
    pub participant1_id: Option<Uuid>,
    pub participant2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub loser_id: Option<Uuid>,
    pub score1: i32,
    pub score2: i32,
    pub status: MatchStatus,
    pub notes: Option<String>,
    pub proofs: Vec<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
    /// Where the winner goes next.
    pub next_match_id: Option<Uuid>,
    /// Where the loser goes next (double elimination only).
    pub loser_next_match_id: Option<Uuid>,
    pub bracket_type: BracketType,
    pub previous_match_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    /// Both slots assigned, so the match can be scored.
    pub fn is_ready(&self) -> bool {
        self.participant1_id.is_some() && self.participant2_id.is_some()
    }
}
