//! Tournament row model

use arena_core::{TournamentFormat, TournamentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tournament row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    /// Game key used for ranking; empty means the global game.
    pub game: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    pub max_participants: i32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    /// Set exactly when the tournament completes.
    pub end_time: Option<DateTime<Utc>>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
