//! Participant row model

use arena_core::ParticipantStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tournament entry. `user_id` is nil for guest entries, which never
/// reach the ranking service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Option<Uuid>,
    pub display_name: String,
    /// 0 until assigned; unique within a tournament once the bracket is
    /// generated.
    pub seed: i32,
    pub status: ParticipantStatus,
    pub is_waitlisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
