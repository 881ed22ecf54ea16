//! Cross-service match-result event schema.
//!
//! The tournament service emits one [`MatchResultEvent`] per completed
//! match; the ranking service applies it exactly once, keyed by the match
//! id. Delivery is at-least-once, so the schema carries everything needed
//! to dedupe and to normalize partial data (guests, missing game ids).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MatchId, TournamentId, UserId};

/// Sentinel game id for scores not tied to a specific game.
pub const GLOBAL_GAME_ID: &str = "global";

/// Normalize an empty game id to the global sentinel.
pub fn effective_game_id(game_id: &str) -> &str {
    if game_id.is_empty() {
        GLOBAL_GAME_ID
    } else {
        game_id
    }
}

/// Outcome of a match for a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
    /// Catch-all for outcome strings this build does not know about;
    /// ingestion counts it as a loss.
    Unknown,
}

// Tolerant by hand: producers may run newer builds with outcome kinds
// this one has never heard of, and at-least-once delivery means those
// events must still be ingestable.
impl<'de> Deserialize<'de> for MatchOutcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "win" => MatchOutcome::Win,
            "draw" => MatchOutcome::Draw,
            "loss" => MatchOutcome::Loss,
            _ => MatchOutcome::Unknown,
        })
    }
}

impl MatchOutcome {
    /// Score points awarded for this outcome (3-1-0 scoring).
    pub fn score_points(&self) -> i64 {
        match self {
            MatchOutcome::Win => 3,
            MatchOutcome::Draw => 1,
            MatchOutcome::Loss | MatchOutcome::Unknown => 0,
        }
    }
}

/// Per-user slice of a match result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultUser {
    pub user_id: UserId,
    pub outcome: MatchOutcome,
}

/// Result of a completed match.
///
/// `match_id` doubles as the idempotency key: redelivering an event with a
/// match id already in the processed ledger is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultEvent {
    pub match_id: MatchId,
    pub tournament_id: Option<TournamentId>,
    /// May be empty; consumers normalize with [`effective_game_id`].
    #[serde(default)]
    pub game_id: String,
    pub timestamp: DateTime<Utc>,
    /// Users with a platform account only; guest entries are omitted by
    /// the emitter. May be empty.
    #[serde(default)]
    pub users: Vec<MatchResultUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn empty_game_id_maps_to_global() {
        assert_eq!(effective_game_id(""), "global");
        assert_eq!(effective_game_id("chess"), "chess");
        assert_eq!(effective_game_id(GLOBAL_GAME_ID), "global");
    }

    #[test]
    fn unknown_outcome_string_deserializes_to_unknown() {
        let outcome: MatchOutcome = serde_json::from_str("\"forfeit\"").unwrap();
        assert_eq!(outcome, MatchOutcome::Unknown);
        let win: MatchOutcome = serde_json::from_str("\"win\"").unwrap();
        assert_eq!(win, MatchOutcome::Win);
    }

    #[test]
    fn event_round_trips_camel_case() {
        let event = MatchResultEvent {
            match_id: Uuid::new_v4(),
            tournament_id: Some(Uuid::new_v4()),
            game_id: "chess".to_string(),
            timestamp: Utc::now(),
            users: vec![MatchResultUser {
                user_id: Uuid::new_v4(),
                outcome: MatchOutcome::Draw,
            }],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("matchId").is_some());
        assert!(json.get("tournamentId").is_some());
        assert_eq!(json["users"][0]["outcome"], "draw");

        let back: MatchResultEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.match_id, event.match_id);
        assert_eq!(back.users[0].outcome, MatchOutcome::Draw);
    }

    #[test]
    fn event_tolerates_missing_users_and_game() {
        let json = serde_json::json!({
            "matchId": Uuid::new_v4(),
            "tournamentId": null,
            "timestamp": Utc::now(),
        });
        let event: MatchResultEvent = serde_json::from_value(json).unwrap();
        assert!(event.users.is_empty());
        assert!(event.game_id.is_empty());
    }

    #[test]
    fn score_points_follow_three_one_zero() {
        assert_eq!(MatchOutcome::Win.score_points(), 3);
        assert_eq!(MatchOutcome::Draw.score_points(), 1);
        assert_eq!(MatchOutcome::Loss.score_points(), 0);
        assert_eq!(MatchOutcome::Unknown.score_points(), 0);
    }
}
