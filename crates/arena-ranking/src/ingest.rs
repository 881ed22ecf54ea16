//! Idempotent match-result ingestion.
//!
//! Each event is applied in a single transaction keyed by the match id;
//! redeliveries are no-ops. Outcome normalization happens here so the
//! storage layer only ever sees win/draw/loss.

use sqlx::PgPool;

use arena_core::{effective_game_id, MatchOutcome, MatchResultEvent};
use arena_db::repositories::RankingRepository;

use crate::error::ApiError;

/// Apply a match-result event. Returns `false` for a duplicate delivery.
pub async fn process(db: &PgPool, mut event: MatchResultEvent) -> Result<bool, ApiError> {
    normalize(&mut event);

    let applied = RankingRepository::new(db).apply_match_result(&event).await?;
    if applied {
        tracing::info!(
            match_id = %event.match_id,
            game_id = %event.game_id,
            users = event.users.len(),
            "match result applied"
        );
    } else {
        tracing::info!(match_id = %event.match_id, "duplicate match result ignored");
    }
    Ok(applied)
}

/// Map an empty game id to the global sentinel and unknown outcomes to
/// losses (with a warning).
fn normalize(event: &mut MatchResultEvent) {
    event.game_id = effective_game_id(&event.game_id).to_string();

    for user in &mut event.users {
        if user.outcome == MatchOutcome::Unknown {
            tracing::warn!(
                match_id = %event.match_id,
                user_id = %user.user_id,
                "unknown match outcome, counting as a loss"
            );
            user.outcome = MatchOutcome::Loss;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::MatchResultUser;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(game_id: &str, outcomes: &[MatchOutcome]) -> MatchResultEvent {
        MatchResultEvent {
            match_id: Uuid::new_v4(),
            tournament_id: None,
            game_id: game_id.to_string(),
            timestamp: Utc::now(),
            users: outcomes
                .iter()
                .map(|&outcome| MatchResultUser {
                    user_id: Uuid::new_v4(),
                    outcome,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_game_id_becomes_global() {
        let mut e = event("", &[MatchOutcome::Win]);
        normalize(&mut e);
        assert_eq!(e.game_id, "global");

        let mut e = event("chess", &[]);
        normalize(&mut e);
        assert_eq!(e.game_id, "chess");
    }

    #[test]
    fn unknown_outcomes_become_losses() {
        let mut e = event(
            "chess",
            &[MatchOutcome::Unknown, MatchOutcome::Win, MatchOutcome::Draw],
        );
        normalize(&mut e);
        assert_eq!(e.users[0].outcome, MatchOutcome::Loss);
        assert_eq!(e.users[1].outcome, MatchOutcome::Win);
        assert_eq!(e.users[2].outcome, MatchOutcome::Draw);
    }
}
