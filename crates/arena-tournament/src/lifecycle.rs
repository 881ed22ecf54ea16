//! Tournament lifecycle state machine.
//!
//! The pure transition graph lives on `TournamentStatus`; this module
//! adds the storage-backed preconditions: a bracket must exist before
//! play starts, every match must be finished before completion, and
//! `end_time` is stamped on completion. Starting late or undersized is
//! tolerated with a warning, never rejected.

use chrono::Utc;
use sqlx::PgPool;

use arena_core::TournamentStatus;
use arena_db::models::Tournament;
use arena_db::repositories::{MatchRepository, ParticipantRepository, TournamentRepository};

use crate::error::ApiError;

/// Apply a status transition, enforcing the graph and the target-state
/// preconditions.
pub async fn transition(
    db: &PgPool,
    tournament: &Tournament,
    next: TournamentStatus,
) -> Result<Tournament, ApiError> {
    if !tournament.status.can_transition_to(next) {
        return Err(ApiError::InvalidTransition(format!(
            "{} -> {next}",
            tournament.status
        )));
    }

    let mut end_time = None;
    match next {
        TournamentStatus::InProgress => {
            let matches = MatchRepository::new(db)
                .count_by_tournament(tournament.id)
                .await?;
            if matches == 0 {
                return Err(ApiError::InvalidState(
                    "bracket has not been generated".to_string(),
                ));
            }

            let participants = ParticipantRepository::new(db)
                .count_active(tournament.id)
                .await?;
            if participants < 2 {
                tracing::warn!(
                    tournament_id = %tournament.id,
                    participants,
                    "starting tournament with fewer than 2 participants"
                );
            }
            if let Some(deadline) = tournament.registration_deadline {
                if deadline < Utc::now() {
                    tracing::warn!(
                        tournament_id = %tournament.id,
                        %deadline,
                        "starting tournament after the registration deadline"
                    );
                }
            }
        }
        TournamentStatus::Completed => {
            let open = MatchRepository::new(db).count_open(tournament.id).await?;
            if open > 0 {
                return Err(ApiError::InvalidState(format!(
                    "{open} matches are not finished"
                )));
            }
            end_time = Some(Utc::now());
        }
        _ => {}
    }

    let updated = TournamentRepository::new(db)
        .set_status(tournament.id, next, end_time)
        .await?;

    tracing::info!(
        tournament_id = %tournament.id,
        from = %tournament.status,
        to = %next,
        "tournament status changed"
    );
    Ok(updated)
}

/// Complete the tournament if every match is terminal. Used by match
/// progression after each score; returns whether completion happened.
pub async fn try_complete(db: &PgPool, tournament: &Tournament) -> Result<bool, ApiError> {
    if tournament.status != TournamentStatus::InProgress {
        return Ok(false);
    }
    let open = MatchRepository::new(db).count_open(tournament.id).await?;
    if open > 0 {
        return Ok(false);
    }
    transition(db, tournament, TournamentStatus::Completed).await?;
    Ok(true)
}
