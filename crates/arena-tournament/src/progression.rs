//! Match progression: score submission, advancement, and completion.
//!
//! The write order is fixed: persist the outcome, advance the winner,
//! advance the loser, emit the result event, then check for tournament
//! completion. Consumers observing an event can therefore assume the
//! match is already persisted as completed with the same outcome.

use chrono::Utc;

use arena_core::{BracketType, TournamentFormat};
use arena_db::models::Match;
use arena_db::repositories::{
    MatchRepository, ParticipantRepository, SlotFill, TournamentRepository,
};

use crate::emitter::build_match_result_event;
use crate::error::ApiError;
use crate::lifecycle;
use crate::state::AppState;

/// A score submission for a match.
#[derive(Debug, Clone)]
pub struct ScoreSubmission {
    pub score1: i32,
    pub score2: i32,
    pub notes: Option<String>,
    pub proofs: Option<Vec<String>>,
}

/// Who won, before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Participant1,
    Participant2,
    Draw,
}

/// Decide the outcome from the scores, rejecting ties in formats that
/// cannot absorb them.
pub(crate) fn decide(
    format: TournamentFormat,
    score1: i32,
    score2: i32,
) -> Result<Decision, ApiError> {
    if score1 > score2 {
        Ok(Decision::Participant1)
    } else if score1 < score2 {
        Ok(Decision::Participant2)
    } else if format.allows_draws() {
        Ok(Decision::Draw)
    } else {
        Err(ApiError::InvalidTie)
    }
}

/// Submit a score for a match and drive everything that follows from it.
pub async fn update_score(
    state: &AppState,
    tournament_id: uuid::Uuid,
    match_id: uuid::Uuid,
    submission: ScoreSubmission,
) -> Result<Match, ApiError> {
    let tournaments = TournamentRepository::new(&state.db);
    let matches = MatchRepository::new(&state.db);

    let tournament = tournaments
        .find_by_id(tournament_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tournament {tournament_id}")))?;
    let m = matches
        .find_by_id(match_id)
        .await?
        .filter(|m| m.tournament_id == tournament_id)
        .ok_or_else(|| ApiError::NotFound(format!("match {match_id}")))?;

    let (Some(p1), Some(p2)) = (m.participant1_id, m.participant2_id) else {
        return Err(ApiError::InvalidState(
            "cannot score a match with unassigned participant slots".to_string(),
        ));
    };

    let decision = decide(tournament.format, submission.score1, submission.score2)?;
    let (winner_id, loser_id) = match decision {
        Decision::Participant1 => (Some(p1), Some(p2)),
        Decision::Participant2 => (Some(p2), Some(p1)),
        Decision::Draw => (None, None),
    };

    // Commit point: the outcome is durable from here on, regardless of
    // what happens to the request afterwards.
    let scored = matches
        .record_result(
            match_id,
            submission.score1,
            submission.score2,
            winner_id,
            loser_id,
            submission.notes.as_deref(),
            submission.proofs.as_deref(),
            Utc::now(),
        )
        .await?;

    if let (Some(winner), Some(loser)) = (winner_id, loser_id) {
        if scored.bracket_type == BracketType::GrandFinals && scored.next_match_id.is_some() {
            advance_grand_finals(&matches, &scored, winner, loser).await?;
        } else {
            if let Some(next) = scored.next_match_id {
                advance(&matches, next, winner, "winner").await?;
            }
            if let Some(next) = scored.loser_next_match_id {
                advance(&matches, next, loser, "loser").await?;
            }
        }
    }

    let participants = ParticipantRepository::new(&state.db)
        .list_by_tournament(tournament_id)
        .await?;
    let event = build_match_result_event(&scored, &tournament.game, &participants);
    state.notifier.notify(event);

    match lifecycle::try_complete(&state.db, &tournament).await {
        Ok(true) => tracing::info!(tournament_id = %tournament.id, "tournament completed"),
        Ok(false) => {}
        // The score is in; completion will be retried on the next update.
        Err(err) => tracing::error!(
            tournament_id = %tournament.id,
            error = %err,
            "completion check failed"
        ),
    }

    Ok(scored)
}

/// Seat an entry in the successor's first open slot; never overwrite.
async fn advance(
    matches: &MatchRepository<'_>,
    next_match_id: uuid::Uuid,
    entry_id: uuid::Uuid,
    role: &str,
) -> Result<(), ApiError> {
    match matches.fill_first_open_slot(next_match_id, entry_id).await? {
        SlotFill::Slot1 | SlotFill::Slot2 => Ok(()),
        SlotFill::AlreadySeated => {
            tracing::debug!(
                match_id = %next_match_id,
                entry = %entry_id,
                role,
                "entry already seated in successor, skipping"
            );
            Ok(())
        }
        SlotFill::Full => {
            tracing::warn!(
                match_id = %next_match_id,
                entry = %entry_id,
                role,
                "successor slots already filled, not overwriting"
            );
            Ok(())
        }
    }
}

/// First grand final: if the finalist who arrived from the winners
/// bracket takes it, the reset match is cancelled so completion can
/// fire; otherwise both finalists re-seat and the reset decides.
async fn advance_grand_finals(
    matches: &MatchRepository<'_>,
    gf1: &Match,
    winner: uuid::Uuid,
    loser: uuid::Uuid,
) -> Result<(), ApiError> {
    let Some(reset_id) = gf1.next_match_id else {
        return Ok(());
    };

    // The winners-bracket final is always the first back link.
    let wb_finalist = match gf1.previous_match_ids.first() {
        Some(&wb_final_id) => matches
            .find_by_id(wb_final_id)
            .await?
            .and_then(|wb_final| wb_final.winner_id),
        None => None,
    };

    if wb_finalist == Some(winner) {
        matches.cancel(reset_id).await?;
        tracing::info!(
            match_id = %gf1.id,
            "winners-bracket champion defended, reset final cancelled"
        );
    } else {
        advance(matches, reset_id, winner, "winner").await?;
        advance(matches, reset_id, loser, "loser").await?;
    }
    Ok(())
}

/// Wins/losses/draws per entry, best record first. Round robin and Swiss
/// standings read straight from the scored matches.
pub fn standings(matches: &[Match]) -> Vec<EntryRecord> {
    let mut by_entry: std::collections::HashMap<uuid::Uuid, EntryRecord> =
        std::collections::HashMap::new();

    for m in matches {
        for entry in [m.participant1_id, m.participant2_id].into_iter().flatten() {
            let record = by_entry.entry(entry).or_insert_with(|| EntryRecord {
                entry_id: entry,
                wins: 0,
                losses: 0,
                draws: 0,
            });
            if m.status == arena_core::MatchStatus::Completed && m.winner_id.is_none() {
                record.draws += 1;
            } else if m.winner_id == Some(entry) {
                record.wins += 1;
            } else if m.loser_id == Some(entry) {
                record.losses += 1;
            }
        }
    }

    let mut records: Vec<EntryRecord> = by_entry.into_values().collect();
    records.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(a.losses.cmp(&b.losses))
            .then(b.draws.cmp(&a.draws))
            .then(a.entry_id.cmp(&b.entry_id))
    });
    records
}

/// Aggregated record of one entry across a tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub entry_id: uuid::Uuid,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::MatchStatus;
    use uuid::Uuid;

    #[test]
    fn higher_score_wins() {
        assert_eq!(
            decide(TournamentFormat::SingleElim, 2, 0).unwrap(),
            Decision::Participant1
        );
        assert_eq!(
            decide(TournamentFormat::SingleElim, 1, 3).unwrap(),
            Decision::Participant2
        );
    }

    #[test]
    fn ties_only_survive_round_robin() {
        assert_eq!(
            decide(TournamentFormat::RoundRobin, 1, 1).unwrap(),
            Decision::Draw
        );
        for format in [
            TournamentFormat::SingleElim,
            TournamentFormat::DoubleElim,
            TournamentFormat::Swiss,
        ] {
            assert!(matches!(
                decide(format, 2, 2),
                Err(ApiError::InvalidTie)
            ));
        }
    }

    fn scored_match(
        tournament_id: Uuid,
        p1: Uuid,
        p2: Uuid,
        winner: Option<Uuid>,
    ) -> Match {
        let completed = Some(chrono::Utc::now());
        Match {
            id: Uuid::new_v4(),
            tournament_id,
            round: 1,
            match_number: 1,
            participant1_id: Some(p1),
            participant2_id: Some(p2),
            winner_id: winner,
            loser_id: winner.map(|w| if w == p1 { p2 } else { p1 }),
            score1: 0,
            score2: 0,
            status: MatchStatus::Completed,
            notes: None,
            proofs: Vec::new(),
            scheduled_time: None,
            completed_time: completed,
            next_match_id: None,
            loser_next_match_id: None,
            bracket_type: BracketType::Winners,
            previous_match_ids: Vec::new(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn standings_count_wins_losses_draws() {
        let t = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![
            scored_match(t, a, b, Some(a)),
            scored_match(t, a, c, Some(a)),
            scored_match(t, b, c, None),
        ];

        let standings = standings(&matches);
        assert_eq!(standings[0].entry_id, a);
        assert_eq!((standings[0].wins, standings[0].losses, standings[0].draws), (2, 0, 0));
        let b_record = standings.iter().find(|r| r.entry_id == b).unwrap();
        assert_eq!((b_record.wins, b_record.losses, b_record.draws), (0, 1, 1));
    }
}
