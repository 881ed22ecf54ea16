//! Match endpoints: bracket generation, listing, and score submission

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use arena_bracket::{BracketOptions, GeneratedMatch};
use arena_core::{BracketType, MatchStatus, TournamentStatus};
use arena_db::models::{Match, Participant};
use arena_db::repositories::{MatchRepository, ParticipantRepository};

use crate::error::ApiError;
use crate::progression::{self, ScoreSubmission};
use crate::routes::tournaments::find_tournament;
use crate::state::AppState;
use crate::ApiResult;

/// Match representation returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchResponse {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round: i32,
    pub match_number: i32,
    pub participant1_id: Option<Uuid>,
    pub participant2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub loser_id: Option<Uuid>,
    pub score1: i32,
    pub score2: i32,
    #[schema(value_type = String)]
    pub status: MatchStatus,
    pub notes: Option<String>,
    pub proofs: Vec<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
    pub next_match_id: Option<Uuid>,
    pub loser_next_match_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub bracket_type: BracketType,
    pub previous_match_ids: Vec<Uuid>,
}

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            tournament_id: m.tournament_id,
            round: m.round,
            match_number: m.match_number,
            participant1_id: m.participant1_id,
            participant2_id: m.participant2_id,
            winner_id: m.winner_id,
            loser_id: m.loser_id,
            score1: m.score1,
            score2: m.score2,
            status: m.status,
            notes: m.notes,
            proofs: m.proofs,
            scheduled_time: m.scheduled_time,
            completed_time: m.completed_time,
            next_match_id: m.next_match_id,
            loser_next_match_id: m.loser_next_match_id,
            bracket_type: m.bracket_type,
            previous_match_ids: m.previous_match_ids,
        }
    }
}

#[derive(Debug, Deserialize, Default, ToSchema)]
pub struct GenerateBracketRequest {
    /// Double elimination only: pre-create the reset final (default true).
    pub reset_bracket: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MatchListQuery {
    pub round: Option<i32>,
    pub participant: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitScoreRequest {
    #[validate(range(min = 0))]
    pub score1: i32,
    #[validate(range(min = 0))]
    pub score2: i32,
    pub notes: Option<String>,
    pub proofs: Option<Vec<String>>,
}

/// Generate (or re-generate) the bracket.
///
/// Entries still at seed 0 get seeds in registration order behind the
/// explicitly seeded ones; waitlisted entries are excluded.
#[utoipa::path(
    post,
    path = "/api/v1/tournaments/{id}/bracket",
    params(("id" = Uuid, Path, description = "Tournament id")),
    request_body = GenerateBracketRequest,
    responses(
        (status = 201, description = "Bracket generated", body = Vec<MatchResponse>),
        (status = 409, description = "Bad tournament state or too few participants")
    ),
    tag = "matches"
)]
pub async fn generate_bracket(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<Uuid>,
    request: Option<Json<GenerateBracketRequest>>,
) -> ApiResult<(StatusCode, Json<Vec<MatchResponse>>)> {
    let tournament = find_tournament(&state, tournament_id).await?;
    if !matches!(
        tournament.status,
        TournamentStatus::Draft | TournamentStatus::Registration
    ) {
        return Err(ApiError::InvalidState(format!(
            "cannot generate a bracket while the tournament is {}",
            tournament.status
        )));
    }

    let repo = ParticipantRepository::new(&state.db);
    let participants = repo.list_by_tournament(tournament_id).await?;
    let mut field: Vec<Participant> = participants
        .into_iter()
        .filter(|p| !p.is_waitlisted)
        .collect();

    // Seed order: explicit seeds first, then registration order.
    field.sort_by(|a, b| {
        match (a.seed > 0, b.seed > 0) {
            (true, true) => a.seed.cmp(&b.seed),
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => a.created_at.cmp(&b.created_at),
        }
        .then(a.created_at.cmp(&b.created_at))
    });
    for (i, participant) in field.iter().enumerate() {
        let seed = (i + 1) as i32;
        if participant.seed != seed {
            repo.set_seed(participant.id, seed).await?;
        }
    }

    let entry_ids: Vec<Uuid> = field.iter().map(|p| p.id).collect();
    let options = BracketOptions {
        reset_bracket: request
            .and_then(|Json(r)| r.reset_bracket)
            .unwrap_or(true),
    };
    let generated =
        arena_bracket::generate(tournament_id, tournament.format, &entry_ids, &options)?;

    let rows: Vec<Match> = generated.into_iter().map(to_match_row).collect();
    MatchRepository::new(&state.db)
        .replace_for_tournament(tournament_id, &rows)
        .await?;

    tracing::info!(
        tournament_id = %tournament_id,
        matches = rows.len(),
        format = ?tournament.format,
        "bracket generated"
    );
    Ok((
        StatusCode::CREATED,
        Json(rows.into_iter().map(Into::into).collect()),
    ))
}

fn to_match_row(generated: GeneratedMatch) -> Match {
    let now = Utc::now();
    Match {
        id: generated.id,
        tournament_id: generated.tournament_id,
        round: generated.round,
        match_number: generated.match_number,
        participant1_id: generated.participant1,
        participant2_id: generated.participant2,
        winner_id: None,
        loser_id: None,
        score1: 0,
        score2: 0,
        status: MatchStatus::Pending,
        notes: None,
        proofs: Vec::new(),
        scheduled_time: None,
        completed_time: None,
        next_match_id: generated.next_match_id,
        loser_next_match_id: generated.loser_next_match_id,
        bracket_type: generated.bracket_type,
        previous_match_ids: generated.previous_match_ids,
        created_at: now,
        updated_at: now,
    }
}

/// List a tournament's matches
#[utoipa::path(
    get,
    path = "/api/v1/tournaments/{id}/matches",
    params(
        ("id" = Uuid, Path, description = "Tournament id"),
        ("round" = Option<i32>, Query, description = "Filter by round"),
        ("participant" = Option<Uuid>, Query, description = "Filter by participating entry")
    ),
    responses(
        (status = 200, description = "Matches in bracket order", body = Vec<MatchResponse>)
    ),
    tag = "matches"
)]
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<Uuid>,
    Query(query): Query<MatchListQuery>,
) -> ApiResult<Json<Vec<MatchResponse>>> {
    find_tournament(&state, tournament_id).await?;
    let matches = MatchRepository::new(&state.db)
        .list_by_tournament(tournament_id, query.round, query.participant)
        .await?;
    Ok(Json(matches.into_iter().map(Into::into).collect()))
}

/// Submit a score for a match
#[utoipa::path(
    put,
    path = "/api/v1/tournaments/{id}/matches/{match_id}/score",
    params(
        ("id" = Uuid, Path, description = "Tournament id"),
        ("match_id" = Uuid, Path, description = "Match id")
    ),
    request_body = SubmitScoreRequest,
    responses(
        (status = 200, description = "Match completed", body = MatchResponse),
        (status = 409, description = "Match not ready for scoring"),
        (status = 422, description = "Tie in a format without draws")
    ),
    tag = "matches"
)]
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    Path((tournament_id, match_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SubmitScoreRequest>,
) -> ApiResult<Json<MatchResponse>> {
    request.validate()?;

    let submission = ScoreSubmission {
        score1: request.score1,
        score2: request.score2,
        notes: request.notes,
        proofs: request.proofs,
    };
    let scored = progression::update_score(&state, tournament_id, match_id, submission).await?;
    Ok(Json(scored.into()))
}

/// Delete a tournament's matches ahead of bracket re-generation
pub async fn delete_matches(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let tournament = find_tournament(&state, tournament_id).await?;
    if matches!(
        tournament.status,
        TournamentStatus::InProgress | TournamentStatus::Completed
    ) {
        return Err(ApiError::InvalidState(format!(
            "cannot delete matches of a tournament that is {}",
            tournament.status
        )));
    }

    let deleted = MatchRepository::new(&state.db)
        .delete_by_tournament(tournament_id)
        .await?;
    tracing::info!(tournament_id = %tournament_id, deleted, "bracket deleted");
    Ok(StatusCode::NO_CONTENT)
}
