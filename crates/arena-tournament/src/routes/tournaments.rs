//! Tournament endpoints: CRUD, status transitions, and standings

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

use arena_core::{TournamentFormat, TournamentStatus};
use arena_db::models::Tournament;
use arena_db::repositories::{
    MatchRepository, ParticipantRepository, TournamentFilter, TournamentRepository,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{lifecycle, progression, ApiResult};

/// Tournament representation returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentResponse {
    pub id: Uuid,
    pub name: String,
    pub game: String,
    #[schema(value_type = String)]
    pub format: TournamentFormat,
    #[schema(value_type = String)]
    pub status: TournamentStatus,
    pub max_participants: i32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Tournament> for TournamentResponse {
    fn from(t: Tournament) -> Self {
        Self {
            id: t.id,
            name: t.name,
            game: t.game,
            format: t.format,
            status: t.status,
            max_participants: t.max_participants,
            registration_deadline: t.registration_deadline,
            start_time: t.start_time,
            end_time: t.end_time,
            creator_id: t.creator_id,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[serde(default)]
    pub game: String,
    #[schema(value_type = String)]
    pub format: TournamentFormat,
    #[validate(range(min = 2, max = 1024))]
    pub max_participants: i32,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
    pub creator_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTournamentRequest {
    #[validate(length(min = 3, max = 100))]
    pub name: Option<String>,
    pub game: Option<String>,
    #[validate(range(min = 2, max = 1024))]
    pub max_participants: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    #[schema(value_type = String)]
    pub status: TournamentStatus,
}

#[derive(Debug, Deserialize)]
pub struct TournamentListQuery {
    pub status: Option<TournamentStatus>,
    pub game: Option<String>,
    pub format: Option<TournamentFormat>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentListResponse {
    pub tournaments: Vec<TournamentResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Clamp a requested page size to [1, 100], defaulting to 20.
pub(crate) fn clamp_page(page: Option<u32>, page_size: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(20).clamp(1, 100);
    (page, page_size)
}

/// Create a tournament
#[utoipa::path(
    post,
    path = "/api/v1/tournaments",
    request_body = CreateTournamentRequest,
    responses(
        (status = 201, description = "Tournament created", body = TournamentResponse),
        (status = 422, description = "Validation failed")
    ),
    tag = "tournaments"
)]
pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTournamentRequest>,
) -> ApiResult<(StatusCode, Json<TournamentResponse>)> {
    request.validate()?;

    let now = Utc::now();
    let tournament = Tournament {
        id: Uuid::new_v4(),
        name: request.name,
        game: request.game,
        format: request.format,
        status: TournamentStatus::Draft,
        max_participants: request.max_participants,
        registration_deadline: request.registration_deadline,
        start_time: request.start_time,
        end_time: None,
        creator_id: request.creator_id,
        created_at: now,
        updated_at: now,
    };

    let created = TournamentRepository::new(&state.db).create(&tournament).await?;
    tracing::info!(tournament_id = %created.id, name = %created.name, "tournament created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List tournaments
#[utoipa::path(
    get,
    path = "/api/v1/tournaments",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("game" = Option<String>, Query, description = "Filter by game"),
        ("format" = Option<String>, Query, description = "Filter by format"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("page_size" = Option<u32>, Query, description = "Results per page (max 100)")
    ),
    responses(
        (status = 200, description = "Tournament list", body = TournamentListResponse)
    ),
    tag = "tournaments"
)]
pub async fn list_tournaments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TournamentListQuery>,
) -> ApiResult<Json<TournamentListResponse>> {
    let (page, page_size) = clamp_page(query.page, query.page_size);
    let offset = i64::from((page - 1) * page_size);

    let filter = TournamentFilter {
        status: query.status,
        game: query.game,
        format: query.format,
    };

    let repo = TournamentRepository::new(&state.db);
    let tournaments = repo.list(&filter, i64::from(page_size), offset).await?;
    let total = repo.count(&filter).await?;

    Ok(Json(TournamentListResponse {
        tournaments: tournaments.into_iter().map(Into::into).collect(),
        total,
        page,
        page_size,
    }))
}

/// Get a tournament by id
#[utoipa::path(
    get,
    path = "/api/v1/tournaments/{id}",
    params(("id" = Uuid, Path, description = "Tournament id")),
    responses(
        (status = 200, description = "Tournament", body = TournamentResponse),
        (status = 404, description = "Not found")
    ),
    tag = "tournaments"
)]
pub async fn get_tournament(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TournamentResponse>> {
    let tournament = find_tournament(&state, id).await?;
    Ok(Json(tournament.into()))
}

/// Update tournament fields
pub async fn update_tournament(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTournamentRequest>,
) -> ApiResult<Json<TournamentResponse>> {
    request.validate()?;

    let mut tournament = find_tournament(&state, id).await?;
    if tournament.status.is_terminal() {
        return Err(ApiError::InvalidState(format!(
            "tournament is {}",
            tournament.status
        )));
    }

    if let Some(max) = request.max_participants {
        let active = ParticipantRepository::new(&state.db).count_active(id).await?;
        if i64::from(max) < active {
            return Err(ApiError::CapacityExceeded(format!(
                "{active} participants already registered"
            )));
        }
        tournament.max_participants = max;
    }
    if let Some(name) = request.name {
        tournament.name = name;
    }
    if let Some(game) = request.game {
        tournament.game = game;
    }
    if let Some(deadline) = request.registration_deadline {
        tournament.registration_deadline = Some(deadline);
    }
    if let Some(start) = request.start_time {
        tournament.start_time = Some(start);
    }

    let updated = TournamentRepository::new(&state.db).update(&tournament).await?;
    Ok(Json(updated.into()))
}

/// Delete a tournament (disallowed once it is running)
pub async fn delete_tournament(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let tournament = find_tournament(&state, id).await?;
    if tournament.status == TournamentStatus::InProgress {
        return Err(ApiError::InvalidState(
            "cannot delete a tournament in progress".to_string(),
        ));
    }

    TournamentRepository::new(&state.db).delete(id).await?;
    tracing::info!(tournament_id = %id, "tournament deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Transition tournament status
#[utoipa::path(
    post,
    path = "/api/v1/tournaments/{id}/status",
    params(("id" = Uuid, Path, description = "Tournament id")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Status changed", body = TournamentResponse),
        (status = 409, description = "Transition rejected")
    ),
    tag = "tournaments"
)]
pub async fn transition_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> ApiResult<Json<TournamentResponse>> {
    let tournament = find_tournament(&state, id).await?;
    let updated = lifecycle::transition(&state.db, &tournament, request.status).await?;
    Ok(Json(updated.into()))
}

/// One row of the standings table
#[derive(Debug, Serialize, ToSchema)]
pub struct StandingEntry {
    pub entry_id: Uuid,
    pub display_name: String,
    pub seed: i32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// Current standings, best record first
#[utoipa::path(
    get,
    path = "/api/v1/tournaments/{id}/standings",
    params(("id" = Uuid, Path, description = "Tournament id")),
    responses(
        (status = 200, description = "Standings", body = Vec<StandingEntry>)
    ),
    tag = "tournaments"
)]
pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<StandingEntry>>> {
    find_tournament(&state, id).await?;

    let matches = MatchRepository::new(&state.db)
        .list_by_tournament(id, None, None)
        .await?;
    let participants = ParticipantRepository::new(&state.db)
        .list_by_tournament(id)
        .await?;

    let standings = progression::standings(&matches)
        .into_iter()
        .filter_map(|record| {
            participants
                .iter()
                .find(|p| p.id == record.entry_id)
                .map(|p| StandingEntry {
                    entry_id: record.entry_id,
                    display_name: p.display_name.clone(),
                    seed: p.seed,
                    wins: record.wins,
                    losses: record.losses,
                    draws: record.draws,
                })
        })
        .collect();

    Ok(Json(standings))
}

pub(crate) async fn find_tournament(state: &AppState, id: Uuid) -> Result<Tournament, ApiError> {
    TournamentRepository::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tournament {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamping() {
        assert_eq!(clamp_page(None, None), (1, 20));
        assert_eq!(clamp_page(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_page(Some(3), Some(250)), (3, 100));
        assert_eq!(clamp_page(Some(2), Some(50)), (2, 50));
    }
}
