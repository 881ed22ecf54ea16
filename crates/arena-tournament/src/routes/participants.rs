//! Participant endpoints: registration, check-in, and seeding

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use arena_core::{ParticipantStatus, TournamentStatus};
use arena_db::models::Participant;
use arena_db::repositories::ParticipantRepository;

use crate::error::ApiError;
use crate::routes::tournaments::find_tournament;
use crate::state::AppState;
use crate::ApiResult;

/// Participant representation returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Option<Uuid>,
    pub display_name: String,
    pub seed: i32,
    #[schema(value_type = String)]
    pub status: ParticipantStatus,
    pub is_waitlisted: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id,
            tournament_id: p.tournament_id,
            user_id: p.user_id,
            display_name: p.display_name,
            seed: p.seed,
            status: p.status,
            is_waitlisted: p.is_waitlisted,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterParticipantRequest {
    /// Nil for guest entries; guests never reach the ranking service.
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateParticipantRequest {
    #[validate(length(min = 1, max = 64))]
    pub display_name: Option<String>,
    #[validate(range(min = 0))]
    pub seed: Option<i32>,
}

/// Register a participant. A full field lands the entry on the waitlist
/// rather than rejecting it.
#[utoipa::path(
    post,
    path = "/api/v1/tournaments/{id}/participants",
    params(("id" = Uuid, Path, description = "Tournament id")),
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Registered", body = ParticipantResponse),
        (status = 409, description = "Duplicate registration or bad tournament state")
    ),
    tag = "participants"
)]
pub async fn register_participant(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<Uuid>,
    Json(request): Json<RegisterParticipantRequest>,
) -> ApiResult<(StatusCode, Json<ParticipantResponse>)> {
    request.validate()?;

    let tournament = find_tournament(&state, tournament_id).await?;
    if !matches!(
        tournament.status,
        TournamentStatus::Draft | TournamentStatus::Registration
    ) {
        return Err(ApiError::InvalidState(format!(
            "registration is closed, tournament is {}",
            tournament.status
        )));
    }

    let repo = ParticipantRepository::new(&state.db);
    let active = repo.count_active(tournament_id).await?;
    let waitlisted = active >= i64::from(tournament.max_participants);
    if waitlisted {
        tracing::info!(
            tournament_id = %tournament_id,
            "tournament full, registering participant on the waitlist"
        );
    }

    let now = Utc::now();
    let participant = Participant {
        id: Uuid::new_v4(),
        tournament_id,
        user_id: request.user_id,
        display_name: request.display_name,
        seed: 0,
        status: if waitlisted {
            ParticipantStatus::Waitlisted
        } else {
            ParticipantStatus::Registered
        },
        is_waitlisted: waitlisted,
        created_at: now,
        updated_at: now,
    };

    let created = repo.create(&participant).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List a tournament's participants
#[utoipa::path(
    get,
    path = "/api/v1/tournaments/{id}/participants",
    params(("id" = Uuid, Path, description = "Tournament id")),
    responses(
        (status = 200, description = "Participants", body = Vec<ParticipantResponse>)
    ),
    tag = "participants"
)]
pub async fn list_participants(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ParticipantResponse>>> {
    find_tournament(&state, tournament_id).await?;
    let participants = ParticipantRepository::new(&state.db)
        .list_by_tournament(tournament_id)
        .await?;
    Ok(Json(participants.into_iter().map(Into::into).collect()))
}

/// Edit a participant's display name or seed
pub async fn update_participant(
    State(state): State<Arc<AppState>>,
    Path((tournament_id, entry_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateParticipantRequest>,
) -> ApiResult<Json<ParticipantResponse>> {
    request.validate()?;

    let mut participant = find_participant(&state, tournament_id, entry_id).await?;
    if let Some(name) = request.display_name {
        participant.display_name = name;
    }
    if let Some(seed) = request.seed {
        participant.seed = seed;
    }

    let updated = ParticipantRepository::new(&state.db).update(&participant).await?;
    Ok(Json(updated.into()))
}

/// Unregister (disallowed once the tournament is running)
pub async fn unregister_participant(
    State(state): State<Arc<AppState>>,
    Path((tournament_id, entry_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let tournament = find_tournament(&state, tournament_id).await?;
    if tournament.status == TournamentStatus::InProgress {
        return Err(ApiError::InvalidState(
            "cannot unregister from a tournament in progress".to_string(),
        ));
    }

    let participant = find_participant(&state, tournament_id, entry_id).await?;
    ParticipantRepository::new(&state.db).delete(participant.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a participant in. A waitlisted entry is promoted only if a slot
/// is free; checking in against a full field is a capacity error.
#[utoipa::path(
    post,
    path = "/api/v1/tournaments/{id}/participants/{entry_id}/check-in",
    params(
        ("id" = Uuid, Path, description = "Tournament id"),
        ("entry_id" = Uuid, Path, description = "Participant entry id")
    ),
    responses(
        (status = 200, description = "Checked in", body = ParticipantResponse),
        (status = 409, description = "Tournament full")
    ),
    tag = "participants"
)]
pub async fn check_in_participant(
    State(state): State<Arc<AppState>>,
    Path((tournament_id, entry_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ParticipantResponse>> {
    let tournament = find_tournament(&state, tournament_id).await?;
    let mut participant = find_participant(&state, tournament_id, entry_id).await?;

    let repo = ParticipantRepository::new(&state.db);
    if participant.is_waitlisted {
        let active = repo.count_active(tournament_id).await?;
        if active >= i64::from(tournament.max_participants) {
            return Err(ApiError::CapacityExceeded(
                "tournament is full, cannot check in from the waitlist".to_string(),
            ));
        }
        participant.is_waitlisted = false;
    }
    participant.status = ParticipantStatus::CheckedIn;

    let updated = repo.update(&participant).await?;
    Ok(Json(updated.into()))
}

async fn find_participant(
    state: &AppState,
    tournament_id: Uuid,
    entry_id: Uuid,
) -> Result<Participant, ApiError> {
    ParticipantRepository::new(&state.db)
        .find_by_id(entry_id)
        .await?
        .filter(|p| p.tournament_id == tournament_id)
        .ok_or_else(|| ApiError::NotFound(format!("participant {entry_id}")))
}
