//! Ranking endpoints: result ingestion, user rankings, leaderboards

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use arena_core::MatchResultEvent;

use crate::query::{self, LeaderboardResponse, UserRankingResponse};
use crate::state::AppState;
use crate::{ingest, ApiResult};

/// Acknowledgement for an ingested match result
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    /// False when the event had already been applied.
    pub applied: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuery {
    pub game_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub game_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Ingest a match result (idempotent, at-least-once delivery)
#[utoipa::path(
    post,
    path = "/api/v1/rankings/match-results",
    responses(
        (status = 200, description = "Applied (or already applied)", body = IngestResponse)
    ),
    tag = "rankings"
)]
pub async fn ingest_match_result(
    State(state): State<Arc<AppState>>,
    Json(event): Json<MatchResultEvent>,
) -> ApiResult<Json<IngestResponse>> {
    let applied = ingest::process(&state.db, event).await?;
    Ok(Json(IngestResponse { applied }))
}

/// Get a user's ranking for a game
#[utoipa::path(
    get,
    path = "/api/v1/rankings/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User id"),
        ("gameId" = Option<String>, Query, description = "Game id, empty for global")
    ),
    responses(
        (status = 200, description = "User ranking", body = UserRankingResponse)
    ),
    tag = "rankings"
)]
pub async fn get_user_ranking(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<GameQuery>,
) -> ApiResult<Json<UserRankingResponse>> {
    let ranking =
        query::get_user_ranking(&state.db, user_id, query.game_id.as_deref().unwrap_or(""))
            .await?;
    Ok(Json(ranking))
}

/// Get a game's leaderboard
#[utoipa::path(
    get,
    path = "/api/v1/rankings/leaderboard",
    params(
        ("gameId" = Option<String>, Query, description = "Game id, empty for global"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("pageSize" = Option<u32>, Query, description = "Results per page (max 100)")
    ),
    responses(
        (status = 200, description = "Leaderboard page", body = LeaderboardResponse)
    ),
    tag = "rankings"
)]
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<LeaderboardResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(20).clamp(1, 100);

    let leaderboard = query::get_leaderboard(
        &state.db,
        query.game_id.as_deref().unwrap_or(""),
        page,
        page_size,
    )
    .await?;
    Ok(Json(leaderboard))
}
