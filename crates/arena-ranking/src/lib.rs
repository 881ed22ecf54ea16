//! Arena ranking service
//!
//! Consumes match-result events from the tournament service exactly once
//! and serves per-user rankings and game leaderboards.

pub mod error;
pub mod ingest;
pub mod query;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// API Result type
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::rankings::ingest_match_result,
        routes::rankings::get_user_ranking,
        routes::rankings::get_leaderboard,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::rankings::IngestResponse,
            query::UserRankingResponse,
            query::LeaderboardResponse,
            query::LeaderboardEntry,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rankings", description = "Match-result ingestion and leaderboards"),
    ),
    info(
        title = "Arena Ranking API",
        version = "0.1.0",
        description = "Per-user per-game scores, ranks, and leaderboards",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/rankings/match-results",
            post(routes::rankings::ingest_match_result),
        )
        .route(
            "/rankings/users/:user_id",
            get(routes::rankings::get_user_ranking),
        )
        .route(
            "/rankings/leaderboard",
            get(routes::rankings::get_leaderboard),
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the API server
pub async fn start_server(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("ranking service listening on {addr}");

    axum::serve(listener, router).await
}
