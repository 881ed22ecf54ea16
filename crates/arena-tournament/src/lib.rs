//! Arena tournament service
//!
//! HTTP surface for tournament lifecycle, participant registration,
//! bracket generation, and match progression. Completed matches are
//! pushed to the ranking service as idempotent match-result events.

pub mod emitter;
pub mod error;
pub mod lifecycle;
pub mod progression;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    routing::{delete, get, patch, post, put},
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
        routes::tournaments::create_tournament,
        routes::tournaments::list_tournaments,
        routes::tournaments::get_tournament,
        routes::tournaments::transition_status,
        routes::tournaments::get_standings,
        routes::participants::register_participant,
        routes::participants::list_participants,
        routes::participants::check_in_participant,
        routes::matches::generate_bracket,
        routes::matches::list_matches,
        routes::matches::submit_score,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::tournaments::TournamentResponse,
            routes::tournaments::TournamentListResponse,
            routes::tournaments::CreateTournamentRequest,
            routes::tournaments::UpdateTournamentRequest,
            routes::tournaments::TransitionRequest,
            routes::tournaments::StandingEntry,
            routes::participants::ParticipantResponse,
            routes::participants::RegisterParticipantRequest,
            routes::participants::UpdateParticipantRequest,
            routes::matches::MatchResponse,
            routes::matches::GenerateBracketRequest,
            routes::matches::SubmitScoreRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tournaments", description = "Tournament lifecycle"),
        (name = "participants", description = "Registration and seeding"),
        (name = "matches", description = "Brackets and score reporting"),
    ),
    info(
        title = "Arena Tournament API",
        version = "0.1.0",
        description = "Tournament lifecycle, brackets, and match progression",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Tournaments
        .route("/tournaments", post(routes::tournaments::create_tournament))
        .route("/tournaments", get(routes::tournaments::list_tournaments))
        .route("/tournaments/:id", get(routes::tournaments::get_tournament))
        .route("/tournaments/:id", patch(routes::tournaments::update_tournament))
        .route("/tournaments/:id", delete(routes::tournaments::delete_tournament))
        .route("/tournaments/:id/status", post(routes::tournaments::transition_status))
        .route("/tournaments/:id/standings", get(routes::tournaments::get_standings))
        // Participants
        .route(
            "/tournaments/:id/participants",
            post(routes::participants::register_participant),
        )
        .route(
            "/tournaments/:id/participants",
            get(routes::participants::list_participants),
        )
        .route(
            "/tournaments/:id/participants/:entry_id",
            patch(routes::participants::update_participant),
        )
        .route(
            "/tournaments/:id/participants/:entry_id",
            delete(routes::participants::unregister_participant),
        )
        .route(
            "/tournaments/:id/participants/:entry_id/check-in",
            post(routes::participants::check_in_participant),
        )
        // Brackets & matches
        .route("/tournaments/:id/bracket", post(routes::matches::generate_bracket))
        .route("/tournaments/:id/matches", get(routes::matches::list_matches))
        .route("/tournaments/:id/matches", delete(routes::matches::delete_matches))
        .route(
            "/tournaments/:id/matches/:match_id/score",
            put(routes::matches::submit_score),
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

    tracing::info!("tournament service listening on {addr}");

    axum::serve(listener, router).await
}
