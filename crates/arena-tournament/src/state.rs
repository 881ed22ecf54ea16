//! Application state shared across handlers

use sqlx::PgPool;

use arena_core::TournamentServiceConfig;

use crate::emitter::MatchResultNotifier;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Service configuration
    pub config: TournamentServiceConfig,
    /// Detached match-result delivery to the ranking service
    pub notifier: MatchResultNotifier,
}

impl AppState {
    pub fn new(db: PgPool, config: TournamentServiceConfig) -> Self {
        let notifier = MatchResultNotifier::from_settings(&config.ranking);
        Self {
            db,
            config,
            notifier,
        }
    }

    /// Replace the notifier (tests swap in a mock sink).
    pub fn with_notifier(mut self, notifier: MatchResultNotifier) -> Self {
        self.notifier = notifier;
        self
    }
}
