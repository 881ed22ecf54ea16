//! Arena core domain
//!
//! Shared types for the tournament and ranking services: entity ids,
//! tournament formats and lifecycle statuses, the cross-service
//! match-result event schema, error kinds, and service configuration.

pub mod config;
pub mod error;
pub mod events;
pub mod tournament;

pub use config::{
    DatabaseSettings, HttpSettings, RankingClientSettings, RankingServiceConfig,
    TournamentServiceConfig,
};
pub use error::{CoreError, Result};
pub use events::{
    effective_game_id, MatchOutcome, MatchResultEvent, MatchResultUser, GLOBAL_GAME_ID,
};
pub use tournament::{
    BracketType, MatchStatus, ParticipantStatus, TournamentFormat, TournamentStatus,
};

/// Tournament id
pub type TournamentId = uuid::Uuid;

/// Participant entry id (one per tournament registration)
pub type EntryId = uuid::Uuid;

/// Match id
pub type MatchId = uuid::Uuid;

/// Platform user id
pub type UserId = uuid::Uuid;
