//! Database repositories module
//!
//! Repository pattern over the shared pool, one repository per domain
//! area.

pub mod matches;
pub mod participant;
pub mod ranking;
pub mod tournament;

pub use matches::{MatchRepository, SlotFill};
pub use participant::ParticipantRepository;
pub use ranking::RankingRepository;
pub use tournament::{TournamentFilter, TournamentRepository};
