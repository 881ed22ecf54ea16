//! Database models module
//!
//! Row types for every table, one file per domain area.

pub mod matches;
pub mod participant;
pub mod ranking;
pub mod tournament;

pub use matches::Match;
pub use participant::Participant;
pub use ranking::{ProcessedMatchEvent, UserScore};
pub use tournament::Tournament;
