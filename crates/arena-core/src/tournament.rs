//! Tournament domain enums and the lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "tournament_format", rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Single elimination bracket
    SingleElim,
    /// Double elimination bracket with losers bracket and grand finals
    DoubleElim,
    /// Round robin (everyone plays everyone)
    RoundRobin,
    /// Swiss system
    Swiss,
}

impl TournamentFormat {
    /// Only round robin tolerates tied scores; elimination and Swiss
    /// matches must produce a winner.
    pub fn allows_draws(&self) -> bool {
        matches!(self, TournamentFormat::RoundRobin)
    }
}

/// Tournament status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "tournament_status", rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Being set up, not yet visible for registration
    Draft,
    /// Registration open
    Registration,
    /// Bracket generated, matches being played
    InProgress,
    /// All matches finished
    Completed,
    /// Abandoned at any point before completion
    Cancelled,
}

impl TournamentStatus {
    /// Whether the lifecycle graph permits moving to `next`.
    ///
    /// Preconditions (bracket exists, matches finished) are checked by the
    /// service on top of this; the graph itself is pure.
    pub fn can_transition_to(&self, next: TournamentStatus) -> bool {
        use TournamentStatus::*;
        matches!(
            (self, next),
            (Draft, Registration)
                | (Draft, Cancelled)
                | (Registration, InProgress)
                | (Registration, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Registration => "registration",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Participant entry status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "participant_status", rename_all = "snake_case")]
pub enum ParticipantStatus {
    Registered,
    CheckedIn,
    Eliminated,
    Waitlisted,
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "match_status", rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for participants or a result
    Pending,
    /// Being played
    InProgress,
    /// Scored and final
    Completed,
    /// Will never be played (e.g. an unused reset final)
    Cancelled,
}

impl MatchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

/// Which bracket a match belongs to.
///
/// This field is the authoritative marker; consumers must never infer
/// bracket membership from match notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "bracket_type", rename_all = "snake_case")]
pub enum BracketType {
    Winners,
    Losers,
    GrandFinals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_permits_forward_edges() {
        use TournamentStatus::*;
        assert!(Draft.can_transition_to(Registration));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Registration.can_transition_to(InProgress));
        assert!(Registration.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Cancelled));
    }

    #[test]
    fn lifecycle_rejects_backwards_and_terminal_edges() {
        use TournamentStatus::*;
        assert!(!Registration.can_transition_to(Draft));
        assert!(!InProgress.can_transition_to(Registration));
        assert!(!Draft.can_transition_to(InProgress));
        assert!(!Draft.can_transition_to(Completed));
        for from in [Completed, Cancelled] {
            for to in [Draft, Registration, InProgress, Completed, Cancelled] {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be rejected");
            }
        }
    }

    #[test]
    fn only_round_robin_allows_draws() {
        assert!(TournamentFormat::RoundRobin.allows_draws());
        assert!(!TournamentFormat::SingleElim.allows_draws());
        assert!(!TournamentFormat::DoubleElim.allows_draws());
        assert!(!TournamentFormat::Swiss.allows_draws());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TournamentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let format: TournamentFormat = serde_json::from_str("\"double_elim\"").unwrap();
        assert_eq!(format, TournamentFormat::DoubleElim);
    }
}
