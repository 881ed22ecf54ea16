//! Arena bracket engine
//!
//! Pure, deterministic bracket generators. Given a tournament id and the
//! participants in seed order, the engine emits the full match DAG for a
//! format: rounds, match numbers, participant slots, winner links, loser
//! links, and back links. Nothing here touches storage; persistence and
//! progression live in the tournament service.

pub mod double_elim;
pub mod round_robin;
pub mod seeding;
pub mod single_elim;
pub mod swiss;

use arena_core::{BracketType, EntryId, MatchId, TournamentFormat, TournamentId};
use thiserror::Error;
use uuid::Uuid;

pub use seeding::next_power_of_two;

/// Losers-bracket match numbers start here so they never collide with the
/// winners bracket.
pub const LOSERS_MATCH_BASE: i32 = 1000;

/// Grand-finals match numbers start above both brackets.
pub const GRAND_FINALS_MATCH_BASE: i32 = 2000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("at least 2 participants are required, got {0}")]
    NotEnoughParticipants(usize),
}

/// Options for bracket generation.
#[derive(Debug, Clone)]
pub struct BracketOptions {
    /// Pre-create the second grand-finals match for double elimination.
    /// It is played only if the losers-bracket finalist wins the first.
    pub reset_bracket: bool,
}

impl Default for BracketOptions {
    fn default() -> Self {
        Self { reset_bracket: true }
    }
}

/// A match emitted by the engine, ready to persist.
#[derive(Debug, Clone)]
pub struct GeneratedMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub round: i32,
    pub match_number: i32,
    pub bracket_type: BracketType,
    pub participant1: Option<EntryId>,
    pub participant2: Option<EntryId>,
    pub next_match_id: Option<MatchId>,
    pub loser_next_match_id: Option<MatchId>,
    pub previous_match_ids: Vec<MatchId>,
}

impl GeneratedMatch {
    fn new(
        tournament_id: TournamentId,
        round: i32,
        match_number: i32,
        bracket_type: BracketType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            bracket_type,
            participant1: None,
            participant2: None,
            next_match_id: None,
            loser_next_match_id: None,
            previous_match_ids: Vec::new(),
        }
    }
}

/// Where a bracket slot gets its participant from.
///
/// A slot is fed either by the outcome of an earlier match or directly by
/// a participant who reached the round without playing (bye, or a
/// losers-bracket pass-through). Pass-throughs never allocate a match
/// record of their own; they ride along as feeders until paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feeder {
    /// Winner of the match at this index in the builder's match list
    Winner(usize),
    /// Loser of the match at this index
    Loser(usize),
    /// A participant placed directly into the slot
    Entry(EntryId),
}

/// Incremental match-list builder shared by the generators.
///
/// Matches are allocated first and links are written when a feeder is
/// attached, so forward links, loser links, and back links stay consistent
/// without partially-initialized nodes.
pub(crate) struct BracketBuilder {
    tournament_id: TournamentId,
    matches: Vec<GeneratedMatch>,
}

impl BracketBuilder {
    pub(crate) fn new(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            matches: Vec::new(),
        }
    }

    /// Allocate a match and return its index.
    pub(crate) fn push(
        &mut self,
        round: i32,
        match_number: i32,
        bracket_type: BracketType,
    ) -> usize {
        self.matches.push(GeneratedMatch::new(
            self.tournament_id,
            round,
            match_number,
            bracket_type,
        ));
        self.matches.len() - 1
    }

    /// Attach feeders to both slots of `target`: `first` fills slot 1,
    /// `second` fills slot 2.
    pub(crate) fn attach_pair(&mut self, target: usize, first: Feeder, second: Feeder) {
        self.attach(target, true, first);
        self.attach(target, false, second);
    }

    fn attach(&mut self, target: usize, slot1: bool, feeder: Feeder) {
        match feeder {
            Feeder::Entry(entry) => {
                let m = &mut self.matches[target];
                if slot1 {
                    m.participant1 = Some(entry);
                } else {
                    m.participant2 = Some(entry);
                }
            }
            Feeder::Winner(source) => {
                let target_id = self.matches[target].id;
                let source_id = self.matches[source].id;
                self.matches[source].next_match_id = Some(target_id);
                self.push_back_link(target, source_id);
            }
            Feeder::Loser(source) => {
                let target_id = self.matches[target].id;
                let source_id = self.matches[source].id;
                self.matches[source].loser_next_match_id = Some(target_id);
                self.push_back_link(target, source_id);
            }
        }
    }

    // A match can feed both slots of its successor (a grand-finals
    // reset); the back link is recorded once.
    fn push_back_link(&mut self, target: usize, source_id: MatchId) {
        let previous = &mut self.matches[target].previous_match_ids;
        if !previous.contains(&source_id) {
            previous.push(source_id);
        }
    }

    pub(crate) fn into_matches(self) -> Vec<GeneratedMatch> {
        self.matches
    }
}

/// Generate the full bracket for a format.
///
/// Participants must be in seed order (best seed first). Swiss generates
/// its deterministic first round only; later Swiss rounds depend on
/// standings and are paired after each round concludes.
pub fn generate(
    tournament_id: TournamentId,
    format: TournamentFormat,
    entries: &[EntryId],
    options: &BracketOptions,
) -> Result<Vec<GeneratedMatch>, BracketError> {
    if entries.len() < 2 {
        return Err(BracketError::NotEnoughParticipants(entries.len()));
    }
    let matches = match format {
        TournamentFormat::SingleElim => single_elim::generate(tournament_id, entries),
        TournamentFormat::DoubleElim => double_elim::generate(tournament_id, entries, options),
        TournamentFormat::RoundRobin => round_robin::generate(tournament_id, entries),
        TournamentFormat::Swiss => swiss::generate(tournament_id, entries),
    };
    Ok(matches)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::{HashMap, HashSet};

    pub fn entries(n: usize) -> Vec<EntryId> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    /// Every match number is unique within the bracket.
    pub fn assert_unique_match_numbers(matches: &[GeneratedMatch]) {
        let mut seen = HashSet::new();
        for m in matches {
            assert!(
                seen.insert(m.match_number),
                "duplicate match number {}",
                m.match_number
            );
        }
    }

    /// The graph formed by next/loser links has no cycles.
    pub fn assert_acyclic(matches: &[GeneratedMatch]) {
        let by_id: HashMap<MatchId, &GeneratedMatch> =
            matches.iter().map(|m| (m.id, m)).collect();
        for start in matches {
            // Depth-first over both link kinds; revisiting the origin or
            // exceeding the bracket size means a cycle.
            let mut stack: Vec<MatchId> =
                [start.next_match_id, start.loser_next_match_id]
                    .into_iter()
                    .flatten()
                    .collect();
            let mut visited = HashSet::new();
            while let Some(id) = stack.pop() {
                assert_ne!(id, start.id, "cycle through match {}", start.match_number);
                if !visited.insert(id) {
                    continue;
                }
                assert!(visited.len() <= matches.len(), "link chain longer than bracket");
                let m = by_id.get(&id).expect("dangling link");
                stack.extend([m.next_match_id, m.loser_next_match_id].into_iter().flatten());
            }
        }
    }

    /// Back links mirror the union of forward and loser links.
    pub fn assert_back_links(matches: &[GeneratedMatch]) {
        let by_id: HashMap<MatchId, &GeneratedMatch> =
            matches.iter().map(|m| (m.id, m)).collect();
        for m in matches {
            for target in [m.next_match_id, m.loser_next_match_id].into_iter().flatten() {
                let successor = by_id.get(&target).expect("dangling link");
                assert!(
                    successor.previous_match_ids.contains(&m.id),
                    "match {} missing back link to {}",
                    successor.match_number,
                    m.match_number
                );
            }
            for &source in &m.previous_match_ids {
                let feeder = by_id.get(&source).expect("dangling back link");
                assert!(
                    feeder.next_match_id == Some(m.id)
                        || feeder.loser_next_match_id == Some(m.id),
                    "match {} back-links {} which does not feed it",
                    m.match_number,
                    feeder.match_number
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::entries;

    #[test]
    fn rejects_fewer_than_two_participants() {
        let t = Uuid::new_v4();
        let options = BracketOptions::default();
        for format in [
            TournamentFormat::SingleElim,
            TournamentFormat::DoubleElim,
            TournamentFormat::RoundRobin,
            TournamentFormat::Swiss,
        ] {
            let err = generate(t, format, &entries(1), &options).unwrap_err();
            assert_eq!(err, BracketError::NotEnoughParticipants(1));
            let err = generate(t, format, &[], &options).unwrap_err();
            assert_eq!(err, BracketError::NotEnoughParticipants(0));
        }
    }

    #[test]
    fn all_generated_matches_carry_tournament_id() {
        let t = Uuid::new_v4();
        let matches = generate(
            t,
            TournamentFormat::DoubleElim,
            &entries(6),
            &BracketOptions::default(),
        )
        .unwrap();
        assert!(matches.iter().all(|m| m.tournament_id == t));
    }
}
