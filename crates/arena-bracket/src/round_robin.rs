//! Round robin scheduling via the circle method.
//!
//! Participant 0 stays fixed while the rest rotate one position per
//! round. An odd field gets a synthetic bye; pairings against it are
//! skipped. Round robin matches carry no forward links.

use arena_core::{BracketType, EntryId, TournamentId};

use crate::{BracketBuilder, Feeder, GeneratedMatch};

pub fn generate(tournament_id: TournamentId, entries: &[EntryId]) -> Vec<GeneratedMatch> {
    let mut builder = BracketBuilder::new(tournament_id);

    // None marks the synthetic bye slot.
    let mut ring: Vec<Option<EntryId>> = entries.iter().copied().map(Some).collect();
    if ring.len() % 2 == 1 {
        ring.push(None);
    }

    let rounds = ring.len() - 1;
    let half = ring.len() / 2;
    let mut match_number = 1;

    for round in 1..=rounds {
        for i in 0..half {
            if let (Some(a), Some(b)) = (ring[i], ring[ring.len() - 1 - i]) {
                let m = builder.push(round as i32, match_number, BracketType::Winners);
                match_number += 1;
                builder.attach_pair(m, Feeder::Entry(a), Feeder::Entry(b));
            }
        }
        ring[1..].rotate_right(1);
    }

    builder.into_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_unique_match_numbers, entries};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn pairings(matches: &[GeneratedMatch]) -> HashSet<(EntryId, EntryId)> {
        matches
            .iter()
            .map(|m| {
                let a = m.participant1.unwrap();
                let b = m.participant2.unwrap();
                if a < b {
                    (a, b)
                } else {
                    (b, a)
                }
            })
            .collect()
    }

    #[test]
    fn four_players_three_rounds_six_matches() {
        let ids = entries(4);
        let matches = generate(Uuid::new_v4(), &ids);
        assert_eq!(matches.len(), 6);
        assert_eq!(matches.iter().map(|m| m.round).max(), Some(3));
        for round in 1..=3 {
            assert_eq!(matches.iter().filter(|m| m.round == round).count(), 2);
        }
        // Every pair meets exactly once.
        assert_eq!(pairings(&matches).len(), 6);
        assert_unique_match_numbers(&matches);
    }

    #[test]
    fn odd_field_gets_a_silent_bye() {
        let ids = entries(5);
        let matches = generate(Uuid::new_v4(), &ids);
        // 5 rounds of 2 matches; the bye pairing is skipped each round.
        assert_eq!(matches.len(), 10);
        assert_eq!(matches.iter().map(|m| m.round).max(), Some(5));
        for round in 1..=5 {
            assert_eq!(matches.iter().filter(|m| m.round == round).count(), 2);
        }
        assert_eq!(pairings(&matches).len(), 10);
    }

    #[test]
    fn no_forward_links_and_both_slots_always_filled() {
        let matches = generate(Uuid::new_v4(), &entries(7));
        for m in &matches {
            assert!(m.next_match_id.is_none());
            assert!(m.loser_next_match_id.is_none());
            assert!(m.previous_match_ids.is_empty());
            assert!(m.participant1.is_some() && m.participant2.is_some());
        }
    }

    #[test]
    fn everyone_plays_everyone_exactly_once() {
        for n in [2usize, 3, 4, 6, 9] {
            let ids = entries(n);
            let matches = generate(Uuid::new_v4(), &ids);
            assert_eq!(matches.len(), n * (n - 1) / 2, "n = {n}");
            assert_eq!(pairings(&matches).len(), n * (n - 1) / 2, "n = {n}");
            // No one plays twice in the same round.
            let rounds = matches.iter().map(|m| m.round).max().unwrap();
            for round in 1..=rounds {
                let mut seen = HashSet::new();
                for m in matches.iter().filter(|m| m.round == round) {
                    assert!(seen.insert(m.participant1.unwrap()));
                    assert!(seen.insert(m.participant2.unwrap()));
                }
            }
        }
    }
}
