//! Swiss pairing, initial round only.
//!
//! Later Swiss rounds depend on standings and are paired after each round
//! concludes, outside this engine. Round 1 is deterministic: top half of
//! the seeds against the bottom half in order.

use arena_core::{BracketType, EntryId, TournamentId};

use crate::{BracketBuilder, Feeder, GeneratedMatch};

pub fn generate(tournament_id: TournamentId, entries: &[EntryId]) -> Vec<GeneratedMatch> {
    let mut builder = BracketBuilder::new(tournament_id);
    let half = entries.len() / 2;

    for i in 0..half {
        let m = builder.push(1, (i + 1) as i32, BracketType::Winners);
        builder.attach_pair(m, Feeder::Entry(entries[i]), Feeder::Entry(entries[half + i]));
    }

    if entries.len() % 2 == 1 {
        // The lowest seed sits out round 1; later rounds are paired on
        // standings and are not generated here.
        if let Some(unpaired) = entries.last() {
            tracing::warn!(entry = %unpaired, "odd Swiss field, lowest seed unpaired in round 1");
        }
    }

    builder.into_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_unique_match_numbers, entries};
    use uuid::Uuid;

    #[test]
    fn round_one_pairs_top_half_against_bottom_half() {
        let ids = entries(6);
        let matches = generate(Uuid::new_v4(), &ids);
        assert_eq!(matches.len(), 3);
        for (i, m) in matches.iter().enumerate() {
            assert_eq!(m.round, 1);
            assert_eq!(m.participant1, Some(ids[i]));
            assert_eq!(m.participant2, Some(ids[3 + i]));
            assert!(m.next_match_id.is_none());
        }
        assert_unique_match_numbers(&matches);
    }

    #[test]
    fn odd_field_leaves_lowest_seed_unpaired() {
        let ids = entries(5);
        let matches = generate(Uuid::new_v4(), &ids);
        assert_eq!(matches.len(), 2);
        let paired: Vec<_> = matches
            .iter()
            .flat_map(|m| [m.participant1.unwrap(), m.participant2.unwrap()])
            .collect();
        assert!(!paired.contains(ids.last().unwrap()));
    }
}
