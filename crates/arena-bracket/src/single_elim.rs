//! Single elimination bracket generation.
//!
//! Round 1 pairs the non-bye seeds first against last; bye participants
//! appear directly in round 2 with no round-1 match. Every later round
//! pairs the previous round's outputs (byes first, then matches in order)
//! first against last.

use arena_core::{BracketType, EntryId, TournamentId};

use crate::seeding::bye_count;
use crate::{BracketBuilder, Feeder, GeneratedMatch};

pub fn generate(tournament_id: TournamentId, entries: &[EntryId]) -> Vec<GeneratedMatch> {
    let mut builder = BracketBuilder::new(tournament_id);
    winners_rounds(&mut builder, entries);
    builder.into_matches()
}

/// Build the winners bracket on `builder` and return the match indices of
/// each round. Double elimination reuses this to wire loser drops.
pub(crate) fn winners_rounds(
    builder: &mut BracketBuilder,
    entries: &[EntryId],
) -> Vec<Vec<usize>> {
    let byes = bye_count(entries.len());
    let playing = &entries[byes..];

    let mut rounds: Vec<Vec<usize>> = Vec::new();
    let mut match_number = 1;

    // Round 1 over the non-bye seeds, first vs last.
    let mut round_matches = Vec::new();
    for i in 0..playing.len() / 2 {
        let m = builder.push(1, match_number, BracketType::Winners);
        match_number += 1;
        builder.attach_pair(
            m,
            Feeder::Entry(playing[i]),
            Feeder::Entry(playing[playing.len() - 1 - i]),
        );
        round_matches.push(m);
    }
    rounds.push(round_matches.clone());

    // Bye seeds enter in round 2 ahead of the round-1 winners.
    let mut feeders: Vec<Feeder> = entries[..byes].iter().copied().map(Feeder::Entry).collect();
    feeders.extend(round_matches.into_iter().map(Feeder::Winner));

    let mut round = 2;
    while feeders.len() > 1 {
        let mut round_matches = Vec::new();
        for i in 0..feeders.len() / 2 {
            let m = builder.push(round, match_number, BracketType::Winners);
            match_number += 1;
            builder.attach_pair(m, feeders[i], feeders[feeders.len() - 1 - i]);
            round_matches.push(m);
        }
        feeders = round_matches.iter().copied().map(Feeder::Winner).collect();
        rounds.push(round_matches);
        round += 1;
    }

    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_acyclic, assert_back_links, assert_unique_match_numbers, entries};
    use uuid::Uuid;

    #[test]
    fn four_players_clean_bracket() {
        let ids = entries(4);
        let matches = generate(Uuid::new_v4(), &ids);
        assert_eq!(matches.len(), 3);

        // Round 1: seed 1 vs seed 4, seed 2 vs seed 3.
        let m1 = &matches[0];
        assert_eq!((m1.round, m1.match_number), (1, 1));
        assert_eq!(m1.participant1, Some(ids[0]));
        assert_eq!(m1.participant2, Some(ids[3]));
        let m2 = &matches[1];
        assert_eq!((m2.round, m2.match_number), (1, 2));
        assert_eq!(m2.participant1, Some(ids[1]));
        assert_eq!(m2.participant2, Some(ids[2]));

        // Final fed by both round-1 matches.
        let m3 = &matches[2];
        assert_eq!((m3.round, m3.match_number), (2, 3));
        assert_eq!(m3.participant1, None);
        assert_eq!(m3.participant2, None);
        assert_eq!(m1.next_match_id, Some(m3.id));
        assert_eq!(m2.next_match_id, Some(m3.id));
        assert_eq!(m3.previous_match_ids, vec![m1.id, m2.id]);

        assert_unique_match_numbers(&matches);
        assert_acyclic(&matches);
        assert_back_links(&matches);
    }

    #[test]
    fn three_players_top_seed_gets_the_bye() {
        let ids = entries(3);
        let matches = generate(Uuid::new_v4(), &ids);
        assert_eq!(matches.len(), 2);

        // Round 1 holds the only real pairing: seed 2 vs seed 3.
        let m1 = &matches[0];
        assert_eq!(m1.round, 1);
        assert_eq!(m1.participant1, Some(ids[1]));
        assert_eq!(m1.participant2, Some(ids[2]));

        // Seed 1 sits directly in the final; the round-1 winner joins it.
        let m2 = &matches[1];
        assert_eq!(m2.round, 2);
        assert_eq!(m2.participant1, Some(ids[0]));
        assert_eq!(m2.participant2, None);
        assert_eq!(m1.next_match_id, Some(m2.id));
        assert_eq!(m2.previous_match_ids, vec![m1.id]);
    }

    #[test]
    fn six_players_two_byes() {
        let ids = entries(6);
        let matches = generate(Uuid::new_v4(), &ids);
        // 2 round-1 matches + 2 semis + final.
        assert_eq!(matches.len(), 5);
        let round1: Vec<_> = matches.iter().filter(|m| m.round == 1).collect();
        assert_eq!(round1.len(), 2);
        assert_eq!(round1[0].participant1, Some(ids[2]));
        assert_eq!(round1[0].participant2, Some(ids[5]));
        assert_eq!(round1[1].participant1, Some(ids[3]));
        assert_eq!(round1[1].participant2, Some(ids[4]));

        // Semis: each bye seed against a round-1 winner, top seed first.
        let semis: Vec<_> = matches.iter().filter(|m| m.round == 2).collect();
        assert_eq!(semis.len(), 2);
        assert_eq!(semis[0].participant1, Some(ids[0]));
        assert_eq!(semis[1].participant1, Some(ids[1]));
        assert_eq!(round1[1].next_match_id, Some(semis[0].id));
        assert_eq!(round1[0].next_match_id, Some(semis[1].id));

        assert_unique_match_numbers(&matches);
        assert_back_links(&matches);
    }

    #[test]
    fn match_count_is_participants_minus_one() {
        for n in 2..=33 {
            let matches = generate(Uuid::new_v4(), &entries(n));
            assert_eq!(matches.len(), n - 1, "n = {n}");
            assert_unique_match_numbers(&matches);
            assert_acyclic(&matches);
            assert_back_links(&matches);
        }
    }

    #[test]
    fn round_count_is_log2_ceiling() {
        for (n, rounds) in [(2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4), (16, 4)] {
            let matches = generate(Uuid::new_v4(), &entries(n));
            let max_round = matches.iter().map(|m| m.round).max().unwrap();
            assert_eq!(max_round, rounds, "n = {n}");
        }
    }

    #[test]
    fn exactly_one_terminal_match() {
        for n in [2, 3, 7, 12, 16] {
            let matches = generate(Uuid::new_v4(), &entries(n));
            let roots = matches.iter().filter(|m| m.next_match_id.is_none()).count();
            assert_eq!(roots, 1, "n = {n}");
        }
    }
}
