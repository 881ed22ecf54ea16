//! Double elimination bracket generation.
//!
//! The winners bracket is the single-elimination bracket. The losers
//! bracket is built from it round by round, data-driven rather than by
//! formula: each winners round drops its losers onto the winners of the
//! previous losers round (one-to-one in match order), surplus feeders on
//! either side pair among themselves, and a consolidation round halves
//! the survivors whenever more of them remain than the next winners
//! round will drop. A lone leftover feeder passes through to the next
//! round without a match record.

use arena_core::{BracketType, EntryId, TournamentId};

use crate::{
    single_elim, BracketBuilder, BracketOptions, Feeder, GeneratedMatch,
    GRAND_FINALS_MATCH_BASE, LOSERS_MATCH_BASE,
};

pub fn generate(
    tournament_id: TournamentId,
    entries: &[EntryId],
    options: &BracketOptions,
) -> Vec<GeneratedMatch> {
    let mut builder = BracketBuilder::new(tournament_id);
    let wb_rounds = single_elim::winners_rounds(&mut builder, entries);

    let mut lb = LosersBracket::new();
    let mut pending: Vec<Feeder> = Vec::new();

    for (i, wb_round) in wb_rounds.iter().enumerate() {
        let losers: Vec<Feeder> = wb_round.iter().map(|&m| Feeder::Loser(m)).collect();
        pending = lb.drop_round(&mut builder, &losers, &pending);
        // Consolidate only when more feeders survive than the next
        // winners round will drop; the bracket narrows just in time.
        let next_drop = wb_rounds.get(i + 1).map(|round| round.len()).unwrap_or(0);
        if next_drop > 0 && pending.len() > next_drop {
            pending = lb.pair_round(&mut builder, &pending);
        }
    }
    // A consolidated round can still leave several feeders; reduce them to
    // the single losers-bracket finalist.
    while pending.len() > 1 {
        pending = lb.pair_round(&mut builder, &pending);
    }

    let wb_final = wb_rounds.last().and_then(|round| round.last()).copied();
    let (Some(wb_final), Some(lb_finalist)) = (wb_final, pending.first().copied()) else {
        return builder.into_matches();
    };

    let gf1 = builder.push(1, GRAND_FINALS_MATCH_BASE, BracketType::GrandFinals);
    builder.attach_pair(gf1, Feeder::Winner(wb_final), lb_finalist);

    if options.reset_bracket {
        // Played only if the losers-bracket finalist takes the first
        // final; both finalists re-seat, so the loser link is wired too.
        let gf2 = builder.push(2, GRAND_FINALS_MATCH_BASE + 1, BracketType::GrandFinals);
        builder.attach_pair(gf2, Feeder::Winner(gf1), Feeder::Loser(gf1));
    }

    builder.into_matches()
}

/// Round and match-number bookkeeping for the losers bracket.
struct LosersBracket {
    round: i32,
    next_number: i32,
}

impl LosersBracket {
    fn new() -> Self {
        Self {
            round: 0,
            next_number: LOSERS_MATCH_BASE,
        }
    }

    /// Drop-down round: winners-bracket losers against the previous
    /// losers round's winners, one-to-one in match order. Surplus feeders
    /// on whichever side pair among themselves in the same round.
    fn drop_round(
        &mut self,
        builder: &mut BracketBuilder,
        losers: &[Feeder],
        pending: &[Feeder],
    ) -> Vec<Feeder> {
        let paired = losers.len().min(pending.len());
        let surplus = if losers.len() > paired {
            &losers[paired..]
        } else {
            &pending[paired..]
        };
        if paired + surplus.len() / 2 > 0 {
            self.round += 1;
        }

        let mut produced = Vec::new();
        for i in 0..paired {
            let m = self.push(builder);
            builder.attach_pair(m, losers[i], pending[i]);
            produced.push(Feeder::Winner(m));
        }
        produced.extend(self.pair_within(builder, surplus));
        produced
    }

    /// Consolidation round: pair feeders adjacently. A lone trailing
    /// feeder is carried forward without a match record.
    fn pair_round(&mut self, builder: &mut BracketBuilder, feeders: &[Feeder]) -> Vec<Feeder> {
        if feeders.len() >= 2 {
            self.round += 1;
        }
        self.pair_within(builder, feeders)
    }

    fn pair_within(&mut self, builder: &mut BracketBuilder, feeders: &[Feeder]) -> Vec<Feeder> {
        let mut out = Vec::new();
        let mut pairs = feeders.chunks_exact(2);
        for pair in &mut pairs {
            let m = self.push(builder);
            builder.attach_pair(m, pair[0], pair[1]);
            out.push(Feeder::Winner(m));
        }
        out.extend(pairs.remainder().iter().copied());
        out
    }

    fn push(&mut self, builder: &mut BracketBuilder) -> usize {
        let m = builder.push(self.round, self.next_number, BracketType::Losers);
        self.next_number += 1;
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{assert_acyclic, assert_back_links, assert_unique_match_numbers, entries};
    use arena_core::BracketType;
    use uuid::Uuid;

    fn split(matches: &[GeneratedMatch]) -> (Vec<&GeneratedMatch>, Vec<&GeneratedMatch>, Vec<&GeneratedMatch>) {
        let wb = matches.iter().filter(|m| m.bracket_type == BracketType::Winners).collect();
        let lb = matches.iter().filter(|m| m.bracket_type == BracketType::Losers).collect();
        let gf = matches.iter().filter(|m| m.bracket_type == BracketType::GrandFinals).collect();
        (wb, lb, gf)
    }

    #[test]
    fn four_players_full_structure() {
        let ids = entries(4);
        let matches = generate(Uuid::new_v4(), &ids, &BracketOptions::default());
        let (wb, lb, gf) = split(&matches);
        assert_eq!((wb.len(), lb.len(), gf.len()), (3, 2, 2));

        let (m1, m2, m3) = (wb[0], wb[1], wb[2]);
        let (lm1, lm2) = (lb[0], lb[1]);
        let (gf1, gf2) = (gf[0], gf[1]);

        // First losers match collects the losers of both opening matches.
        assert_eq!(lm1.match_number, 1000);
        assert_eq!(m1.loser_next_match_id, Some(lm1.id));
        assert_eq!(m2.loser_next_match_id, Some(lm1.id));

        // Second losers match: winners-final loser drops onto the
        // first losers match's winner.
        assert_eq!(lm2.match_number, 1001);
        assert_eq!(m3.loser_next_match_id, Some(lm2.id));
        assert_eq!(lm1.next_match_id, Some(lm2.id));

        // Grand finals fed by both bracket finals, with a reset match
        // that re-seats both finalists.
        assert_eq!(gf1.match_number, 2000);
        assert_eq!(m3.next_match_id, Some(gf1.id));
        assert_eq!(lm2.next_match_id, Some(gf1.id));
        assert_eq!(gf2.match_number, 2001);
        assert_eq!(gf1.next_match_id, Some(gf2.id));
        assert_eq!(gf1.loser_next_match_id, Some(gf2.id));
        assert_eq!(gf2.previous_match_ids, vec![gf1.id]);
        assert_eq!(gf2.next_match_id, None);

        assert_unique_match_numbers(&matches);
        assert_acyclic(&matches);
        assert_back_links(&matches);
    }

    #[test]
    fn reset_bracket_can_be_disabled() {
        let matches = generate(
            Uuid::new_v4(),
            &entries(4),
            &BracketOptions { reset_bracket: false },
        );
        let (_, _, gf) = split(&matches);
        assert_eq!(gf.len(), 1);
        assert_eq!(gf[0].next_match_id, None);
        assert_eq!(gf[0].loser_next_match_id, None);
    }

    #[test]
    fn eight_players_standard_counts() {
        let matches = generate(Uuid::new_v4(), &entries(8), &BracketOptions::default());
        let (wb, lb, gf) = split(&matches);
        assert_eq!(wb.len(), 7);
        assert_eq!(lb.len(), 6);
        assert_eq!(gf.len(), 2);

        // Losers numbering is contiguous from the base: pass-throughs
        // never consume a number.
        let numbers: Vec<i32> = lb.iter().map(|m| m.match_number).collect();
        assert_eq!(numbers, vec![1000, 1001, 1002, 1003, 1004, 1005]);

        assert_unique_match_numbers(&matches);
        assert_acyclic(&matches);
        assert_back_links(&matches);
    }

    #[test]
    fn every_winners_match_drops_its_loser_somewhere() {
        for n in 2..=17 {
            let matches = generate(Uuid::new_v4(), &entries(n), &BracketOptions::default());
            for m in &matches {
                if m.bracket_type == BracketType::Winners {
                    assert!(m.loser_next_match_id.is_some(), "n = {n}, match {}", m.match_number);
                }
            }
        }
    }

    #[test]
    fn total_matches_without_reset_is_twice_field_minus_two() {
        // Sum of losses: every participant except the champion loses at
        // least once and at most twice; with no reset the total match
        // count is exactly 2(n-1) minus the byes saved nothing (losses
        // are conserved regardless of byes).
        for n in 2..=17 {
            let matches = generate(
                Uuid::new_v4(),
                &entries(n),
                &BracketOptions { reset_bracket: false },
            );
            assert_eq!(matches.len(), 2 * (n - 1), "n = {n}");
        }
    }

    #[test]
    fn only_grand_finals_lack_forward_links() {
        let matches = generate(Uuid::new_v4(), &entries(12), &BracketOptions::default());
        for m in &matches {
            if m.bracket_type != BracketType::GrandFinals {
                assert!(m.next_match_id.is_some(), "match {} dangling", m.match_number);
            }
        }
    }

    #[test]
    fn two_players_collapse_to_finals_only() {
        let ids = entries(2);
        let matches = generate(Uuid::new_v4(), &ids, &BracketOptions::default());
        let (wb, lb, gf) = split(&matches);
        assert_eq!((wb.len(), lb.len(), gf.len()), (1, 0, 2));
        // The single opening match feeds both grand-finals slots.
        assert_eq!(wb[0].next_match_id, Some(gf[0].id));
        assert_eq!(wb[0].loser_next_match_id, Some(gf[0].id));
        assert_eq!(gf[0].previous_match_ids, vec![wb[0].id]);
    }

    #[test]
    fn losers_round_count_cross_checks_formula_for_powers_of_two() {
        // The iterative construction is authoritative; for power-of-two
        // fields its round count must agree with 2*(R-1).
        for n in [4usize, 8, 16] {
            let matches = generate(Uuid::new_v4(), &entries(n), &BracketOptions::default());
            let wb_rounds = matches
                .iter()
                .filter(|m| m.bracket_type == BracketType::Winners)
                .map(|m| m.round)
                .max()
                .unwrap();
            let lb_rounds = matches
                .iter()
                .filter(|m| m.bracket_type == BracketType::Losers)
                .map(|m| m.round)
                .max()
                .unwrap();
            assert_eq!(lb_rounds, 2 * (wb_rounds - 1), "n = {n}");
        }
    }
}
