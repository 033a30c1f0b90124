//! The reference heuristic, ported from
//! `original_source/uecda_client/uecda_client/strategy/{base,simple}.py`
//! (`Strategy`, `SimpleStrategy`). Operates on `daifugo_wire::Table` scratch
//! grids throughout, per spec.md §4.6.

use crate::analyzer::{
    high_cards, high_group, high_sequence, high_solo, low_cards, low_group, low_sequence, low_solo,
    make_group_table, make_jgroup_table, make_jkaidan_table, make_kaidan_table, n_cards, lock_cards,
    remove_group, remove_sequence,
};
use crate::state::GameState;
use daifugo_wire::Table;

pub trait Strategy {
    /// Cards to play when leading (the field is empty).
    fn select_lead(&self, hand: &Table, state: &GameState) -> Table;
    /// Cards to play in response to a nonempty field; an empty table is a
    /// pass.
    fn select_follow(&self, hand: &Table, state: &GameState) -> Table;
    /// Cards to hand over during the pre-game exchange.
    fn select_exchange(&self, hand: &Table, num_cards: usize) -> Table;

    fn select_play(&self, hand: &Table, state: &GameState) -> Table {
        if state.onset {
            self.select_lead(hand, state)
        } else {
            self.select_follow(hand, state)
        }
    }
}

/// Prioritizes playing more cards at once (sequences, then groups, then
/// singles); weakest valid combination when leading or matching rank
/// normally, strongest when revolution is active.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleStrategy;

impl SimpleStrategy {
    fn lock_mask(state: &GameState) -> Option<[bool; 4]> {
        if state.lock {
            Some(state.locked_suits)
        } else {
            None
        }
    }

    fn lead_normal(&self, hand: &Table, state: &GameState) -> Table {
        let (group, sequence) = if state.has_joker {
            (make_jgroup_table(hand, true), make_jkaidan_table(hand, true))
        } else {
            (make_group_table(hand), make_kaidan_table(hand))
        };

        for n in (3..=15).rev() {
            if let Some(run) = n_cards(&sequence, n) {
                return low_sequence(hand, &run);
            }
        }
        for n in (2..=5).rev() {
            if let Some(set) = n_cards(&group, n) {
                return low_group(hand, &set, state.has_joker, None);
            }
        }
        low_solo(hand, state.has_joker)
    }

    fn lead_rev(&self, hand: &Table, state: &GameState) -> Table {
        let (group, sequence) = if state.has_joker {
            (make_jgroup_table(hand, true), make_jkaidan_table(hand, true))
        } else {
            (make_group_table(hand), make_kaidan_table(hand))
        };

        for n in (3..=15).rev() {
            if let Some(run) = n_cards(&sequence, n) {
                return high_sequence(hand, &run);
            }
        }
        for n in (2..=5).rev() {
            if let Some(set) = n_cards(&group, n) {
                return high_group(hand, &set, state.has_joker, None);
            }
        }
        high_solo(hand, state.has_joker)
    }

    fn follow_solo(&self, hand: &Table, state: &GameState) -> Table {
        let group = make_group_table(hand);
        let sequence = make_kaidan_table(hand);
        let loose = remove_group(&remove_sequence(hand, &sequence), &group);
        let mut stronger = high_cards(&loose, state.field_rank);
        if let Some(mask) = Self::lock_mask(state) {
            lock_cards(&mut stronger, mask);
        }
        low_solo(&stronger, state.has_joker)
    }

    fn follow_solo_rev(&self, hand: &Table, state: &GameState) -> Table {
        let group = make_group_table(hand);
        let sequence = make_kaidan_table(hand);
        let loose = remove_group(&remove_sequence(hand, &sequence), &group);
        let mut weaker = low_cards(&loose, state.field_rank);
        if let Some(mask) = Self::lock_mask(state) {
            lock_cards(&mut weaker, mask);
        }
        high_solo(&weaker, state.has_joker)
    }

    fn matching_group(&self, temp: &Table, qty: i32, has_joker: bool) -> Table {
        let group = make_group_table(temp);
        if let Some(ngroup) = n_cards(&group, qty) {
            return ngroup;
        }
        if has_joker {
            let jgroup = make_jgroup_table(temp, true);
            if let Some(ngroup) = n_cards(&jgroup, qty) {
                return ngroup;
            }
        }
        Table::new()
    }

    fn matching_sequence(&self, temp: &Table, qty: i32, has_joker: bool) -> Table {
        let sequence = make_kaidan_table(temp);
        if let Some(nseq) = n_cards(&sequence, qty) {
            return nseq;
        }
        if has_joker {
            let jsequence = make_jkaidan_table(temp, true);
            if let Some(nseq) = n_cards(&jsequence, qty) {
                return nseq;
            }
        }
        Table::new()
    }

    fn follow_group(&self, hand: &Table, state: &GameState) -> Table {
        let mut temp = high_cards(hand, state.field_rank);
        if let Some(mask) = Self::lock_mask(state) {
            lock_cards(&mut temp, mask);
        }
        let ngroup = self.matching_group(&temp, state.field_qty as i32, state.has_joker);
        low_group(hand, &ngroup, state.has_joker, Self::lock_mask(state))
    }

    fn follow_group_rev(&self, hand: &Table, state: &GameState) -> Table {
        let mut temp = low_cards(hand, state.field_rank);
        if let Some(mask) = Self::lock_mask(state) {
            lock_cards(&mut temp, mask);
        }
        let ngroup = self.matching_group(&temp, state.field_qty as i32, state.has_joker);
        high_group(hand, &ngroup, state.has_joker, Self::lock_mask(state))
    }

    fn follow_sequence(&self, hand: &Table, state: &GameState) -> Table {
        let mut temp = high_cards(hand, state.field_rank);
        if let Some(mask) = Self::lock_mask(state) {
            lock_cards(&mut temp, mask);
        }
        let nseq = self.matching_sequence(&temp, state.field_qty as i32, state.has_joker);
        low_sequence(hand, &nseq)
    }

    fn follow_sequence_rev(&self, hand: &Table, state: &GameState) -> Table {
        let mut temp = low_cards(hand, state.field_rank);
        if let Some(mask) = Self::lock_mask(state) {
            lock_cards(&mut temp, mask);
        }
        let nseq = self.matching_sequence(&temp, state.field_qty as i32, state.has_joker);
        high_sequence(hand, &nseq)
    }
}

impl Strategy for SimpleStrategy {
    fn select_lead(&self, hand: &Table, state: &GameState) -> Table {
        if state.revolution {
            self.lead_rev(hand, state)
        } else {
            self.lead_normal(hand, state)
        }
    }

    fn select_follow(&self, hand: &Table, state: &GameState) -> Table {
        if state.field_qty == 1 {
            if state.revolution {
                self.follow_solo_rev(hand, state)
            } else {
                self.follow_solo(hand, state)
            }
        } else if state.is_sequence {
            if state.revolution {
                self.follow_sequence_rev(hand, state)
            } else {
                self.follow_sequence(hand, state)
            }
        } else if state.revolution {
            self.follow_group_rev(hand, state)
        } else {
            self.follow_group(hand, state)
        }
    }

    fn select_exchange(&self, hand: &Table, num_cards: usize) -> Table {
        let mut out = Table::new();
        let mut remaining = hand.clone();
        for _ in 0..num_cards {
            let one = low_solo(&remaining, false);
            for suit in 0..4 {
                for rank in 0..daifugo_wire::COLS {
                    let value = one.get(suit, rank);
                    if value != 0 {
                        out.set(suit, rank, value);
                        remaining.set(suit, rank, 0);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::scratch_to_play;

    fn hand_with(cells: &[(usize, usize)]) -> Table {
        let mut t = Table::new();
        for &(suit, rank) in cells {
            t.set(suit, rank, 1);
        }
        t
    }

    #[test]
    fn leads_with_lowest_single_when_no_combo() {
        let hand = hand_with(&[(0, 3), (1, 9)]);
        let state = GameState {
            onset: true,
            ..GameState::default()
        };
        let play = SimpleStrategy.select_play(&hand, &state);
        let (cards, _, _) = scratch_to_play(&play);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0], daifugo_cards::Card::Normal(daifugo_cards::Suit::Spade, daifugo_cards::Rank::Three));
    }

    #[test]
    fn passes_when_no_valid_follow_exists() {
        let hand = hand_with(&[(0, 3)]);
        let state = GameState {
            onset: false,
            field_rank: 13,
            field_qty: 1,
            ..GameState::default()
        };
        let play = SimpleStrategy.select_follow(&hand, &state);
        let (cards, _, joker_alone) = scratch_to_play(&play);
        assert!(cards.is_empty());
        assert!(!joker_alone);
    }

    #[test]
    fn exchange_gives_away_weakest_cards() {
        let hand = hand_with(&[(0, 1), (1, 2), (2, 13)]);
        let selection = SimpleStrategy.select_exchange(&hand, 2);
        let (cards, _, _) = scratch_to_play(&selection);
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| *c != daifugo_cards::Card::Normal(daifugo_cards::Suit::Diamond, daifugo_cards::Rank::Two)));
    }
}
