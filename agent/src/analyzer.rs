//! Hand-analysis scratch tables, ported from
//! `original_source/uecda_client/uecda_client/strategy/analyzer.py`
//! (`make_group_table`, `make_jgroup_table`, `make_kaidan_table`,
//! `make_jkaidan_table`, `low_group`/`high_group`, `low_sequence`/
//! `high_sequence`, `low_solo`/`high_solo`, `n_cards`, `lock_cards`,
//! `remove_group`/`remove_sequence`, `low_cards`/`high_cards`).
//!
//! Every scratch table here is a `daifugo_wire::Table`, reusing its rows
//! 0-3 (suit x rank) as a plain 4x15 grid rather than inventing a parallel
//! representation — the analysis never touches rows 4-7.

use daifugo_cards::{Card, Rank, Suit};
use daifugo_wire::{Table, COLS};

const RANK_LO: usize = 1;
const RANK_HI: usize = 13;

/// Sentinel cell marking "play the joker alone", distinct from a rank cell
/// carrying a joker substitution (value 2 at a real rank column).
const LOW_JOKER_SENTINEL: (usize, usize) = (0, 14);
const HIGH_JOKER_SENTINEL: (usize, usize) = (0, 0);

pub fn make_group_table(my_cards: &Table) -> Table {
    let mut out = Table::new();
    for col in 0..COLS {
        let count = (0..4).filter(|&suit| my_cards.get(suit, col) > 0).count() as i32;
        if count > 1 {
            for suit in 0..4 {
                if my_cards.get(suit, col) > 0 {
                    out.set(suit, col, count);
                }
            }
        }
    }
    out
}

pub fn make_jgroup_table(my_cards: &Table, has_joker: bool) -> Table {
    let mut out = Table::new();
    if !has_joker {
        return out;
    }
    for col in 0..14 {
        let count = (0..4).filter(|&suit| my_cards.get(suit, col) > 0).count() as i32 + 1;
        if count > 1 {
            for suit in 0..4 {
                if my_cards.get(suit, col) > 0 {
                    out.set(suit, col, count);
                }
            }
        }
    }
    out
}

pub fn make_kaidan_table(my_cards: &Table) -> Table {
    let mut out = Table::new();
    for suit in 0..4 {
        let mut count = 0;
        for rank in (RANK_LO..=RANK_HI).rev() {
            if my_cards.get(suit, rank) == 1 {
                count += 1;
            } else {
                count = 0;
            }
            out.set(suit, rank, if count >= 3 { count } else { 0 });
        }
    }
    out
}

pub fn make_jkaidan_table(my_cards: &Table, has_joker: bool) -> Table {
    let mut out = Table::new();
    if !has_joker {
        return out;
    }
    for suit in 0..4 {
        let mut count = 1;
        let mut no_j_count = 0;
        for rank in (0..=RANK_HI).rev() {
            if my_cards.get(suit, rank) == 1 {
                count += 1;
                no_j_count += 1;
            } else {
                count = no_j_count + 1;
                no_j_count = 0;
            }
            out.set(suit, rank, if count > 2 { count } else { 0 });
        }
    }
    out
}

pub fn low_cards(my_cards: &Table, threshold: usize) -> Table {
    let mut out = my_cards.clone();
    for rank in threshold..COLS {
        for suit in 0..4 {
            out.set(suit, rank, 0);
        }
    }
    out
}

pub fn high_cards(my_cards: &Table, threshold: usize) -> Table {
    let mut out = my_cards.clone();
    for rank in 0..=threshold.min(COLS - 1) {
        for suit in 0..4 {
            out.set(suit, rank, 0);
        }
    }
    out
}

/// Extracts cells whose value equals exactly `n`, or `None` if there are
/// none.
pub fn n_cards(target: &Table, n: i32) -> Option<Table> {
    let mut out = Table::new();
    let mut found = false;
    for suit in 0..4 {
        for rank in 0..COLS {
            if target.get(suit, rank) == n {
                out.set(suit, rank, n);
                found = true;
            }
        }
    }
    if found {
        Some(out)
    } else {
        None
    }
}

pub fn lock_cards(target: &mut Table, suit_mask: [bool; 4]) {
    for suit in 0..4 {
        if !suit_mask[suit] {
            for rank in 0..COLS {
                target.set(suit, rank, 0);
            }
        }
    }
}

pub fn low_group(my_cards: &Table, group: &Table, has_joker: bool, lock: Option<[bool; 4]>) -> Table {
    let mut out = Table::new();
    let mut count = 0;
    let mut qty = 0;
    for rank in RANK_LO..=RANK_HI {
        for suit in 0..4 {
            if group.get(suit, rank) > 1 {
                out.set(suit, rank, 1);
                count += 1;
                qty = group.get(suit, rank);
            }
        }
        if count > 0 {
            break;
        }
    }
    if count == 0 {
        return out;
    }
    if has_joker && count < qty {
        if let Some(rank_found) = (RANK_LO..=RANK_HI).find(|&rank| (0..4).any(|s| out.get(s, rank) != 0)) {
            for suit in 0..4 {
                if count >= qty {
                    break;
                }
                if my_cards.get(suit, rank_found) == 0 {
                    let allowed = lock.map_or(true, |mask| mask[suit]);
                    if allowed {
                        out.set(suit, rank_found, 2);
                        count += 1;
                    }
                }
            }
        }
    }
    out
}

pub fn high_group(my_cards: &Table, group: &Table, has_joker: bool, lock: Option<[bool; 4]>) -> Table {
    let mut out = Table::new();
    let mut count = 0;
    let mut qty = 0;
    for rank in (RANK_LO..=RANK_HI).rev() {
        for suit in 0..4 {
            if group.get(suit, rank) > 1 {
                out.set(suit, rank, 1);
                count += 1;
                qty = group.get(suit, rank);
            }
        }
        if count > 0 {
            break;
        }
    }
    if count == 0 {
        return out;
    }
    if has_joker && count < qty {
        if let Some(rank_found) = (RANK_LO..=RANK_HI).rev().find(|&rank| (0..4).any(|s| out.get(s, rank) != 0)) {
            for suit in 0..4 {
                if count >= qty {
                    break;
                }
                if my_cards.get(suit, rank_found) == 0 {
                    let allowed = lock.map_or(true, |mask| mask[suit]);
                    if allowed {
                        out.set(suit, rank_found, 2);
                        count += 1;
                    }
                }
            }
        }
    }
    out
}

pub fn low_sequence(my_cards: &Table, sequence: &Table) -> Table {
    let mut out = Table::new();
    let mut low_value = 0;
    let mut low_line = 0;
    let mut low_column = 0;
    let mut col = 0;
    while col < COLS && low_value == 0 {
        for suit in 0..4 {
            let v = sequence.get(suit, col);
            if v != 0 && v > low_value {
                low_value = v;
                low_line = suit;
                low_column = col;
            }
        }
        if low_value == 0 {
            col += 1;
        }
    }
    if low_value != 0 {
        for i in low_column..(low_column + low_value as usize).min(COLS) {
            if my_cards.get(low_line, i) == 1 {
                out.set(low_line, i, 1);
            } else {
                out.set(low_line, i, 2);
            }
        }
    }
    out
}

/// Finds the run with the highest-ranked top end. The original's column
/// walk indexes one past the table width at its starting offset; this
/// keeps the documented intent (prefer the sequence reaching highest) without
/// reproducing that out-of-bounds walk.
pub fn high_sequence(my_cards: &Table, sequence: &Table) -> Table {
    let mut out = Table::new();
    let mut best: Option<(usize, usize, i32)> = None;
    for suit in 0..4 {
        for rank in (RANK_LO..=RANK_HI).rev() {
            let value = sequence.get(suit, rank);
            if value <= 0 {
                continue;
            }
            let high_end = rank + value as usize - 1;
            let better = match best {
                None => true,
                Some((_, best_rank, best_value)) => {
                    let best_high_end = best_rank + best_value as usize - 1;
                    high_end > best_high_end || (high_end == best_high_end && value > best_value)
                }
            };
            if better {
                best = Some((suit, rank, value));
            }
        }
    }
    if let Some((suit, rank, value)) = best {
        for i in rank..(rank + value as usize).min(COLS) {
            if my_cards.get(suit, i) == 1 {
                out.set(suit, i, 1);
            } else {
                out.set(suit, i, 2);
            }
        }
    }
    out
}

pub fn remove_group(my_cards: &Table, group: &Table) -> Table {
    let mut out = Table::new();
    for rank in 0..COLS {
        for suit in 0..4 {
            if my_cards.get(suit, rank) == 1 && group.get(suit, rank) == 0 {
                out.set(suit, rank, 1);
            }
        }
    }
    out
}

pub fn remove_sequence(my_cards: &Table, sequence: &Table) -> Table {
    let mut out = Table::new();
    for suit in 0..4 {
        let mut rank = 0;
        while rank < COLS {
            let seq_val = sequence.get(suit, rank);
            if my_cards.get(suit, rank) == 1 && seq_val == 0 {
                out.set(suit, rank, 1);
            } else if seq_val > 2 {
                let seq_len = seq_val as usize;
                for k in 0..seq_len {
                    if rank + k < COLS {
                        out.set(suit, rank + k, 0);
                    }
                }
                rank += seq_len - 1;
            }
            rank += 1;
        }
    }
    out
}

pub fn low_solo(my_cards: &Table, use_joker: bool) -> Table {
    let mut out = Table::new();
    let mut found = false;
    'search: for rank in RANK_LO..=RANK_HI {
        for suit in 0..4 {
            if my_cards.get(suit, rank) == 1 {
                out.set(suit, rank, 1);
                found = true;
                break 'search;
            }
        }
    }
    if !found && use_joker {
        out.set(LOW_JOKER_SENTINEL.0, LOW_JOKER_SENTINEL.1, 2);
    }
    out
}

pub fn high_solo(my_cards: &Table, use_joker: bool) -> Table {
    let mut out = Table::new();
    let mut found = false;
    'search: for rank in (RANK_LO..=RANK_HI).rev() {
        for suit in 0..4 {
            if my_cards.get(suit, rank) == 1 {
                out.set(suit, rank, 1);
                found = true;
                break 'search;
            }
        }
    }
    if !found && use_joker {
        out.set(HIGH_JOKER_SENTINEL.0, HIGH_JOKER_SENTINEL.1, 2);
    }
    out
}

/// Converts a scratch table holding a selected play into `(cards,
/// play_joker_alone)`. A cell value of 2 at a real rank column marks a
/// joker substituting for that card; the two sentinel cells mark "the
/// joker by itself, no substitution".
pub fn scratch_to_play(grid: &Table) -> (Vec<Card>, Option<Card>, bool) {
    if grid.get(LOW_JOKER_SENTINEL.0, LOW_JOKER_SENTINEL.1) == 2
        || grid.get(HIGH_JOKER_SENTINEL.0, HIGH_JOKER_SENTINEL.1) == 2
    {
        return (Vec::new(), None, true);
    }
    let mut cards = Vec::new();
    let mut substitute = None;
    for suit in 0..4 {
        for rank in RANK_LO..=RANK_HI {
            let value = grid.get(suit, rank);
            if value == 0 {
                continue;
            }
            let card = Card::Normal(
                Suit::from_index(suit).expect("suit index in range"),
                Rank::from_column(rank).expect("rank column in range"),
            );
            cards.push(card);
            if value == 2 {
                substitute = Some(card);
            }
        }
    }
    (cards, substitute, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use daifugo_wire::Table;

    fn table_with(cells: &[(usize, usize, i32)]) -> Table {
        let mut t = Table::new();
        for &(suit, rank, value) in cells {
            t.set(suit, rank, value);
        }
        t
    }

    #[test]
    fn group_table_flags_pairs_and_above() {
        let hand = table_with(&[(0, 5, 1), (1, 5, 1), (2, 7, 1)]);
        let group = make_group_table(&hand);
        assert_eq!(group.get(0, 5), 2);
        assert_eq!(group.get(1, 5), 2);
        assert_eq!(group.get(2, 7), 0);
    }

    #[test]
    fn kaidan_table_records_runs_of_three_or_more() {
        let hand = table_with(&[(0, 5, 1), (0, 6, 1), (0, 7, 1)]);
        let seq = make_kaidan_table(&hand);
        assert_eq!(seq.get(0, 5), 3);
    }

    #[test]
    fn low_solo_prefers_weakest_real_card_over_joker() {
        let hand = table_with(&[(0, 3, 1), (1, 9, 1)]);
        let solo = low_solo(&hand, true);
        assert_eq!(solo.get(0, 3), 1);
        assert_eq!(solo.get(LOW_JOKER_SENTINEL.0, LOW_JOKER_SENTINEL.1), 0);
    }

    #[test]
    fn low_solo_falls_back_to_joker_sentinel_when_hand_empty() {
        let hand = Table::new();
        let solo = low_solo(&hand, true);
        let (cards, substitute, joker_alone) = scratch_to_play(&solo);
        assert!(cards.is_empty());
        assert_eq!(substitute, None);
        assert!(joker_alone);
    }

    #[test]
    fn scratch_to_play_reports_joker_substitution() {
        let grid = table_with(&[(0, 5, 1), (1, 5, 2)]);
        let (cards, substitute, joker_alone) = scratch_to_play(&grid);
        assert_eq!(cards.len(), 2);
        assert!(!joker_alone);
        assert_eq!(substitute, Some(Card::Normal(Suit::Heart, Rank::Seven)));
    }
}
