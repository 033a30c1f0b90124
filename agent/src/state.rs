//! Parses the two tables the arbiter sends each broadcast tick into the
//! state a [`crate::strategy::Strategy`] needs to choose a move. Grounded in
//! `original_source/uecda_client/uecda_client/game/state.py` (`GameState`,
//! `GameState.from_table`, `_parse_field`).

use daifugo_wire::Table;

/// Everything a strategy needs about the field and the rules in effect,
/// derived from the arbiter's per-recipient hand/control table plus the
/// most recently broadcast field table.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    /// Base rank of the field's cards, 0 if onset. The joker played alone
    /// reports 14, matching the reference's synthetic "joker is highest".
    pub field_rank: usize,
    pub is_sequence: bool,
    pub field_qty: usize,
    pub revolution: bool,
    pub eleven_back: bool,
    pub lock: bool,
    pub onset: bool,
    pub locked_suits: [bool; 4],
    pub has_joker: bool,
}

impl GameState {
    pub fn from_tables(hand_table: &Table, field_table: &Table) -> GameState {
        let control = hand_table.control();
        let mut state = GameState {
            onset: control.onset,
            eleven_back: control.eleven_back,
            revolution: control.revolution,
            lock: control.lock,
            has_joker: hand_table.get(daifugo_wire::ROW_JOKER, 1) == 2,
            ..GameState::default()
        };
        state.parse_field(field_table);
        state
    }

    fn parse_field(&mut self, field_table: &Table) {
        let mut card_count = 0usize;
        let mut ranks_found = Vec::new();
        for suit in 0..4 {
            for rank in 1..=13 {
                if field_table.get(suit, rank) >= 1 {
                    card_count += 1;
                    if !ranks_found.contains(&rank) {
                        ranks_found.push(rank);
                    }
                    self.locked_suits[suit] = true;
                }
            }
        }
        if field_table.get(daifugo_wire::ROW_JOKER, 1) == 2 {
            card_count += 1;
        }
        self.field_qty = card_count;

        if card_count == 0 {
            self.onset = true;
            self.field_rank = 0;
            return;
        }

        ranks_found.sort_unstable();
        if ranks_found.len() >= 2 {
            let consecutive = ranks_found.windows(2).all(|pair| pair[1] - pair[0] == 1);
            if consecutive && card_count == ranks_found.len() {
                self.is_sequence = true;
                self.field_rank = *ranks_found.last().expect("non-empty");
            } else {
                self.is_sequence = false;
                self.field_rank = ranks_found[0];
            }
        } else if ranks_found.len() == 1 {
            self.is_sequence = false;
            self.field_rank = ranks_found[0];
        } else {
            // Only the joker was played, alone.
            self.is_sequence = false;
            self.field_rank = 14;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onset_with_no_field_cards() {
        let hand_table = Table::new();
        let field_table = Table::new();
        let state = GameState::from_tables(&hand_table, &field_table);
        assert!(state.onset);
        assert_eq!(state.field_qty, 0);
        assert_eq!(state.field_rank, 0);
    }

    #[test]
    fn detects_sequence_on_field() {
        let hand_table = Table::new();
        let mut field_table = Table::new();
        field_table.set(0, 5, 1);
        field_table.set(0, 6, 1);
        field_table.set(0, 7, 1);
        let state = GameState::from_tables(&hand_table, &field_table);
        assert!(state.is_sequence);
        assert_eq!(state.field_qty, 3);
        assert_eq!(state.field_rank, 7);
    }

    #[test]
    fn detects_group_on_field() {
        let hand_table = Table::new();
        let mut field_table = Table::new();
        field_table.set(0, 5, 1);
        field_table.set(1, 5, 1);
        let state = GameState::from_tables(&hand_table, &field_table);
        assert!(!state.is_sequence);
        assert_eq!(state.field_rank, 5);
    }
}
