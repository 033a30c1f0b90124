//! The trick currently "on the table": its cards, classification, and lock
//! state. Grounded in `original_source/uecda_server/uecda_server/models/game_state.py`
//! (`FieldState`).

use crate::analyzer::{Analysis, PlayType};
use daifugo_cards::Card;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub cards: Vec<Card>,
    pub play_type: PlayType,
    pub count: usize,
    pub base_rank: i32,
    pub suit_pattern: u8,
    pub lock_active: bool,
    /// Consecutive accepted plays (since the field was last (re)established)
    /// sharing an identical suit pattern.
    pub lock_count: u32,
}

impl Default for Field {
    fn default() -> Field {
        Field {
            cards: Vec::new(),
            play_type: PlayType::Empty,
            count: 0,
            base_rank: -1,
            suit_pattern: 0,
            lock_active: false,
            lock_count: 0,
        }
    }
}

impl Field {
    pub fn new() -> Field {
        Field::default()
    }

    pub fn is_empty(&self) -> bool {
        self.play_type == PlayType::Empty
    }

    pub fn clear(&mut self) {
        *self = Field::default();
    }

    /// Installs an accepted play as the new field, updating the lock
    /// counter: first establishment starts the count at 1 (never locked by
    /// itself); a repeat of the same suit pattern advances towards lock;
    /// any other pattern resets the count to 1 and drops the lock. Returns
    /// whether this call is the one that just transitioned `lock_active`
    /// from false to true, so callers can log the transition exactly once.
    pub fn install(&mut self, cards: Vec<Card>, analysis: &Analysis) -> bool {
        let previous_pattern = self.suit_pattern;
        let was_established = !self.is_empty();
        let was_locked = self.lock_active;

        self.cards = cards;
        self.play_type = analysis.play_type;
        self.count = analysis.count;
        self.base_rank = analysis.base_rank;
        self.suit_pattern = analysis.suit_pattern;

        if !was_established {
            self.lock_count = 1;
            self.lock_active = false;
        } else if analysis.suit_pattern == previous_pattern {
            self.lock_count += 1;
            if self.lock_count >= 2 {
                self.lock_active = true;
            }
        } else {
            self.lock_count = 1;
            self.lock_active = false;
        }

        !was_locked && self.lock_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisError;

    fn analysis(play_type: PlayType, base_rank: i32, suit_pattern: u8, count: usize) -> Analysis {
        // Build via CardAnalyzer-shaped literal since fields are public to the crate.
        crate::analyzer::test_support::make(play_type, base_rank, suit_pattern, count, AnalysisError::None)
    }

    #[test]
    fn lock_activates_after_two_matching_suit_patterns() {
        let mut field = Field::new();
        field.install(vec![], &analysis(PlayType::Single, 5, 0b0001, 1));
        assert!(!field.lock_active);
        field.install(vec![], &analysis(PlayType::Single, 7, 0b0001, 1));
        assert!(field.lock_active);
    }

    #[test]
    fn lock_resets_on_differing_suit_pattern() {
        let mut field = Field::new();
        field.install(vec![], &analysis(PlayType::Single, 5, 0b0001, 1));
        field.install(vec![], &analysis(PlayType::Single, 7, 0b0001, 1));
        assert!(field.lock_active);
        field.install(vec![], &analysis(PlayType::Single, 9, 0b0010, 1));
        assert!(!field.lock_active);
        assert_eq!(field.lock_count, 1);
    }

    #[test]
    fn clear_resets_lock_and_base_rank() {
        let mut field = Field::new();
        field.install(vec![], &analysis(PlayType::Single, 5, 0b0001, 1));
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.base_rank, -1);
        assert_eq!(field.count, 0);
        assert!(!field.lock_active);
    }
}
