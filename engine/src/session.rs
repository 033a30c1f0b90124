//! Session-wide game state and configurable rule flags. Grounded in
//! `original_source/uecda_server/uecda_server/models/game_state.py`
//! (`GameState`) and `config.py` (`RulesConfig`).

use daifugo_rules::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleFlags {
    pub revolution: bool,
    pub eight_stop: bool,
    pub lock: bool,
    pub card_exchange: bool,
    pub spade3_joker: bool,
    pub sennichite: bool,
    pub eleven_back: bool,
}

impl Default for RuleFlags {
    fn default() -> RuleFlags {
        RuleFlags {
            revolution: true,
            eight_stop: true,
            lock: true,
            card_exchange: true,
            spade3_joker: true,
            sennichite: true,
            eleven_back: false,
        }
    }
}

pub const SENNICHITE_THRESHOLD: u32 = 20;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub game_number: u32,
    pub turn_number: u32,
    pub current_player: u32,
    pub last_player: Option<u32>,
    pub is_revolution: bool,
    pub is_eleven_back: bool,
    pub is_joker_single: bool,
    pub consecutive_passes: u32,
    pub finished_count: u32,
    pub field: Field,
}

impl Default for SessionState {
    fn default() -> SessionState {
        SessionState {
            game_number: 0,
            turn_number: 0,
            current_player: 0,
            last_player: None,
            is_revolution: false,
            is_eleven_back: false,
            is_joker_single: false,
            consecutive_passes: 0,
            finished_count: 0,
            field: Field::new(),
        }
    }
}

impl SessionState {
    pub fn effective_revolution(&self) -> bool {
        self.is_revolution != self.is_eleven_back
    }

    /// Clears per-round state: the field, consecutive passes, joker-single,
    /// and eleven-back (since 11-back dies when the field flows).
    pub fn reset_for_new_round(&mut self) {
        self.field.clear();
        self.consecutive_passes = 0;
        self.is_joker_single = false;
        self.is_eleven_back = false;
    }

    /// Clears everything except the game number, for a new game.
    pub fn reset_for_new_game(&mut self) {
        let game_number = self.game_number;
        *self = SessionState::default();
        self.game_number = game_number;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_revolution_is_xor() {
        let mut state = SessionState::default();
        assert!(!state.effective_revolution());
        state.is_revolution = true;
        assert!(state.effective_revolution());
        state.is_eleven_back = true;
        assert!(!state.effective_revolution());
    }

    #[test]
    fn reset_for_new_round_clears_joker_single_and_eleven_back() {
        let mut state = SessionState::default();
        state.is_joker_single = true;
        state.is_eleven_back = true;
        state.reset_for_new_round();
        assert!(!state.is_joker_single);
        assert!(!state.is_eleven_back);
    }

    #[test]
    fn reset_for_new_game_preserves_game_number() {
        let mut state = SessionState::default();
        state.game_number = 3;
        state.turn_number = 12;
        state.reset_for_new_game();
        assert_eq!(state.game_number, 3);
        assert_eq!(state.turn_number, 0);
    }
}
