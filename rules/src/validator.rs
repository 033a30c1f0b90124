//! Decides accept/reject for a submitted play against the current field,
//! the player's hand, and active rule flags. Grounded in
//! `original_source/uecda_server/uecda_server/game/validator.py`
//! (`MoveValidator.validate`, `_check_hand_contains`, `_compare_with_field`).

use crate::analyzer::{Analysis, AnalysisError, PlayType};
use crate::field::Field;
use daifugo_cards::{Card, Hand, Rank, Suit};
use daifugo_wire::SubmittedCards;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    AcceptAsPlay,
    AcceptAsPass,
    Reject,
}

pub struct MoveValidator;

impl MoveValidator {
    /// `effective_revolution` is `is_revolution XOR is_eleven_back`.
    /// `field_was_joker_single` is the outgoing field's `is_joker_single`
    /// flag, needed for the Spade-3 override (spec.md §4.4 step 6).
    pub fn validate(
        analysis: &Analysis,
        submitted: &SubmittedCards,
        hand: &Hand,
        field: &Field,
        effective_revolution: bool,
        field_was_joker_single: bool,
    ) -> Decision {
        if analysis.play_type == PlayType::Empty && analysis.error == AnalysisError::None {
            return Decision::AcceptAsPass;
        }

        // A ladder-too-short play is still routed through this check rather
        // than short-circuited earlier, matching spec.md §4.4 step 2's
        // phrasing ("analyzer error other than ladder-too-short"), but it
        // always ends up rejected regardless of the steps that follow.
        if analysis.error != AnalysisError::None {
            return Decision::Reject;
        }

        if !Self::hand_contains(submitted, hand) {
            return Decision::Reject;
        }

        if field.is_empty() {
            return Decision::AcceptAsPlay;
        }

        let is_spade_three_single = analysis.play_type == PlayType::Single
            && submitted.normal_cards == vec![Card::Normal(Suit::Spade, Rank::Three)];

        if field_was_joker_single {
            if is_spade_three_single {
                return Decision::AcceptAsPlay;
            }
            if analysis.play_type != PlayType::JokerSingle {
                return Decision::Reject;
            }
        }

        if analysis.play_type == PlayType::JokerSingle {
            return if field.play_type == PlayType::Single {
                Decision::AcceptAsPlay
            } else {
                Decision::Reject
            };
        }

        if analysis.count != field.count || analysis.play_type != field.play_type {
            return Decision::Reject;
        }

        if field.lock_active && analysis.suit_pattern != field.suit_pattern {
            return Decision::Reject;
        }

        let beats = if effective_revolution {
            analysis.base_rank < field.base_rank
        } else {
            analysis.base_rank > field.base_rank
        };
        if !beats {
            return Decision::Reject;
        }

        Decision::AcceptAsPlay
    }

    /// Every non-substituted card in the submission must be in the hand;
    /// if a substitution is present, the hand must hold the joker.
    fn hand_contains(submitted: &SubmittedCards, hand: &Hand) -> bool {
        for &card in &submitted.normal_cards {
            if Some(card) == submitted.joker_substitutes {
                continue;
            }
            if !hand.contains(card) {
                return false;
            }
        }
        if submitted.joker_substitutes.is_some() || submitted.joker_as_self {
            if !hand.has_joker() {
                return false;
            }
        }
        true
    }
}

pub fn validate_exchange(cards: &[Card], count: usize, hand: &Hand) -> bool {
    cards.len() == count && cards.iter().all(|&c| hand.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::test_support::make;
    use daifugo_cards::full_deck;

    fn submitted(cards: Vec<Card>) -> SubmittedCards {
        SubmittedCards {
            normal_cards: cards,
            joker_substitutes: None,
            joker_as_self: false,
        }
    }

    #[test]
    fn pass_is_accepted_as_pass() {
        let analysis = make(PlayType::Empty, -1, 0, 0, AnalysisError::None);
        let decision = MoveValidator::validate(
            &analysis,
            &submitted(vec![]),
            &Hand::new(),
            &Field::new(),
            false,
            false,
        );
        assert_eq!(decision, Decision::AcceptAsPass);
    }

    #[test]
    fn leading_on_an_empty_field_is_always_accepted() {
        let card = Card::Normal(Suit::Spade, Rank::Five);
        let hand = Hand::from_cards(vec![card]);
        let analysis = make(PlayType::Single, Rank::Five.column() as i32, 0b0001, 1, AnalysisError::None);
        let decision = MoveValidator::validate(
            &analysis,
            &submitted(vec![card]),
            &hand,
            &Field::new(),
            false,
            false,
        );
        assert_eq!(decision, Decision::AcceptAsPlay);
    }

    #[test]
    fn must_strictly_beat_field_rank() {
        let card = Card::Normal(Suit::Heart, Rank::Five);
        let hand = Hand::from_cards(vec![card]);
        let mut field = Field::new();
        field.install(
            vec![Card::Normal(Suit::Spade, Rank::Five)],
            &make(PlayType::Single, Rank::Five.column() as i32, 0b0001, 1, AnalysisError::None),
        );
        let analysis = make(PlayType::Single, Rank::Five.column() as i32, 0b0010, 1, AnalysisError::None);
        let decision = MoveValidator::validate(&analysis, &submitted(vec![card]), &hand, &field, false, false);
        assert_eq!(decision, Decision::Reject, "equal rank must not beat");
    }

    #[test]
    fn lock_restricts_suit_pattern() {
        let card = Card::Normal(Suit::Heart, Rank::Nine);
        let hand = Hand::from_cards(vec![card]);
        let mut field = Field::new();
        field.lock_active = true;
        field.play_type = PlayType::Single;
        field.count = 1;
        field.base_rank = Rank::Seven.column() as i32;
        field.suit_pattern = 0b0001;
        let analysis = make(PlayType::Single, Rank::Nine.column() as i32, 0b0010, 1, AnalysisError::None);
        let decision = MoveValidator::validate(&analysis, &submitted(vec![card]), &hand, &field, false, false);
        assert_eq!(decision, Decision::Reject);
    }

    #[test]
    fn joker_single_legal_only_against_a_field_single() {
        let analysis = make(PlayType::JokerSingle, daifugo_cards::JOKER_RANK, 0, 1, AnalysisError::None);
        let mut hand = Hand::new();
        hand.insert(Card::Joker);
        let mut field = Field::new();
        field.play_type = PlayType::Group;
        field.count = 4;
        let submitted_cards = SubmittedCards {
            normal_cards: vec![],
            joker_substitutes: None,
            joker_as_self: true,
        };
        let decision = MoveValidator::validate(&analysis, &submitted_cards, &hand, &field, false, false);
        assert_eq!(decision, Decision::Reject, "joker-single only legal on a single");
    }

    #[test]
    fn spade_three_beats_an_outstanding_joker_single() {
        let spade_three = Card::Normal(Suit::Spade, Rank::Three);
        let hand = Hand::from_cards(vec![spade_three]);
        let mut field = Field::new();
        field.play_type = PlayType::JokerSingle;
        field.count = 1;
        field.base_rank = daifugo_cards::JOKER_RANK;
        let analysis = make(PlayType::Single, Rank::Three.column() as i32, 0b0001, 1, AnalysisError::None);
        let decision = MoveValidator::validate(
            &analysis,
            &submitted(vec![spade_three]),
            &hand,
            &field,
            false,
            true,
        );
        assert_eq!(decision, Decision::AcceptAsPlay);
    }

    #[test]
    fn hand_not_containing_submitted_card_is_rejected() {
        let card = Card::Normal(Suit::Heart, Rank::Five);
        let other = Card::Normal(Suit::Heart, Rank::Six);
        let hand = Hand::from_cards(vec![other]);
        let analysis = make(PlayType::Single, Rank::Five.column() as i32, 0b0010, 1, AnalysisError::None);
        let decision = MoveValidator::validate(&analysis, &submitted(vec![card]), &hand, &Field::new(), false, false);
        assert_eq!(decision, Decision::Reject);
    }

    #[test]
    fn exchange_validation_rejects_wrong_count() {
        let deck = full_deck();
        let cards: Vec<Card> = deck.to_vec().into_iter().take(3).collect();
        assert!(!validate_exchange(&cards, 2, &deck));
    }
}
