//! Classifies a submitted card multiset into empty / single / joker-single /
//! group / ladder, per `original_source/uecda_server/uecda_server/game/analyzer.py`
//! (`CardAnalyzer.analyze`, `_analyze_multiple`, `check_special_card`).
//!
//! The wire format this port uses (spec'd in `daifugo-wire`) always
//! addresses a joker substitution by a concrete `(suit, rank)` cell, unlike
//! the original's looser `joker_positions` dict keying. That removes the
//! ambiguous "joker's suit unassigned" case the original's
//! `suit_pattern >= 16` check exists to catch; see DESIGN.md for the
//! reasoning. `InvalidSuit` is kept for taxonomy parity with spec.md and
//! fires on the one inconsistency that can still occur in this addressing
//! scheme: a computed suit bitmap whose bit count doesn't match the card
//! count it was built from.

use daifugo_cards::{Card, Rank, Suit, JOKER_RANK};
use daifugo_wire::SubmittedCards;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayType {
    Empty,
    Single,
    JokerSingle,
    Group,
    Ladder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisError {
    None,
    MultipleJokers,
    InvalidPosition,
    LadderTooShort,
    InvalidSuit,
    CountMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub play_type: PlayType,
    /// -1 when empty; otherwise the column-valued rank used for field
    /// comparison (lowest-in-run for a normal ladder, highest for a
    /// revolution ladder, per spec.md §4.3).
    pub base_rank: i32,
    pub count: usize,
    pub suit_pattern: u8,
    pub error: AnalysisError,
    pub joker_substituted: bool,
    rank_span: Option<(i32, i32)>,
}

impl Analysis {
    pub fn is_valid(&self) -> bool {
        self.error == AnalysisError::None
    }

    pub fn is_pass(&self) -> bool {
        self.play_type == PlayType::Empty
    }

    /// Whether this play includes the given rank: exact match for
    /// single/group/joker-single, span membership for a ladder.
    pub fn contains_rank(&self, rank: Rank) -> bool {
        let column = rank.column() as i32;
        match self.play_type {
            PlayType::Ladder => self
                .rank_span
                .map(|(lo, hi)| lo <= column && column <= hi)
                .unwrap_or(false),
            PlayType::Single | PlayType::Group | PlayType::JokerSingle => self.base_rank == column,
            PlayType::Empty => false,
        }
    }

    fn empty() -> Analysis {
        Analysis {
            play_type: PlayType::Empty,
            base_rank: -1,
            count: 0,
            suit_pattern: 0,
            error: AnalysisError::None,
            joker_substituted: false,
            rank_span: None,
        }
    }

    fn errored(error: AnalysisError, count: usize) -> Analysis {
        Analysis {
            play_type: PlayType::Empty,
            base_rank: -1,
            count,
            suit_pattern: 0,
            error,
            joker_substituted: false,
            rank_span: None,
        }
    }
}

pub struct CardAnalyzer;

impl CardAnalyzer {
    pub fn analyze(submitted: &SubmittedCards, revolution: bool) -> Analysis {
        let joker_count =
            submitted.joker_substitutes.is_some() as usize + submitted.joker_as_self as usize;
        let card_count = submitted.normal_cards.len() + submitted.joker_as_self as usize;

        if card_count == 0 {
            return Analysis::empty();
        }

        if joker_count > 1 {
            return Analysis::errored(AnalysisError::MultipleJokers, card_count);
        }

        if card_count == 1 {
            if submitted.joker_as_self {
                return Analysis {
                    play_type: PlayType::JokerSingle,
                    base_rank: JOKER_RANK,
                    count: 1,
                    suit_pattern: 0,
                    error: AnalysisError::None,
                    joker_substituted: false,
                    rank_span: None,
                };
            }
            let Card::Normal(suit, rank) = submitted.normal_cards[0] else {
                unreachable!("normal_cards only ever holds Card::Normal");
            };
            return Analysis {
                play_type: PlayType::Single,
                base_rank: rank.column() as i32,
                count: 1,
                suit_pattern: 1 << suit.index(),
                error: AnalysisError::None,
                joker_substituted: false,
                rank_span: None,
            };
        }

        Self::analyze_multiple(submitted, revolution)
    }

    fn analyze_multiple(submitted: &SubmittedCards, revolution: bool) -> Analysis {
        if submitted.joker_as_self {
            // The joker is only ever unambiguous alone (joker-single); mixed
            // into a larger play with no substitution cell, its position in
            // the run is undefined.
            return Analysis::errored(
                AnalysisError::InvalidPosition,
                submitted.normal_cards.len() + 1,
            );
        }

        let mut positions: Vec<(Suit, Rank)> = submitted
            .normal_cards
            .iter()
            .map(|c| match c {
                Card::Normal(suit, rank) => (*suit, *rank),
                Card::Joker => unreachable!("normal_cards only ever holds Card::Normal"),
            })
            .collect();
        positions.sort_by_key(|(_, rank)| rank.column());

        let suits: BTreeSet<Suit> = positions.iter().map(|(suit, _)| *suit).collect();
        let ranks: Vec<i32> = positions.iter().map(|(_, rank)| rank.column() as i32).collect();
        let joker_substituted = submitted.joker_substitutes.is_some();

        if suits.len() == 1 {
            let is_sequence = ranks.windows(2).all(|w| w[1] == w[0] + 1);
            if is_sequence {
                let count = ranks.len();
                let suit_bit = 1 << suits.iter().next().unwrap().index();
                let span = (ranks[0], ranks[count - 1]);
                if count < 3 {
                    return Analysis {
                        play_type: PlayType::Ladder,
                        base_rank: ranks[0],
                        count,
                        suit_pattern: suit_bit,
                        error: AnalysisError::LadderTooShort,
                        joker_substituted,
                        rank_span: Some(span),
                    };
                }
                let base_rank = if revolution { ranks[count - 1] } else { ranks[0] };
                return Analysis {
                    play_type: PlayType::Ladder,
                    base_rank,
                    count,
                    suit_pattern: suit_bit,
                    error: AnalysisError::None,
                    joker_substituted,
                    rank_span: Some(span),
                };
            }
        }

        let unique_ranks: BTreeSet<i32> = ranks.iter().copied().collect();
        if unique_ranks.len() == 1 {
            let mut suit_pattern: u8 = 0;
            for (suit, _) in &positions {
                suit_pattern |= 1 << suit.index();
            }
            if (suit_pattern.count_ones() as usize) != positions.len() {
                return Analysis::errored(AnalysisError::InvalidSuit, positions.len());
            }
            return Analysis {
                play_type: PlayType::Group,
                base_rank: ranks[0],
                count: positions.len(),
                suit_pattern,
                error: AnalysisError::None,
                joker_substituted,
                rank_span: Some((ranks[0], ranks[0])),
            };
        }

        Analysis::errored(AnalysisError::CountMismatch, positions.len())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Analysis, AnalysisError, PlayType};

    /// Builds an `Analysis` directly for field/validator unit tests that
    /// don't want to go through a full submitted-cards fixture.
    pub(crate) fn make(
        play_type: PlayType,
        base_rank: i32,
        suit_pattern: u8,
        count: usize,
        error: AnalysisError,
    ) -> Analysis {
        Analysis {
            play_type,
            base_rank,
            count,
            suit_pattern,
            error,
            joker_substituted: false,
            rank_span: if play_type == PlayType::Ladder {
                Some((base_rank, base_rank + count as i32 - 1))
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daifugo_cards::{Card, Suit};

    fn normal(suit: Suit, rank: Rank) -> Card {
        Card::Normal(suit, rank)
    }

    #[test]
    fn empty_submission_is_a_pass() {
        let submitted = SubmittedCards {
            normal_cards: vec![],
            joker_substitutes: None,
            joker_as_self: false,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert!(analysis.is_pass());
        assert!(analysis.is_valid());
    }

    #[test]
    fn single_joker_is_joker_single() {
        let submitted = SubmittedCards {
            normal_cards: vec![],
            joker_substitutes: None,
            joker_as_self: true,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert_eq!(analysis.play_type, PlayType::JokerSingle);
        assert_eq!(analysis.base_rank, JOKER_RANK);
    }

    #[test]
    fn ladder_of_two_is_too_short() {
        let submitted = SubmittedCards {
            normal_cards: vec![
                normal(Suit::Spade, Rank::Three),
                normal(Suit::Spade, Rank::Four),
            ],
            joker_substitutes: None,
            joker_as_self: false,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert_eq!(analysis.play_type, PlayType::Ladder);
        assert_eq!(analysis.error, AnalysisError::LadderTooShort);
    }

    #[test]
    fn ladder_of_five_is_valid_and_base_rank_flips_under_revolution() {
        let cards = vec![
            normal(Suit::Heart, Rank::Three),
            normal(Suit::Heart, Rank::Four),
            normal(Suit::Heart, Rank::Five),
            normal(Suit::Heart, Rank::Six),
            normal(Suit::Heart, Rank::Seven),
        ];
        let submitted = SubmittedCards {
            normal_cards: cards,
            joker_substitutes: None,
            joker_as_self: false,
        };
        let normal_order = CardAnalyzer::analyze(&submitted, false);
        assert!(normal_order.is_valid());
        assert_eq!(normal_order.base_rank, Rank::Three.column() as i32);

        let reversed = CardAnalyzer::analyze(&submitted, true);
        assert_eq!(reversed.base_rank, Rank::Seven.column() as i32);
    }

    #[test]
    fn group_of_four_same_rank() {
        let cards = vec![
            normal(Suit::Spade, Rank::Three),
            normal(Suit::Heart, Rank::Three),
            normal(Suit::Diamond, Rank::Three),
            normal(Suit::Club, Rank::Three),
        ];
        let submitted = SubmittedCards {
            normal_cards: cards,
            joker_substitutes: None,
            joker_as_self: false,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert_eq!(analysis.play_type, PlayType::Group);
        assert_eq!(analysis.count, 4);
        assert_eq!(analysis.suit_pattern, 0b1111);
    }

    #[test]
    fn mismatched_cards_are_count_mismatch() {
        let cards = vec![
            normal(Suit::Spade, Rank::Three),
            normal(Suit::Heart, Rank::Five),
        ];
        let submitted = SubmittedCards {
            normal_cards: cards,
            joker_substitutes: None,
            joker_as_self: false,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert_eq!(analysis.error, AnalysisError::CountMismatch);
    }

    #[test]
    fn joker_as_self_mixed_with_other_cards_is_invalid_position() {
        let submitted = SubmittedCards {
            normal_cards: vec![normal(Suit::Spade, Rank::Three)],
            joker_substitutes: None,
            joker_as_self: true,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert_eq!(analysis.error, AnalysisError::InvalidPosition);
    }

    #[test]
    fn both_joker_markers_set_is_multiple_jokers() {
        let spade_three = normal(Suit::Spade, Rank::Three);
        let submitted = SubmittedCards {
            normal_cards: vec![spade_three],
            joker_substitutes: Some(spade_three),
            joker_as_self: true,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert_eq!(analysis.error, AnalysisError::MultipleJokers);
    }

    #[test]
    fn ladder_contains_rank_checks_span() {
        let cards = vec![
            normal(Suit::Heart, Rank::Five),
            normal(Suit::Heart, Rank::Six),
            normal(Suit::Heart, Rank::Seven),
            normal(Suit::Heart, Rank::Eight),
        ];
        let submitted = SubmittedCards {
            normal_cards: cards,
            joker_substitutes: None,
            joker_as_self: false,
        };
        let analysis = CardAnalyzer::analyze(&submitted, false);
        assert!(analysis.contains_rank(Rank::Eight));
        assert!(!analysis.contains_rank(Rank::Nine));
    }
}
