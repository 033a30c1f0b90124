//! Card, Hand and Deck model.
//!
//! Mirrors `original_source/uecda_server/uecda_server/models/card.py`: a
//! normal card is (suit, rank), the joker has neither. Rank values match the
//! wire protocol's column indices (3=1 .. 2=13) so conversions to/from the
//! table in `daifugo-wire` are a direct cast.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Suit {
    Spade = 0,
    Heart = 1,
    Diamond = 2,
    Club = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Suit> {
        match index {
            0 => Some(Suit::Spade),
            1 => Some(Suit::Heart),
            2 => Some(Suit::Diamond),
            3 => Some(Suit::Club),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Suit::Spade => "S",
            Suit::Heart => "H",
            Suit::Diamond => "D",
            Suit::Club => "C",
        }
    }
}

/// Rank, valued as the wire protocol's column index (3=1 .. 2=13).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rank {
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
    Two = 13,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
    ];

    /// Wire/column-index value, 1..=13.
    #[inline]
    pub fn column(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_column(column: usize) -> Option<Rank> {
        Rank::ALL.get(column.wrapping_sub(1)).copied()
    }

    pub fn code(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
        }
    }
}

/// The synthetic base-rank assigned to the joker for field comparisons.
pub const JOKER_RANK: i32 = 14;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Card {
    Normal(Suit, Rank),
    Joker,
}

impl Card {
    #[inline]
    pub fn is_joker(self) -> bool {
        matches!(self, Card::Joker)
    }

    pub fn suit(self) -> Option<Suit> {
        match self {
            Card::Normal(suit, _) => Some(suit),
            Card::Joker => None,
        }
    }

    pub fn rank(self) -> Option<Rank> {
        match self {
            Card::Normal(_, rank) => Some(rank),
            Card::Joker => None,
        }
    }

    /// Strength for single-card comparison. Higher wins. The joker always
    /// wins in both normal and revolution order.
    pub fn strength(self, revolution: bool) -> i32 {
        match self {
            Card::Joker => JOKER_RANK + 1,
            Card::Normal(_, rank) => {
                let r = rank.column() as i32;
                if revolution {
                    14 - r
                } else {
                    r
                }
            }
        }
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        // Structural order for deterministic set iteration, independent of
        // game-strength (which depends on the revolution flag).
        let key = |c: &Card| match c {
            Card::Normal(suit, rank) => (suit.index() as i32, rank.column() as i32),
            Card::Joker => (4, 0),
        };
        key(self).cmp(&key(other))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Joker => write!(f, "Jo"),
            Card::Normal(suit, rank) => write!(f, "{}{}", suit.code(), rank.code()),
        }
    }
}

/// A set of distinct cards — a player's hand, the field, or a deck.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Hand {
    cards: BTreeSet<Card>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: BTreeSet::new(),
        }
    }

    pub fn from_cards<I: IntoIterator<Item = Card>>(cards: I) -> Hand {
        Hand {
            cards: cards.into_iter().collect(),
        }
    }

    #[inline]
    pub fn insert(&mut self, card: Card) -> bool {
        self.cards.insert(card)
    }

    #[inline]
    pub fn remove(&mut self, card: Card) -> bool {
        self.cards.remove(&card)
    }

    #[inline]
    pub fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn has_joker(&self) -> bool {
        self.cards.contains(&Card::Joker)
    }

    pub fn cards_of_rank(&self, rank: Rank) -> impl Iterator<Item = Card> + '_ {
        self.cards
            .iter()
            .copied()
            .filter(move |c| matches!(c, Card::Normal(_, r) if *r == rank))
    }

    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Card> {
        self.cards.iter().copied().collect()
    }

    /// Cards sorted by strength, weakest first.
    pub fn sorted_by_strength(&self, revolution: bool) -> Vec<Card> {
        let mut cards = self.to_vec();
        cards.sort_by_key(|c| c.strength(revolution));
        cards
    }

    /// Removes and returns the `count` strongest cards.
    pub fn extract_strongest(&mut self, count: usize, revolution: bool) -> Vec<Card> {
        let mut sorted = self.sorted_by_strength(revolution);
        sorted.reverse();
        sorted.truncate(count);
        for card in &sorted {
            self.remove(*card);
        }
        sorted
    }

    /// The `count` weakest cards, without removing them.
    pub fn weakest(&self, count: usize, revolution: bool) -> Vec<Card> {
        let mut sorted = self.sorted_by_strength(revolution);
        sorted.truncate(count);
        sorted
    }
}

impl IntoIterator for Hand {
    type Item = Card;
    type IntoIter = std::collections::btree_set::IntoIter<Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.into_iter()
    }
}

/// Builds the canonical 53-card deck: 52 normal cards plus one joker.
pub fn full_deck() -> Hand {
    let mut hand = Hand::new();
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            hand.insert(Card::Normal(suit, rank));
        }
    }
    hand.insert(Card::Joker);
    hand
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_has_53_distinct_cards() {
        let deck = full_deck();
        assert_eq!(deck.len(), 53);
        assert!(deck.has_joker());
    }

    #[test]
    fn strength_monotonic_normal() {
        let three = Card::Normal(Suit::Spade, Rank::Three);
        let two = Card::Normal(Suit::Spade, Rank::Two);
        assert!(three.strength(false) < two.strength(false));
        assert!(Card::Joker.strength(false) > two.strength(false));
    }

    #[test]
    fn strength_reversed_in_revolution() {
        let three = Card::Normal(Suit::Spade, Rank::Three);
        let two = Card::Normal(Suit::Spade, Rank::Two);
        assert!(three.strength(true) > two.strength(true));
        assert!(Card::Joker.strength(true) > three.strength(true));
    }

    #[test]
    fn extract_strongest_removes_from_hand() {
        let mut hand = full_deck();
        let extracted = hand.extract_strongest(2, false);
        assert_eq!(extracted.len(), 2);
        assert!(extracted.contains(&Card::Joker));
        assert_eq!(hand.len(), 51);
        for card in extracted {
            assert!(!hand.contains(card));
        }
    }

    #[test]
    fn card_display_notation() {
        assert_eq!(Card::Normal(Suit::Spade, Rank::Three).to_string(), "S3");
        assert_eq!(Card::Normal(Suit::Club, Rank::Ten).to_string(), "C10");
        assert_eq!(Card::Joker.to_string(), "Jo");
    }
}
