//! Fixed-width binary wire codec.
//!
//! The wire payload is an 8x15 table of big-endian u32 cells (480 bytes),
//! or a bare big-endian u32 side-channel response. Layout and constants are
//! grounded in `original_source/uecda_client/uecda_client/network/protocol.py`
//! (`TableArray`) and `original_source/uecda_server/uecda_server/network/server.py`.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use daifugo_cards::{Card, Hand, Rank, Suit};
use std::io::Cursor;

pub const ROWS: usize = 8;
pub const COLS: usize = 15;
pub const CELL_COUNT: usize = ROWS * COLS;
pub const FRAME_BYTES: usize = CELL_COUNT * 4;

pub const DEFAULT_PORT: u16 = 42485;
pub const PROTOCOL_VERSION: u32 = 20070;
pub const LEGACY_PROTOCOL_VERSION: u32 = PROTOCOL_VERSION - 10;

pub const RESPONSE_ACCEPT: u32 = 9;
pub const RESPONSE_REJECT: u32 = 8;

pub const GAME_CONTINUE: u32 = 0;
pub const GAME_END: u32 = 1;
pub const ALL_GAMES_END: u32 = 2;

/// Row indices.
pub const ROW_JOKER: usize = 4;
pub const ROW_CONTROL: usize = 5;
pub const ROW_META: usize = 6;

/// Control row columns.
pub const CTRL_PHASE: usize = 0;
pub const CTRL_EXCHANGE_COUNT: usize = 1;
pub const CTRL_IS_TURN: usize = 2;
pub const CTRL_CURRENT_PLAYER: usize = 3;
pub const CTRL_ONSET: usize = 4;
pub const CTRL_ELEVEN_BACK: usize = 5;
pub const CTRL_REVOLUTION: usize = 6;
pub const CTRL_LOCK: usize = 7;

/// Exchange-count wire encoding: negative counts are sent as `100 + |n|`.
pub const EXCHANGE_ENCODING_OFFSET: i32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The 8x15 table, stored as a flat 120-cell buffer per the `SPEC_FULL.md`
/// recommendation to avoid a nested list-of-lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    cells: [i32; CELL_COUNT],
}

impl Default for Table {
    fn default() -> Table {
        Table {
            cells: [0; CELL_COUNT],
        }
    }
}

impl Table {
    pub fn new() -> Table {
        Table::default()
    }

    #[inline]
    fn index(row: usize, col: usize) -> usize {
        assert!(row < ROWS && col < COLS, "table cell out of bounds");
        row * COLS + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> i32 {
        self.cells[Table::index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        self.cells[Table::index(row, col)] = value;
    }

    /// Encodes to the 480-byte big-endian wire frame. Negative cells clamp
    /// to zero, matching the legacy reference's `int_to_bytes`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_BYTES);
        for &cell in &self.cells {
            let clamped = if cell < 0 { 0 } else { cell as u32 };
            buf.write_u32::<BigEndian>(clamped).expect("write to Vec never fails");
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Table, WireError> {
        if bytes.len() != FRAME_BYTES {
            return Err(WireError::ShortRead {
                expected: FRAME_BYTES,
                actual: bytes.len(),
            });
        }
        let mut cursor = Cursor::new(bytes);
        let mut cells = [0i32; CELL_COUNT];
        for cell in cells.iter_mut() {
            *cell = cursor.read_u32::<BigEndian>()? as i32;
        }
        Ok(Table { cells })
    }

    // --- card <-> table rows 0..4 -----------------------------------------

    fn clear_card_rows(&mut self) {
        for row in 0..=ROW_JOKER {
            for col in 0..COLS {
                self.set(row, col, 0);
            }
        }
    }

    /// Places a player's full held hand into rows 0-4. The joker, if held,
    /// is marked at `[4][1] = 2`; it is never placed as a substitute here.
    pub fn set_held_cards(&mut self, hand: &Hand) {
        self.clear_card_rows();
        for card in hand.iter() {
            match card {
                Card::Normal(suit, rank) => self.set(suit.index(), rank.column(), 1),
                Card::Joker => self.set(ROW_JOKER, 1, 2),
            }
        }
    }

    /// Places a submitted play. `joker_substitutes`, if present, names the
    /// normal card whose cell should carry the joker-substitution marker
    /// (value 2) instead of the ordinary "present" marker (value 1).
    pub fn set_submitted_cards(&mut self, cards: &[Card], joker_substitutes: Option<Card>) {
        self.clear_card_rows();
        for &card in cards {
            match card {
                Card::Normal(suit, rank) => {
                    let value = if Some(card) == joker_substitutes { 2 } else { 1 };
                    self.set(suit.index(), rank.column(), value);
                }
                Card::Joker => self.set(ROW_JOKER, 1, 2),
            }
        }
    }

    /// Extracts a held hand: any of value 1 or 2 in rows 0-3 is a held
    /// normal card; `[4][1] == 2` is the held joker itself.
    pub fn get_held_cards(&self) -> Hand {
        let mut hand = Hand::new();
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let value = self.get(suit.index(), rank.column());
                if value == 1 || value == 2 {
                    hand.insert(Card::Normal(suit, rank));
                }
            }
        }
        if self.get(ROW_JOKER, 1) == 2 {
            hand.insert(Card::Joker);
        }
        hand
    }

    /// Extracts a submitted play, separating the joker-substituted card (if
    /// any) from the plain cards, and reporting separately whether row 4
    /// marks the joker as played under its own identity. A well-formed
    /// submission never has both at once; a client that sets both is
    /// flagged by the analyzer as `multiple-jokers`.
    pub fn get_submitted_cards(&self) -> SubmittedCards {
        let mut normal_cards = Vec::new();
        let mut joker_substitutes = None;
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let value = self.get(suit.index(), rank.column());
                if value == 1 {
                    normal_cards.push(Card::Normal(suit, rank));
                } else if value == 2 {
                    let card = Card::Normal(suit, rank);
                    normal_cards.push(card);
                    joker_substitutes = Some(card);
                }
            }
        }
        SubmittedCards {
            normal_cards,
            joker_substitutes,
            joker_as_self: self.get(ROW_JOKER, 1) == 2,
        }
    }

    // --- control row ---------------------------------------------------

    pub fn control(&self) -> ControlRow {
        ControlRow {
            phase: self.get(ROW_CONTROL, CTRL_PHASE),
            exchange_count: self.get(ROW_CONTROL, CTRL_EXCHANGE_COUNT),
            is_turn: self.get(ROW_CONTROL, CTRL_IS_TURN) != 0,
            current_player: self.get(ROW_CONTROL, CTRL_CURRENT_PLAYER),
            onset: self.get(ROW_CONTROL, CTRL_ONSET) != 0,
            eleven_back: self.get(ROW_CONTROL, CTRL_ELEVEN_BACK) != 0,
            revolution: self.get(ROW_CONTROL, CTRL_REVOLUTION) != 0,
            lock: self.get(ROW_CONTROL, CTRL_LOCK) != 0,
        }
    }

    pub fn set_control(&mut self, control: &ControlRow) {
        self.set(ROW_CONTROL, CTRL_PHASE, control.phase);
        self.set(ROW_CONTROL, CTRL_EXCHANGE_COUNT, control.exchange_count);
        self.set(ROW_CONTROL, CTRL_IS_TURN, control.is_turn as i32);
        self.set(ROW_CONTROL, CTRL_CURRENT_PLAYER, control.current_player);
        self.set(ROW_CONTROL, CTRL_ONSET, control.onset as i32);
        self.set(ROW_CONTROL, CTRL_ELEVEN_BACK, control.eleven_back as i32);
        self.set(ROW_CONTROL, CTRL_REVOLUTION, control.revolution as i32);
        self.set(ROW_CONTROL, CTRL_LOCK, control.lock as i32);
    }

    // --- metadata row ----------------------------------------------------

    pub fn set_hand_count(&mut self, seat: usize, count: i32) {
        self.set(ROW_META, seat, count);
    }

    pub fn hand_count(&self, seat: usize) -> i32 {
        self.get(ROW_META, seat)
    }

    pub fn set_class_rank(&mut self, seat: usize, rank: i32) {
        self.set(ROW_META, 5 + seat, rank);
    }

    pub fn class_rank(&self, seat: usize) -> i32 {
        self.get(ROW_META, 5 + seat)
    }

    pub fn set_seat_position(&mut self, seat: usize, position: i32) {
        self.set(ROW_META, 10 + seat, position);
    }

    pub fn seat_position(&self, seat: usize) -> i32 {
        self.get(ROW_META, 10 + seat)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCards {
    /// Cards present in rows 0-3, whether held plainly (value 1) or as a
    /// joker stand-in (value 2).
    pub normal_cards: Vec<Card>,
    /// The card, if any, whose cell carries the joker-substitution marker.
    pub joker_substitutes: Option<Card>,
    /// Whether row 4 col 1 marks the joker as played under its own identity.
    pub joker_as_self: bool,
}

impl SubmittedCards {
    /// The full set of cards visibly present in the submission, joker
    /// included, for display/logging purposes.
    pub fn display_cards(&self) -> Vec<Card> {
        let mut cards = self.normal_cards.clone();
        if self.joker_as_self {
            cards.push(Card::Joker);
        }
        cards
    }
}

/// Decoded view of row 5, the per-recipient control fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlRow {
    pub phase: i32,
    pub exchange_count: i32,
    pub is_turn: bool,
    pub current_player: i32,
    pub onset: bool,
    pub eleven_back: bool,
    pub revolution: bool,
    pub lock: bool,
}

/// Encodes an exchange count (+2..-2) per the wire's non-negative
/// convention: negative counts are sent as `100 + |n|`.
pub fn encode_exchange_count(count: i32) -> i32 {
    if count < 0 {
        EXCHANGE_ENCODING_OFFSET + (-count)
    } else {
        count
    }
}

/// Inverse of [`encode_exchange_count`].
pub fn decode_exchange_count(wire_value: i32) -> i32 {
    if wire_value > EXCHANGE_ENCODING_OFFSET {
        -(wire_value - EXCHANGE_ENCODING_OFFSET)
    } else {
        wire_value
    }
}

/// Encodes a bare u32 side-channel response (accept/reject/game-state
/// codes, handshake player id). Negative values clamp to zero.
pub fn encode_u32(value: i32) -> [u8; 4] {
    let clamped = if value < 0 { 0 } else { value as u32 };
    let mut buf = [0u8; 4];
    {
        let mut cursor = Cursor::new(&mut buf[..]);
        cursor
            .write_u32::<BigEndian>(clamped)
            .expect("write to fixed buffer never fails");
    }
    buf
}

pub fn decode_u32(bytes: &[u8]) -> Result<u32, WireError> {
    if bytes.len() != 4 {
        return Err(WireError::ShortRead {
            expected: 4,
            actual: bytes.len(),
        });
    }
    let mut cursor = Cursor::new(bytes);
    Ok(cursor.read_u32::<BigEndian>()?)
}
