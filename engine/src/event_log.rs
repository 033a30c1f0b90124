//! Append-only newline-delimited JSON event log. Grounded in
//! `original_source/uecda_server/uecda_server/logging/game_logger.py`
//! (`GameLogger`) and `formatters.py` (card notation). Opened once,
//! flushed after every record; `Drop` guarantees flush+close on every exit
//! path in place of the original's `with`-scoped context manager.

use daifugo_cards::Card;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, for the session-start record.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Renders a card list as "S3,H3,10,Jo"-style notation: comma-joined,
/// "10" for rank ten, "Jo" for the joker, empty string for a pass.
pub fn format_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Serialize)]
pub struct PlayerSummary {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ExchangeTransfer {
    pub from: u32,
    pub to: u32,
    pub cards: String,
    /// The sender's and receiver's hands immediately after this transfer.
    pub from_hand_after: String,
    pub to_hand_after: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind")]
pub enum EventRecord {
    #[serde(rename = "session_start")]
    SessionStart {
        timestamp: u64,
        players: Vec<PlayerSummary>,
    },
    #[serde(rename = "game_start")]
    GameStart {
        game: u32,
        first_player: u32,
        hands: Vec<String>,
        ranks: Vec<String>,
    },
    #[serde(rename = "exchange")]
    Exchange {
        game: u32,
        transfers: Vec<ExchangeTransfer>,
    },
    #[serde(rename = "turn")]
    Turn {
        game: u32,
        turn: u32,
        player: u32,
        action: String,
        cards: String,
        card_type: String,
        field: String,
        /// Every player's hand immediately after this turn resolves.
        hands: Vec<String>,
        revolution: bool,
        eleven_back: bool,
        lock: bool,
        eight_stop: bool,
    },
    #[serde(rename = "special")]
    Special {
        game: u32,
        turn: u32,
        event: String,
        player: u32,
    },
    #[serde(rename = "game_end")]
    GameEnd {
        game: u32,
        finish_order: Vec<u32>,
        /// Each finisher's resulting class rank, in finish order.
        ranks: Vec<String>,
    },
    #[serde(rename = "session_end")]
    SessionEnd {
        total_games: u32,
        points: Vec<(u32, i32)>,
        ranking: Vec<u32>,
    },
}

pub struct EventLog {
    writer: Option<BufWriter<std::fs::File>>,
}

impl EventLog {
    pub fn open(path: &Path) -> io::Result<EventLog> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(EventLog {
            writer: Some(BufWriter::new(file)),
        })
    }

    /// A no-op log, used when the arbiter is run without `--game-log`.
    pub fn disabled() -> EventLog {
        EventLog { writer: None }
    }

    pub fn record(&mut self, event: &EventRecord) -> io::Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        let line = serde_json::to_string(event).expect("EventRecord always serializes");
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daifugo_cards::{Rank, Suit};

    #[test]
    fn format_cards_matches_reference_notation() {
        let cards = vec![
            Card::Normal(Suit::Spade, Rank::Three),
            Card::Normal(Suit::Club, Rank::Ten),
            Card::Joker,
        ];
        assert_eq!(format_cards(&cards), "S3,C10,Jo");
        assert_eq!(format_cards(&[]), "");
    }

    #[test]
    fn disabled_log_accepts_records_without_error() {
        let mut log = EventLog::disabled();
        log.record(&EventRecord::GameEnd {
            game: 1,
            finish_order: vec![0, 1, 2, 3, 4],
            ranks: vec!["Daifugo", "Fugo", "Heimin", "Hinmin", "Daihinmin"]
                .into_iter()
                .map(String::from)
                .collect(),
        })
        .unwrap();
    }
}
