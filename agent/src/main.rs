//! Thin reference client: connects to a `daifugo-arbiter`, plays the
//! handshake, and drives [`daifugo_agent::SimpleStrategy`] off the tables
//! the arbiter broadcasts each turn.

mod logging;

use clap::Parser;
use daifugo_agent::{GameState, SimpleStrategy, Strategy};
use daifugo_net::Connection;
use daifugo_wire::{
    decode_exchange_count, Table, ALL_GAMES_END, GAME_END, RESPONSE_ACCEPT,
};
use slog::{debug, info, warn};
use std::net::TcpStream;
use std::process::exit;

#[derive(Parser, Debug)]
#[command(name = "daifugo-agent", version, about = "Reference Daifugō client")]
struct Cli {
    /// Arbiter host to connect to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Arbiter port to connect to
    #[arg(long, default_value_t = daifugo_wire::DEFAULT_PORT)]
    port: u16,
    /// Display name sent during the handshake (truncated to 14 bytes)
    #[arg(long, default_value = "SimpleAgent")]
    name: String,
    /// Enable debug-level logging
    #[arg(long)]
    verbose: bool,
}

struct Profile {
    protocol_version: u32,
    name: String,
}

impl Profile {
    fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set(0, 0, self.protocol_version as i32);
        for (col, byte) in self.name.bytes().take(14).enumerate() {
            table.set(1, col, byte as i32);
        }
        table
    }
}

fn main() {
    let cli = Cli::parse();
    let logger = logging::init(if cli.verbose { "debug" } else { "info" });
    let strategy = SimpleStrategy;

    let addr = format!("{}:{}", cli.host, cli.port);
    let stream = match TcpStream::connect(&addr) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("failed to connect to {}: {}", addr, e);
            exit(1);
        }
    };
    let mut connection = Connection::new(stream);

    let profile = Profile {
        protocol_version: daifugo_wire::PROTOCOL_VERSION,
        name: cli.name.clone(),
    };
    if let Err(e) = connection.write_table(&profile.to_table()) {
        eprintln!("handshake failed: {}", e);
        exit(1);
    }
    let player_id = match connection.read_u32() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("handshake failed reading player id: {}", e);
            exit(1);
        }
    };
    info!(logger, "connected"; "player" => player_id, "addr" => &addr);

    let mut field_table = Table::new();

    'games: loop {
        let initial_hand = match connection.read_table() {
            Ok(table) => table,
            Err(e) => {
                warn!(logger, "connection closed before next game"; "error" => %e);
                break;
            }
        };
        field_table = Table::new();

        let control = initial_hand.control();
        let exchange_count = decode_exchange_count(control.exchange_count);
        if exchange_count > 0 {
            let hand = initial_hand.clone();
            let selection = strategy.select_exchange(&hand, exchange_count as usize);
            if let Err(e) = connection.write_table(&selection) {
                warn!(logger, "failed to submit exchange"; "error" => %e);
                break;
            }
        }

        loop {
            let hand_table = match connection.read_table() {
                Ok(table) => table,
                Err(e) => {
                    warn!(logger, "connection closed mid-game"; "error" => %e);
                    break 'games;
                }
            };
            let control = hand_table.control();

            if control.is_turn {
                let state = GameState::from_tables(&hand_table, &field_table);
                let play = strategy.select_play(&hand_table, &state);
                if let Err(e) = connection.write_table(&play) {
                    warn!(logger, "failed to submit move"; "error" => %e);
                    break 'games;
                }
                match connection.read_u32() {
                    Ok(response) => {
                        debug!(logger, "move response"; "accepted" => response == RESPONSE_ACCEPT);
                    }
                    Err(e) => {
                        warn!(logger, "failed to read move response"; "error" => %e);
                        break 'games;
                    }
                }
            }

            field_table = match connection.read_table() {
                Ok(table) => table,
                Err(e) => {
                    warn!(logger, "connection closed awaiting field broadcast"; "error" => %e);
                    break 'games;
                }
            };

            let game_state_code = match connection.read_u32() {
                Ok(code) => code,
                Err(e) => {
                    warn!(logger, "connection closed awaiting game-state code"; "error" => %e);
                    break 'games;
                }
            };

            if game_state_code == ALL_GAMES_END {
                info!(logger, "session complete");
                break 'games;
            }
            if game_state_code == GAME_END {
                break;
            }
        }
    }

    exit(0);
}
