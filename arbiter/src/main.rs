//! `daifugo-arbiter`: the networked five-seat Daifugo arbiter binary.
//! Plays the role of the teacher's `gamerunner`: CLI parsing, config
//! loading, logging bootstrap, then handing off to `daifugo-engine`.

mod config;
mod logging;

use clap::Parser;
use config::ArbiterConfig;
use daifugo_engine::{Engine, EventLog, Player};
use daifugo_net::Listener;
use slog::{error, info};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;

const NUM_PLAYERS: u32 = 5;

/// Networked five-seat Daifugo arbiter.
#[derive(Parser, Debug)]
#[command(name = "daifugo-arbiter", version, about)]
struct Cli {
    /// TCP port to bind (overrides config file and default 42485)
    #[arg(long)]
    port: Option<u16>,
    /// Number of games to play this session (overrides config file)
    #[arg(long)]
    num_games: Option<u32>,
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable debug-level logging
    #[arg(long)]
    verbose: bool,
    /// Log each player's hand alongside the game log
    #[arg(long)]
    show_hands: bool,
    /// Append a newline-delimited JSON event log to this file
    #[arg(long)]
    game_log: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let mut config = ArbiterConfig::load(cli.config.as_ref());

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(num_games) = cli.num_games {
        config.game.num_games = num_games;
    }
    if cli.show_hands {
        config.logging.show_hands = true;
    }

    let level = if cli.verbose { "debug" } else { &config.logging.level };
    let logger = logging::init(level);

    let event_log = match cli.game_log {
        Some(path) => match EventLog::open(&path) {
            Ok(log) => log,
            Err(e) => {
                error!(logger, "failed to open game log"; "path" => %path.display(), "error" => %e);
                exit(1);
            }
        },
        None => EventLog::disabled(),
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .expect("invalid server host/port");

    let listener = match Listener::bind(addr) {
        Ok(listener) => listener,
        Err(e) => {
            error!(logger, "failed to bind listener"; "addr" => %addr, "error" => %e);
            exit(1);
        }
    };
    info!(logger, "listening"; "addr" => %addr);

    {
        let logger = logger.clone();
        ctrlc::set_handler(move || {
            info!(logger, "interrupted, shutting down");
            exit(130);
        })
        .expect("failed to install SIGINT handler");
    }

    let mut players = Vec::with_capacity(NUM_PLAYERS as usize);
    for player_id in 0..NUM_PLAYERS {
        let handshake = match listener.accept_and_handshake(player_id) {
            Ok(handshake) => handshake,
            Err(e) => {
                error!(logger, "handshake failed, aborting session"; "player" => player_id, "error" => %e);
                exit(1);
            }
        };
        info!(
            logger,
            "player connected";
            "player" => player_id,
            "name" => &handshake.profile.name,
            "protocol_version" => handshake.profile.protocol_version,
        );
        players.push(Player::new(
            player_id,
            handshake.profile.name,
            handshake.profile.protocol_version,
            player_id,
            handshake.connection,
        ));
    }

    let rules = config.rules.to_rule_flags();
    let mut engine = Engine::new(players, rules, event_log, logger.clone());

    match engine.run_session(config.game.num_games) {
        Ok(points) => {
            let mut standings: Vec<(u32, i32)> = points.into_iter().collect();
            standings.sort_by_key(|&(_, score)| std::cmp::Reverse(score));
            for (rank, (player_id, score)) in standings.iter().enumerate() {
                info!(logger, "final standing"; "rank" => rank + 1, "player" => player_id, "points" => score);
            }
            exit(0);
        }
        Err(e) => {
            error!(logger, "session ended with a fatal error"; "error" => %e);
            exit(1);
        }
    }
}
