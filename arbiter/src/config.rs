//! TOML configuration, loaded the way `gamecore::config::GameConfig` does:
//! `serdeconv::from_toml_file` into a `#[derive(Serialize, Deserialize)]`
//! struct with a hand-written `Default`. Shape grounded in
//! `original_source/uecda_server/uecda_server/config.py`
//! (`ServerConfig`/`GameConfig`/`RulesConfig`/`LoggingConfig`).

use daifugo_engine::RuleFlags;
use daifugo_wire::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> ServerSection {
        ServerSection {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSection {
    pub num_games: u32,
}

impl Default for GameSection {
    fn default() -> GameSection {
        GameSection { num_games: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesSection {
    pub revolution: bool,
    pub eight_stop: bool,
    pub lock: bool,
    pub card_exchange: bool,
    pub spade3_joker: bool,
    pub sennichite: bool,
    pub eleven_back: bool,
}

impl Default for RulesSection {
    fn default() -> RulesSection {
        let flags = RuleFlags::default();
        RulesSection {
            revolution: flags.revolution,
            eight_stop: flags.eight_stop,
            lock: flags.lock,
            card_exchange: flags.card_exchange,
            spade3_joker: flags.spade3_joker,
            sennichite: flags.sennichite,
            eleven_back: flags.eleven_back,
        }
    }
}

impl RulesSection {
    pub fn to_rule_flags(&self) -> RuleFlags {
        RuleFlags {
            revolution: self.revolution,
            eight_stop: self.eight_stop,
            lock: self.lock,
            card_exchange: self.card_exchange,
            spade3_joker: self.spade3_joker,
            sennichite: self.sennichite,
            eleven_back: self.eleven_back,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    pub level: String,
    pub show_hands: bool,
}

impl Default for LoggingSection {
    fn default() -> LoggingSection {
        LoggingSection {
            level: "info".to_string(),
            show_hands: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArbiterConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub game: GameSection,
    #[serde(default)]
    pub rules: RulesSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ArbiterConfig {
    /// Loads from a TOML file; falls back to defaults if `path` is `None`.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> ArbiterConfig {
        match path {
            Some(path) => serdeconv::from_toml_file(path).expect("error loading arbiter config file"),
            None => ArbiterConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_values() {
        let config = ArbiterConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.game.num_games, 100);
        assert!(config.rules.revolution);
        assert!(!config.rules.eleven_back);
        assert_eq!(config.logging.level, "info");
    }
}
