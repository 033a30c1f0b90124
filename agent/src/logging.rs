//! Logging bootstrap for the client binary, mirroring
//! `daifugo-arbiter`'s `logging::init` (itself grounded in the teacher's
//! `flux::logging::init`).

use sloggers::{Config, LoggerConfig};

pub fn init(level: &str) -> slog::Logger {
    let source = format!(
        r#"
type = "terminal"
level = "{level}"
destination = "stderr"
"#,
        level = level
    );
    let config: LoggerConfig = serdeconv::from_toml_str(&source).expect("invalid logging level");
    config.build_logger().expect("failed to build logger")
}
