//! Logging bootstrap, in the shape of the teacher's `flux::logging::init`:
//! a `sloggers::LoggerConfig` built from a small TOML snippet and turned
//! into a root `slog::Logger`. Unlike the original stub, `level` is taken
//! from the CLI/config rather than hard-coded, and the logger is actually
//! returned rather than dropped.

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
