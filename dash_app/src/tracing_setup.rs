use std::io;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config_loader::LoggingSection;

/// Parse a level name, falling back to INFO
pub fn parse_level(level: &str) -> Level {
    Level::from_str(level.trim()).unwrap_or(Level::INFO)
}

/// Initialise tracing from the logging section of the dashboard config
///
/// Logs go to an hourly rolling file under `logging.dir`, and to stdout when
/// `logging.stdout` is set. `RUST_LOG` overrides `logging.level`.
pub fn init(app_name: &str, logging: &LoggingSection) -> WorkerGuard {
    // Create log directory if it doesn't exist
    let _ = std::fs::create_dir_all(&logging.dir);

    let file_appender = tracing_appender::rolling::hourly(&logging.dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::builder().with_default_directive(parse_level(&logging.level).into()).from_env_lossy();

    // File layer (no ANSI colors)
    let file_layer = fmt::layer().with_writer(non_blocking).with_target(true).with_line_number(true).with_ansi(false).compact();

    // Stdout layer, only when requested
    let stdout_layer =
        logging.stdout.then(|| fmt::layer().with_writer(io::stdout).with_target(true).with_line_number(true).with_ansi(true).compact());

    tracing_subscriber::registry().with(env_filter).with(file_layer).with(stdout_layer).init();

    guard
}
