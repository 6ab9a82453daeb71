//! Logging initialization
//!
//! Console output always, plus a plain-text log file when `LOG_FILE_PATH` is set.

use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::str::FromStr;

use crate::core::error::{AppError, AppResult};

/// Initialize logger for console and (optionally) file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file, `None` for console only
/// * `level` - Maximum level emitted by both sinks
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(AppError)` - Log file could not be created or a logger is already installed
pub fn init_logger(log_file_path: Option<&str>, level: LevelFilter) -> AppResult<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file_path {
        let log_file = File::create(path)?;
        loggers.push(WriteLogger::new(level, Config::default(), log_file));
    }

    CombinedLogger::init(loggers).map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

/// Parse a level name, falling back to `Info` on anything unrecognised.
pub fn parse_level(raw: &str) -> LevelFilter {
    LevelFilter::from_str(raw.trim()).unwrap_or(LevelFilter::Info)
}
