use agent_core::config::LoggingConfig;
use std::fs::File;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;

use crate::errors::AgentError;

pub fn parse_level(level: &str) -> Result<LevelFilter, AgentError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| AgentError::Config(format!("Unknown log level '{}'", level)))
}

/// Truncates the log file and routes both `tracing` events and `log` records into it.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AgentError> {
    let level = parse_level(&config.level)?;
    let file = File::create(&config.file).map_err(|e| {
        AgentError::Config(format!("Failed to create log file {}: {}", config.file, e))
    })?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_max_level(level)
        .try_init()
        .map_err(|e| AgentError::Config(format!("Failed to install logger: {}", e)))
}
