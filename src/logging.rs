//! File logging. The terminal belongs to the UI, so records only ever go to
//! a file, and only when one is configured.

use std::fs::OpenOptions;
use std::path::Path;

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::error::{AppError, Result};

/// Parse a level name, case-insensitively. Unknown names become `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

/// Install the global logger appending to `file`. Without a file this is a no-op.
pub fn init(file: Option<&Path>, level: &str) -> Result<()> {
    let Some(path) = file else {
        return Ok(());
    };

    let target = OpenOptions::new().create(true).append(true).open(path)?;
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        .build();
    WriteLogger::init(parse_level(level), config, target)
        .map_err(|e| AppError::Logging(e.to_string()))?;
    log::info!("logging to {} at {}", path.display(), parse_level(level));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
    }

    #[test]
    fn no_file_is_noop() {
        assert!(init(None, "debug").is_ok());
    }
}
