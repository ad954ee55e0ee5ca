//! Log subscriber setup for binaries and tests.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the caller.

use crate::config::{LoggingConfig, Settings};
use tracing::level_filters::LevelFilter;

/// Map a configured level name to a filter. Unknown names fall back to `warn`.
pub fn level_from_str(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::OFF,
        "error" => LevelFilter::ERROR,
        "warn" | "warning" => LevelFilter::WARN,
        "info" => LevelFilter::INFO,
        "debug" => LevelFilter::DEBUG,
        "trace" => LevelFilter::TRACE,
        _ => LevelFilter::WARN,
    }
}

/// Effective level for a settings object; `debug = true` raises it to at least debug.
pub fn effective_level(settings: &Settings) -> LevelFilter {
    let configured = level_from_str(&settings.logging.level);
    if settings.debug {
        configured.max(LevelFilter::DEBUG)
    } else {
        configured
    }
}

/// Install a stderr fmt subscriber. Returns false if one was already installed.
pub fn init(config: &LoggingConfig) -> bool {
    init_with_level(level_from_str(&config.level))
}

pub fn init_with_level(level: LevelFilter) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!(level_from_str("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(level_from_str(" info "), LevelFilter::INFO);
        assert_eq!(level_from_str("nonsense"), LevelFilter::WARN);
        assert_eq!(level_from_str("off"), LevelFilter::OFF);
    }

    #[test]
    fn test_debug_flag_raises_level() {
        let mut settings = Settings::default();
        assert_eq!(effective_level(&settings), LevelFilter::WARN);

        settings.debug = true;
        assert_eq!(effective_level(&settings), LevelFilter::DEBUG);

        settings.logging.level = "trace".into();
        assert_eq!(effective_level(&settings), LevelFilter::TRACE);
    }

    #[test]
    fn test_second_init_is_noop() {
        let _ = init_with_level(LevelFilter::ERROR);
        assert!(!init_with_level(LevelFilter::ERROR));
    }
}
