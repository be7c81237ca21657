//! Logging setup for mediactl binaries
//!
//! Library code only emits `tracing` events; an application installs a
//! subscriber once at startup through [`init_logging`] or
//! [`init_logging_from_env`].

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the [`LoggingMode`]
pub const LOG_MODE_ENV: &str = "MEDIACTL_LOG_MODE";

/// Environment variable overriding the filter directive
pub const LOG_LEVEL_ENV: &str = "MEDIACTL_LOG_LEVEL";

/// How much to log and where
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber at all
    Silent,
    /// Compact stderr output at `info`
    Development,
    /// Verbose output with source locations at `debug`
    Debug,
}

impl std::str::FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidEnv(format!("unknown logging mode '{}'", other))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Install the global subscriber for `mode`.
///
/// `MEDIACTL_LOG_LEVEL`, then `RUST_LOG`, override the mode's default level.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    init_with_filter(mode, None)
}

/// Like [`init_logging`] with an explicit filter directive (e.g. `--log-level`)
pub fn init_logging_with_level(mode: LoggingMode, level: &str) -> Result<(), LoggingError> {
    init_with_filter(mode, Some(level))
}

fn init_with_filter(mode: LoggingMode, level: Option<&str>) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let subscriber = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter(level, "info")?;
            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .compact(),
                )
                .with(filter)
                .try_init()
        }
        LoggingMode::Debug => {
            let filter = create_env_filter(level, "debug")?;
            Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .pretty()
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .try_init()
        }
    };

    subscriber.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Install the subscriber named by `MEDIACTL_LOG_MODE`; silent when unset
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var(LOG_MODE_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => LoggingMode::Silent,
    };
    init_logging(mode)
}

fn create_env_filter(level: Option<&str>, default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = match level {
        Some(level) => level.to_string(),
        None => std::env::var(LOG_LEVEL_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_level.to_string()),
    };

    EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidEnv(format!("bad filter '{}': {}", directive, e)))
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[rstest]
    #[case("silent", LoggingMode::Silent)]
    #[case("Development", LoggingMode::Development)]
    #[case("dev", LoggingMode::Development)]
    #[case(" debug ", LoggingMode::Debug)]
    fn test_mode_from_str(#[case] raw: &str, #[case] expected: LoggingMode) {
        assert_eq!(raw.parse::<LoggingMode>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_mode() {
        assert!(matches!(
            "loud".parse::<LoggingMode>(),
            Err(LoggingError::InvalidEnv(_))
        ));
    }

    #[test]
    fn test_explicit_level_wins() {
        let filter = create_env_filter(Some("remote_control=trace"), "info").unwrap();
        assert_eq!(filter.to_string(), "remote_control=trace");
    }
}
