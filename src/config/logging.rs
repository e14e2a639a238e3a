//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Log line format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Unified JSON lines (default).
    Json,
    /// Human-readable tracing output.
    Text,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "" | "json" => Ok(LogFormat::Json),
            "text" | "pretty" => Ok(LogFormat::Text),
            other => Err(ConfigError::Invalid {
                key: "LOG_FORMAT".into(),
                message: format!("expected json or text, got '{}'", other),
            }),
        }
    }
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    /// Output format.
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: env_dump=debug,hyper=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        let filter = Self::resolve_log_filter(
            std::env::var("LOG_LEVEL").ok().as_deref(),
            std::env::var("RUST_LOG").ok().as_deref(),
        );
        Ok(Self {
            filter,
            service_name: env_or("SERVICE_NAME", "env_dump"),
            format: LogFormat::parse(&env_or("LOG_FORMAT", "json"))?,
        })
    }

    /// Resolve log filter.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default (info)
    fn resolve_log_filter(log_level: Option<&str>, rust_log: Option<&str>) -> String {
        if let Some(level) = log_level {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("env_dump={}", level);
                }
                _ => {
                    // Invalid level, fall through to RUST_LOG
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Some(filter) = rust_log.filter(|f| !f.is_empty()) {
            return filter.to_string();
        }

        "env_dump=info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "env_dump=info".to_string(),
            service_name: "env_dump".to_string(),
            format: LogFormat::Json,
        }
    }
}
