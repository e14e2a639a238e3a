//! Configuration module for env_dump.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use env_dump::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Mode: {:?}", config.mode);
//! println!("Max body: {}", config.limits.max_body_size);
//! ```

mod error;
mod logging;
mod parse;
mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::{parse_bool, parse_size};
pub use server::ServerConfig;

use crate::request::{BodyLimits, DEFAULT_MAX_BODY_SIZE};
use parse::{env_opt, env_size};

/// How the process was invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// One request from the CGI environment and stdin.
    Cgi,
    /// Standalone HTTP server.
    Serve,
}

impl RunMode {
    /// Pick the mode from `ENV_DUMP_MODE`, or from the presence of
    /// `GATEWAY_INTERFACE` when unset.
    pub fn detect(explicit: Option<&str>, gateway_interface: Option<&str>) -> Result<Self, ConfigError> {
        match explicit.map(str::to_ascii_lowercase).as_deref() {
            Some("cgi") => Ok(RunMode::Cgi),
            Some("serve") | Some("server") => Ok(RunMode::Serve),
            Some(other) => Err(ConfigError::Invalid {
                key: "ENV_DUMP_MODE".into(),
                message: format!("expected cgi or serve, got '{}'", other),
            }),
            None if gateway_interface.is_some_and(|g| !g.is_empty()) => Ok(RunMode::Cgi),
            None => Ok(RunMode::Serve),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Run mode.
    pub mode: RunMode,
    /// Server configuration (serve mode only).
    pub server: ServerConfig,
    /// Body read limits.
    pub limits: BodyLimits,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = RunMode::detect(
            env_opt("ENV_DUMP_MODE").as_deref(),
            env_opt("GATEWAY_INTERFACE").as_deref(),
        )?;

        let default_max = DEFAULT_MAX_BODY_SIZE.to_string();
        let max_body_size = env_size("MAX_BODY_SIZE", &default_max)?;
        if max_body_size == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_BODY_SIZE".into(),
                message: "must be greater than zero".into(),
            });
        }

        // The CGI host owns the request: server settings are irrelevant there
        let server = match mode {
            RunMode::Serve => ServerConfig::from_env()?,
            RunMode::Cgi => ServerConfig::default(),
        };

        Ok(Self {
            mode,
            server,
            limits: BodyLimits { max_body_size },
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::{debug, info};

        match self.mode {
            RunMode::Serve => {
                info!("Configuration loaded:");
                info!("  Mode: serve");
                info!("  Listen: {}", self.server.listen_addr);
                info!("  Header timeout: {}s", self.server.header_timeout.as_secs());
                info!("  Max body size: {} bytes", self.limits.max_body_size);
                if self.server.include_process_env {
                    info!("  Process environment: exposed");
                }
                if self.server.access_log {
                    info!("  Access log: enabled");
                }
            }
            RunMode::Cgi => {
                // CGI runs once per request; keep stderr quiet at info level
                debug!(
                    max_body_size = self.limits.max_body_size,
                    "CGI mode configuration loaded"
                );
            }
        }
    }
}
