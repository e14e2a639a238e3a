//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use super::parse::{env_bool, env_or, env_parse};
use super::ConfigError;

/// Standalone server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8080).
    pub listen_addr: SocketAddr,
    /// Header read timeout (default: 5s).
    pub header_timeout: Duration,
    /// Include the server's own process environment in reports (default: off).
    pub include_process_env: bool,
    /// Access logging enabled.
    pub access_log: bool,
}

impl ServerConfig {
    /// Create a config for the given address with default settings.
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            header_timeout: Duration::from_secs(5),
            include_process_env: false,
            access_log: false,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr: SocketAddr = env_or("LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .map_err(|e| ConfigError::Parse {
                key: "LISTEN_ADDR".into(),
                value: env_or("LISTEN_ADDR", "0.0.0.0:8080"),
                error: format!("{}", e),
            })?;

        let header_timeout_secs: u64 = env_parse("HEADER_TIMEOUT_SECS", 5)?;
        if header_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "HEADER_TIMEOUT_SECS".into(),
                message: "must be at least 1".into(),
            });
        }

        Ok(Self::new(listen_addr)
            .with_header_timeout(Duration::from_secs(header_timeout_secs))
            .with_process_env(env_bool("INCLUDE_PROCESS_ENV", false))
            .with_access_log(env_bool("ACCESS_LOG", false)))
    }

    pub fn with_header_timeout(mut self, timeout: Duration) -> Self {
        self.header_timeout = timeout;
        self
    }

    pub fn with_process_env(mut self, include: bool) -> Self {
        self.include_process_env = include;
        self
    }

    pub fn with_access_log(mut self, enabled: bool) -> Self {
        self.access_log = enabled;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 8080)))
    }
}
