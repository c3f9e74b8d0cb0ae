//! Configuration for ptprouter
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, RouterError};
use crate::protocol::MAX_FRAME_SIZE;

/// Version string answered to `QueryVersion` unless overridden
pub const DEFAULT_ROUTER_VERSION: &str = "Peer To Peer Network 1.0.0.0";

/// Main configuration for a router instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent peer connections
    pub max_connections: usize,

    /// Size of the per-connection receive buffer (in bytes).
    /// One read is one frame, so this is also the largest frame accepted.
    pub recv_buffer_size: usize,

    /// How long the accept loop and connection loops wait between polls
    /// (milliseconds)
    pub poll_interval_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Content of the `QueryVersion` reply
    pub router_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:80".to_string(),
            max_connections: 1024,
            recv_buffer_size: MAX_FRAME_SIZE,
            poll_interval_ms: 1,
            write_timeout_ms: 5000,
            router_version: DEFAULT_ROUTER_VERSION.to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings the router loop depends on
    pub fn validate(&self) -> Result<()> {
        if self.recv_buffer_size == 0 || self.recv_buffer_size > MAX_FRAME_SIZE {
            return Err(RouterError::Config(format!(
                "recv_buffer_size must be between 1 and {} bytes, got {}",
                MAX_FRAME_SIZE, self.recv_buffer_size
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(RouterError::Config(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(RouterError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the receive buffer size (in bytes)
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.recv_buffer_size = size;
        self
    }

    /// Set the poll interval (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the version string answered to `QueryVersion`
    pub fn router_version(mut self, version: impl Into<String>) -> Self {
        self.config.router_version = version.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
