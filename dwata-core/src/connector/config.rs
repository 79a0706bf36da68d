//! Connection behavior configuration.
//!
//! Credentials never live here; they stay inside the connection URL and
//! are redacted before any URL reaches a log line or error message.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Knobs applied to every live connection the connector opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Timeout for establishing or acquiring a connection.
    pub connect_timeout: Duration,
    /// Per-statement timeout applied on engines that support it.
    pub query_timeout: Duration,
    /// Maximum pool size per opened source.
    pub max_connections: u32,
    /// Whether to enforce read-only sessions where the engine allows it.
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(30),
            max_connections: 5,
            read_only: true,
        }
    }
}

impl ConnectionConfig {
    /// Validates configuration values.
    ///
    /// # Errors
    /// Returns a configuration error for zero timeouts or pool sizes.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(crate::error::DwataError::configuration(
                "max_connections must be greater than 0",
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(crate::error::DwataError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }
        if self.query_timeout.is_zero() {
            return Err(crate::error::DwataError::configuration(
                "query_timeout must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Builder method to set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the pool size cap.
    #[must_use]
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Builder method to toggle read-only enforcement.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
