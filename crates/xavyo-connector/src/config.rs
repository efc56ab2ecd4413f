//! Connector Framework configuration types
//!
//! Base trait and common configuration structures.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::ConnectorResult;
use crate::types::ConnectorType;

const REDACTED: &str = "***REDACTED***";

/// Trait for connector-specific configuration.
///
/// Each connector type implements this trait to define its configuration
/// schema and validation rules.
pub trait ConnectorConfig: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Get the connector type this configuration is for.
    fn connector_type() -> ConnectorType;

    /// Validate the configuration.
    ///
    /// Returns an error if the configuration is invalid.
    fn validate(&self) -> ConnectorResult<()>;

    /// Create a redacted version of this config (for logging/display).
    ///
    /// Sensitive fields should be replaced with placeholders.
    fn redacted(&self) -> Self;
}

/// Common connection settings shared across connector types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_read_timeout() -> u64 {
    60
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            read_timeout_secs: default_read_timeout(),
        }
    }
}

impl ConnectionSettings {
    /// Create new connection settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = secs;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }

    /// Get connection timeout as Duration.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get read timeout as Duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Authentication method configuration.
///
/// `Debug` never prints secrets.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,

    /// Bearer token authentication.
    Bearer { token: String },
}

impl AuthConfig {
    /// Create bearer token authentication config.
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthConfig::Bearer {
            token: token.into(),
        }
    }

    /// Value for the `Authorization` header, if any.
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            AuthConfig::None => None,
            AuthConfig::Bearer { token } => Some(format!("Bearer {token}")),
        }
    }

    /// Whether credentials are configured.
    pub fn is_configured(&self) -> bool {
        match self {
            AuthConfig::None => false,
            AuthConfig::Bearer { token } => !token.is_empty(),
        }
    }

    /// Create a redacted version.
    pub fn redacted(&self) -> Self {
        match self {
            AuthConfig::None => AuthConfig::None,
            AuthConfig::Bearer { .. } => AuthConfig::Bearer {
                token: REDACTED.to_string(),
            },
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &REDACTED)
                .finish(),
        }
    }
}
