//! Webex connector configuration
//!
//! # Security
//!
//! The base URL is checked for SSRF (Server-Side Request Forgery) so a
//! misconfigured connector cannot be pointed at internal services.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env::VarError;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use std::str::FromStr;
use xavyo_connector::config::{AuthConfig, ConnectionSettings, ConnectorConfig};
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::types::ConnectorType;

/// Public Webex API host.
pub const DEFAULT_BASE_URL: &str = "https://webexapis.com";

/// Hostnames that always point at infrastructure.
const BLOCKED_HOSTS: &[&str] = &["localhost", "metadata", "metadata.google.internal"];

/// Why `url` targets an internal address, or `None` when it is public.
///
/// Literal IPs are checked directly; hostnames are resolved and every
/// address they resolve to is checked.
fn internal_target(url: &url::Url) -> Option<String> {
    let host = url.host_str()?;
    let lower = host.to_lowercase();

    if BLOCKED_HOSTS
        .iter()
        .any(|blocked| lower == *blocked || lower.ends_with(&format!(".{blocked}")))
    {
        return Some(format!("host '{host}' is internal"));
    }

    let literal = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return is_internal_ip(ip).then(|| format!("address {ip} is internal"));
    }

    let port = url.port_or_known_default().unwrap_or(443);
    (host, port)
        .to_socket_addrs()
        .ok()?
        .map(|addr| addr.ip())
        .find(|ip| is_internal_ip(*ip))
        .map(|ip| format!("host '{host}' resolves to internal address {ip}"))
}

fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_internal_ipv4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_internal_ipv4(v4),
            None => is_internal_ipv6(v6),
        },
    }
}

fn is_internal_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.is_documentation()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (64..=127).contains(&b))
}

fn is_internal_ipv6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // fc00::/7
        || (first & 0xffc0) == 0xfe80 // fe80::/10
}

/// Which operations the connector registers for `people`.
///
/// Webex integrations exist both as a read-only feed and as a full
/// provisioning target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVariant {
    /// Read only.
    ReadOnly,
    /// Read, write and delete.
    #[default]
    ReadWriteDelete,
}

impl ApiVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVariant::ReadOnly => "read_only",
            ApiVariant::ReadWriteDelete => "read_write_delete",
        }
    }
}

impl fmt::Display for ApiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "read_only" | "readonly" => Ok(ApiVariant::ReadOnly),
            "read_write_delete" | "readwritedelete" | "full" => Ok(ApiVariant::ReadWriteDelete),
            _ => Err(ConfigError::InvalidValue(
                "WEBEX_API_VARIANT".into(),
                format!("unknown variant '{s}', expected read_only or read_write_delete"),
            )),
        }
    }
}

/// Configuration for the Webex connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebexConfig {
    /// API host, without the `/v1` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// Default headers to include in all requests.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub default_headers: HashMap<String, String>,

    /// Operation set registered for `people`.
    #[serde(default)]
    pub variant: ApiVariant,

    /// Sent as `max` on the first page of a read, unless the read sets its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Allow localhost URLs (for testing only).
    /// WARNING: Never enable in production - disables SSRF protection.
    #[serde(default)]
    pub allow_localhost: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for WebexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl WebexConfig {
    /// Create a new config against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: AuthConfig::None,
            connection: ConnectionSettings::default(),
            default_headers: HashMap::new(),
            variant: ApiVariant::default(),
            page_size: None,
            allow_localhost: false,
        }
    }

    /// Set authentication.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Set bearer token authentication.
    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_auth(AuthConfig::bearer(token))
    }

    /// Add a default header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_variant(mut self, variant: ApiVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    /// Allow localhost URLs (for testing only).
    ///
    /// # Warning
    ///
    /// This disables SSRF protection. **NEVER** use in production!
    /// Only use this for integration tests with mock servers.
    pub fn with_allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Build the full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let base_url = reader("WEBEX_BASE_URL").unwrap_or_else(|_| default_base_url());

        let token = reader("WEBEX_ACCESS_TOKEN")
            .map_err(|_| ConfigError::MissingVar("WEBEX_ACCESS_TOKEN".into()))?;

        let page_size = match reader("WEBEX_PAGE_SIZE") {
            Ok(raw) => Some(raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("WEBEX_PAGE_SIZE".into(), e.to_string())
            })?),
            Err(_) => None,
        };

        let variant = match reader("WEBEX_API_VARIANT") {
            Ok(raw) => raw.parse::<ApiVariant>()?,
            Err(_) => ApiVariant::default(),
        };

        let mut connection = ConnectionSettings::default();
        if let Ok(raw) = reader("WEBEX_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("WEBEX_TIMEOUT_SECS".into(), e.to_string())
            })?;
            connection = connection.with_read_timeout(secs);
        }

        Ok(Self {
            base_url,
            auth: AuthConfig::bearer(token),
            connection,
            default_headers: HashMap::new(),
            variant,
            page_size,
            allow_localhost: false,
        })
    }
}

impl ConnectorConfig for WebexConfig {
    fn connector_type() -> ConnectorType {
        ConnectorType::Webex
    }

    fn validate(&self) -> ConnectorResult<()> {
        if self.base_url.is_empty() {
            return Err(ConnectorError::InvalidConfiguration {
                message: "base_url is required".to_string(),
            });
        }

        let url =
            url::Url::parse(&self.base_url).map_err(|e| ConnectorError::InvalidConfiguration {
                message: format!("invalid base_url: {}", e),
            })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConnectorError::InvalidConfiguration {
                message: format!("unsupported scheme: {}", url.scheme()),
            });
        }

        if !self.allow_localhost {
            if url.host_str().is_none() {
                return Err(ConnectorError::InvalidConfiguration {
                    message: "base_url has no host".to_string(),
                });
            }
            if let Some(reason) = internal_target(&url) {
                return Err(ConnectorError::InvalidConfiguration {
                    message: format!("SSRF protection: {reason}"),
                });
            }
        }

        if self.page_size == Some(0) {
            return Err(ConnectorError::InvalidConfiguration {
                message: "page_size must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.auth = config.auth.redacted();
        config
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl From<ConfigError> for ConnectorError {
    fn from(err: ConfigError) -> Self {
        ConnectorError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}
