//! Connector Framework type definitions
//!
//! Enums shared by every provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of connector for external system integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    /// Cisco Webex REST API connector
    Webex,
}

impl ConnectorType {
    /// Get all available connector types.
    #[must_use]
    pub fn all() -> &'static [ConnectorType] {
        &[ConnectorType::Webex]
    }

    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorType::Webex => "webex",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConnectorType {
    type Err = ParseConnectorTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "webex" | "ciscowebex" => Ok(ConnectorType::Webex),
            _ => Err(ParseConnectorTypeError(s.to_string())),
        }
    }
}

/// Error parsing connector type from string.
#[derive(Debug, Clone)]
pub struct ParseConnectorTypeError(String);

impl fmt::Display for ParseConnectorTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid connector type '{}', expected one of: webex",
            self.0
        )
    }
}

impl std::error::Error for ParseConnectorTypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_type_roundtrip() {
        for ty in ConnectorType::all() {
            assert_eq!(ty.as_str().parse::<ConnectorType>().unwrap(), *ty);
        }
        assert_eq!(
            "CiscoWebex".parse::<ConnectorType>().unwrap(),
            ConnectorType::Webex
        );
    }

    #[test]
    fn test_connector_type_parse_error() {
        let err = "ldap".parse::<ConnectorType>().unwrap_err();
        assert!(err.to_string().contains("'ldap'"));
    }

    #[test]
    fn test_connector_type_serde() {
        let json = serde_json::to_string(&ConnectorType::Webex).unwrap();
        assert_eq!(json, "\"webex\"");
    }
}
