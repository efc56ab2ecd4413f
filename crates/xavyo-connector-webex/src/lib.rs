//! # Webex Connector
//!
//! Cisco Webex connector for xavyo provisioning.
//!
//! Reads, creates, updates and deletes Webex people through the public
//! REST API (`/v1/people`).
//!
//! ## Features
//!
//! - Capability table per [`ApiVariant`] (read-only or read/write/delete)
//! - `Link` header pagination with opaque next-page URLs
//! - Webex error bodies folded into classified [`ConnectorError`]s
//! - Object metadata inferred from sample records
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_connector::prelude::*;
//! use xavyo_connector_webex::{WebexConfig, WebexConnector};
//!
//! let config = WebexConfig::default().with_bearer_token("my-api-token");
//! let connector = WebexConnector::new(config)?;
//!
//! let page = connector
//!     .read(ReadParams::new("people").with_fields(["id", "displayName"]))
//!     .await?;
//! ```
//!
//! [`ConnectorError`]: xavyo_connector::error::ConnectorError

pub mod config;
pub mod connector;
pub mod errors;
pub mod objects;

// Re-exports
pub use config::{ApiVariant, ConfigError, WebexConfig};
pub use connector::WebexConnector;
pub use errors::{ResponseMessageError, ERROR_FORMATS};
pub use objects::{next_records_url, supported_operations, OBJECT_NAME_PEOPLE};
