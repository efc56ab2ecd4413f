//! # Connector Framework
//!
//! Core abstractions for reading and writing records in external SaaS
//! systems over REST.
//!
//! ## Architecture
//!
//! The framework uses a capability-based trait system:
//!
//! - [`Connector`](traits::Connector) - Base trait all connectors implement
//! - [`ReadConnector`](traits::ReadConnector) - Paged reads
//! - [`WriteConnector`](traits::WriteConnector) - Create and update
//! - [`DeleteConnector`](traits::DeleteConnector) - Delete by id
//! - [`MetadataConnector`](traits::MetadataConnector) - Describe objects
//!
//! Which operations a provider allows per object is declared once as an
//! [`EndpointRegistryInput`](registry::EndpointRegistryInput) and checked
//! before any request is sent.
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_connector::prelude::*;
//!
//! let page = connector
//!     .read(ReadParams::new("people").with_fields(["id", "displayName"]))
//!     .await?;
//!
//! if let Some(next) = page.next_page {
//!     let more = connector
//!         .read(ReadParams::new("people").with_fields(["id"]).with_next_page(next))
//!         .await?;
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`types`] - Connector type enum
//! - [`error`] - Error types with transient/permanent classification
//! - [`registry`] - Endpoint capability registry
//! - [`pagination`] - `Link` header parsing and next-page callbacks
//! - [`interpreter`] - HTTP error classification and vendor body decoding
//! - [`traits`] - Connector capability traits
//! - [`schema`] - Object metadata
//! - [`operation`] - Read/write/delete parameters and results
//! - [`config`] - Configuration types and traits

pub mod config;
pub mod error;
pub mod interpreter;
pub mod operation;
pub mod pagination;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_connector::prelude::*;
/// ```
pub mod prelude {
    // Types and enums
    pub use crate::types::ConnectorType;

    // Error handling
    pub use crate::error::{ConnectorError, ConnectorResult};

    // Traits
    pub use crate::traits::{
        Connector, DeleteConnector, FullCrud, MetadataConnector, ReadConnector, WriteConnector,
    };

    // Capability registry
    pub use crate::registry::{
        EndpointRegistry, EndpointRegistryInput, EndpointSupport, ModuleId, Operation,
    };

    // Pagination and error interpretation
    pub use crate::interpreter::{
        decode_as, interpret_error, ErrorDescriptor, FormatSwitch, FormatTemplate,
    };
    pub use crate::pagination::{header_link, next_page_from_link, NextPageFn};

    // Schema
    pub use crate::schema::{FieldMetadata, ListObjectMetadataResult, ObjectMetadata, ValueType};

    // Operations
    pub use crate::operation::{
        DeleteParams, DeleteResult, ReadParams, ReadResult, ReadResultRow, WriteParams,
        WriteResult,
    };

    // Configuration
    pub use crate::config::{AuthConfig, ConnectionSettings, ConnectorConfig};
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _ct = ConnectorType::Webex;
        let _module = ModuleId::Root;
        let _support = EndpointSupport::new("people", Operation::Read);
        let _params = ReadParams::new("people").with_fields(["id"]);
        let _auth = AuthConfig::bearer("token");
        let _formats = FormatSwitch::default();
    }
}
