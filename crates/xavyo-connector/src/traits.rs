//! Connector Framework traits
//!
//! Capability-based trait definitions for connectors. A provider implements
//! [`Connector`] plus whichever operation traits its capability table allows.

use async_trait::async_trait;
use tracing::warn;

use crate::error::ConnectorResult;
use crate::operation::{
    DeleteParams, DeleteResult, ReadParams, ReadResult, WriteParams, WriteResult,
};
use crate::registry::Operation;
use crate::schema::ListObjectMetadataResult;
use crate::types::ConnectorType;

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Get the type of this connector.
    fn connector_type(&self) -> ConnectorType;

    /// Get the display name for this connector instance.
    fn display_name(&self) -> &str;

    /// Test the connection to the target system.
    ///
    /// Returns `Ok(())` if the connection is successful, or an error describing
    /// what went wrong.
    async fn test_connection(&self) -> ConnectorResult<()>;

    /// Whether the capability table allows `operation` on `object`.
    fn supports(&self, object: &str, operation: Operation) -> bool;
}

/// Capability for reading pages of records.
#[async_trait]
pub trait ReadConnector: Connector {
    /// Read one page of records.
    ///
    /// When `params.next_page` is set, that URL is requested as-is.
    async fn read(&self, params: ReadParams) -> ConnectorResult<ReadResult>;

    /// Read every page, following `next_page` until the last one.
    ///
    /// Stops early if a page points back at the URL it was read from.
    async fn read_all(&self, params: ReadParams) -> ConnectorResult<ReadResult> {
        let mut requested = params.continuation().map(str::to_string);
        let mut page = self.read(params.clone()).await?;
        let mut data = std::mem::take(&mut page.data);

        while let Some(next) = page.next_page.take() {
            if requested.as_deref() == Some(next.as_str()) {
                warn!(next_page = %next, "Next page repeats the current page, stopping");
                break;
            }
            page = self
                .read(ReadParams {
                    next_page: Some(next.clone()),
                    ..params.clone()
                })
                .await?;
            requested = Some(next);
            data.append(&mut page.data);
        }

        Ok(ReadResult::new(data, None))
    }
}

/// Capability for creating and updating records.
#[async_trait]
pub trait WriteConnector: Connector {
    /// Create a record, or update it when `params.record_id` is set.
    async fn write(&self, params: WriteParams) -> ConnectorResult<WriteResult>;
}

/// Capability for deleting records.
#[async_trait]
pub trait DeleteConnector: Connector {
    async fn delete(&self, params: DeleteParams) -> ConnectorResult<DeleteResult>;
}

/// Capability for describing objects.
#[async_trait]
pub trait MetadataConnector: Connector {
    /// Describe each requested object.
    ///
    /// Objects that cannot be described are reported in the result's
    /// `errors` map instead of failing the whole call.
    async fn list_object_metadata(
        &self,
        objects: &[String],
    ) -> ConnectorResult<ListObjectMetadataResult>;
}

/// Marker trait for connectors that support read, write and delete.
pub trait FullCrud: ReadConnector + WriteConnector + DeleteConnector {}

impl<T> FullCrud for T where T: ReadConnector + WriteConnector + DeleteConnector {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use crate::operation::ReadResultRow;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    // Serves three single-row pages chained through next_page.
    struct MockConnector {
        name: String,
        healthy: Arc<AtomicBool>,
        reads: AtomicUsize,
    }

    impl MockConnector {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                healthy: Arc::new(AtomicBool::new(true)),
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        fn connector_type(&self) -> ConnectorType {
            ConnectorType::Webex
        }

        fn display_name(&self) -> &str {
            &self.name
        }

        async fn test_connection(&self) -> ConnectorResult<()> {
            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(ConnectorError::connection_failed("not healthy"))
            }
        }

        fn supports(&self, object: &str, operation: Operation) -> bool {
            object == "people" && operation == Operation::Read
        }
    }

    #[async_trait]
    impl ReadConnector for MockConnector {
        async fn read(&self, params: ReadParams) -> ConnectorResult<ReadResult> {
            params.validate()?;
            self.reads.fetch_add(1, Ordering::SeqCst);

            let page: usize = match params.next_page.as_deref() {
                None => 0,
                Some(url) => url
                    .rsplit('=')
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| ConnectorError::operation_failed("bad cursor"))?,
            };
            let record = json!({"id": format!("p-{page}")})
                .as_object()
                .cloned()
                .unwrap_or_default();
            let next = (page < 2).then(|| format!("https://host/v1/people?cursor={}", page + 1));

            Ok(ReadResult::new(
                vec![ReadResultRow::from_record(record, &params.fields)],
                next,
            ))
        }
    }

    #[tokio::test]
    async fn test_mock_connector() {
        let connector = MockConnector::new("test");
        assert_eq!(connector.connector_type(), ConnectorType::Webex);
        assert_eq!(connector.display_name(), "test");
        assert!(connector.supports("people", Operation::Read));
        assert!(!connector.supports("people", Operation::Delete));
        assert!(connector.test_connection().await.is_ok());
    }

    #[tokio::test]
    async fn test_unhealthy_connector() {
        let connector = MockConnector::new("test");
        connector.healthy.store(false, Ordering::SeqCst);
        assert!(connector.test_connection().await.is_err());
    }

    // Always points at the same next page.
    struct StuckConnector {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl Connector for StuckConnector {
        fn connector_type(&self) -> ConnectorType {
            ConnectorType::Webex
        }

        fn display_name(&self) -> &str {
            "stuck"
        }

        async fn test_connection(&self) -> ConnectorResult<()> {
            Ok(())
        }

        fn supports(&self, _object: &str, operation: Operation) -> bool {
            operation == Operation::Read
        }
    }

    #[async_trait]
    impl ReadConnector for StuckConnector {
        async fn read(&self, params: ReadParams) -> ConnectorResult<ReadResult> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            if n > 5 {
                return Err(ConnectorError::operation_failed("read_all did not stop"));
            }
            let record = json!({"id": format!("p-{n}")})
                .as_object()
                .cloned()
                .unwrap_or_default();
            Ok(ReadResult::new(
                vec![ReadResultRow::from_record(record, &params.fields)],
                Some("https://host/v1/people?cursor=same".to_string()),
            ))
        }
    }

    #[tokio::test]
    async fn test_read_all_stops_on_repeated_next_page() {
        let connector = StuckConnector {
            reads: AtomicUsize::new(0),
        };
        let params = ReadParams::new("people").with_fields(["id"]);

        let result = connector.read_all(params).await.unwrap();

        assert_eq!(connector.reads.load(Ordering::SeqCst), 2);
        assert_eq!(result.rows, 2);
        assert!(result.done);
    }

    #[tokio::test]
    async fn test_read_all_follows_next_page() {
        let connector = MockConnector::new("test");
        let params = ReadParams::new("people").with_fields(["id"]);

        let result = connector.read_all(params).await.unwrap();

        assert_eq!(connector.reads.load(Ordering::SeqCst), 3);
        assert_eq!(result.rows, 3);
        assert!(result.done);
        let ids: Vec<_> = result.data.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["p-0", "p-1", "p-2"]);
    }

    #[tokio::test]
    async fn test_read_all_propagates_validation() {
        let connector = MockConnector::new("test");
        let err = connector.read_all(ReadParams::new("people")).await.unwrap_err();
        assert!(matches!(err, ConnectorError::MissingFields));
        assert_eq!(connector.reads.load(Ordering::SeqCst), 0);
    }
}
