//! Connector Framework operation types
//!
//! Request descriptors for read, write and delete, and the uniform result
//! shapes connectors return.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::error::{ConnectorError, ConnectorResult};

/// Build a field set from names.
///
/// ```
/// let fields = xavyo_connector::operation::fields(["id", "displayName"]);
/// assert_eq!(fields.len(), 2);
/// ```
pub fn fields<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Parameters for reading a page of records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadParams {
    /// Object to read (e.g., "people").
    pub object_name: String,

    /// Fields to surface in each row. Must not be empty.
    #[serde(default)]
    pub fields: BTreeSet<String>,

    /// Absolute URL returned by a previous page. Requested verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,

    /// Page size hint for the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ReadParams {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            ..Default::default()
        }
    }

    /// Set the requested fields.
    pub fn with_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields(names);
        self
    }

    /// Continue from a previous page.
    pub fn with_next_page(mut self, url: impl Into<String>) -> Self {
        self.next_page = Some(url.into());
        self
    }

    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// The next page URL to request, if any.
    ///
    /// A blank `next_page` means there is no continuation.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Check the request shape.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.object_name.is_empty() {
            return Err(ConnectorError::MissingObjects);
        }
        if self.fields.is_empty() {
            return Err(ConnectorError::MissingFields);
        }
        if self.page_size == Some(0) {
            return Err(ConnectorError::InvalidData {
                message: "page size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Parameters for creating or updating a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteParams {
    /// Object to write (e.g., "people").
    pub object_name: String,

    /// Present for updates, absent for creates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    /// Record payload sent as the request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_data: Option<Value>,
}

impl WriteParams {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            ..Default::default()
        }
    }

    pub fn with_record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    pub fn with_record_data(mut self, data: Value) -> Self {
        self.record_data = Some(data);
        self
    }

    /// Whether this write updates an existing record.
    pub fn is_update(&self) -> bool {
        self.record_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Check the request shape.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.object_name.is_empty() {
            return Err(ConnectorError::MissingObjects);
        }
        match &self.record_data {
            None | Some(Value::Null) => Err(ConnectorError::MissingRecordData),
            Some(_) => Ok(()),
        }
    }
}

/// Parameters for deleting a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteParams {
    pub object_name: String,
    pub record_id: String,
}

impl DeleteParams {
    pub fn new(object_name: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            record_id: record_id.into(),
        }
    }

    /// Check the request shape.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.object_name.is_empty() {
            return Err(ConnectorError::MissingObjects);
        }
        if self.record_id.is_empty() {
            return Err(ConnectorError::MissingRecordId);
        }
        Ok(())
    }
}

/// One record from a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResultRow {
    /// Record identifier, when the record carries an `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Requested fields only, keyed by lower-cased field name.
    pub fields: Map<String, Value>,

    /// The record exactly as the vendor returned it.
    pub raw: Map<String, Value>,
}

impl ReadResultRow {
    /// Project `record` onto the requested fields.
    ///
    /// Field names match case-insensitively; output keys are lower-cased.
    pub fn from_record(record: Map<String, Value>, requested: &BTreeSet<String>) -> Self {
        let wanted: BTreeSet<String> = requested.iter().map(|f| f.to_lowercase()).collect();

        let fields = record
            .iter()
            .filter_map(|(key, value)| {
                let lowered = key.to_lowercase();
                wanted.contains(&lowered).then(|| (lowered, value.clone()))
            })
            .collect();

        let id = record.get("id").and_then(Value::as_str).map(str::to_string);

        Self {
            id,
            fields,
            raw: record,
        }
    }
}

/// A page of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadResult {
    /// Number of rows in `data`.
    pub rows: usize,

    pub data: Vec<ReadResultRow>,

    /// Absolute URL of the next page; `None` on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,

    /// True when no further page exists.
    pub done: bool,
}

impl ReadResult {
    /// A blank `next_page` is stored as `None`.
    pub fn new(data: Vec<ReadResultRow>, next_page: Option<String>) -> Self {
        let next_page = next_page.filter(|url| !url.trim().is_empty());
        Self {
            rows: data.len(),
            done: next_page.is_none(),
            data,
            next_page,
        }
    }

    /// An empty, final page.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }
}

/// Outcome of a create or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    pub success: bool,

    /// Identifier of the created or updated record.
    pub record_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,

    /// Record as echoed by the vendor.
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Map<String, Value> {
        json!({
            "id": "p-1",
            "displayName": "admin@example.wbx.ai",
            "emails": ["admin@example.wbx.ai"],
            "firstName": "admin",
            "orgId": "org-1"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_read_params_validation() {
        assert!(matches!(
            ReadParams::default().validate(),
            Err(ConnectorError::MissingObjects)
        ));
        assert!(matches!(
            ReadParams::new("people").validate(),
            Err(ConnectorError::MissingFields)
        ));
        assert!(ReadParams::new("people").with_fields(["id"]).validate().is_ok());
    }

    #[test]
    fn test_read_params_rejects_zero_page_size() {
        let params = ReadParams::new("people").with_fields(["id"]).with_page_size(0);
        assert!(matches!(
            params.validate(),
            Err(ConnectorError::InvalidData { .. })
        ));
        assert!(ReadParams::new("people")
            .with_fields(["id"])
            .with_page_size(1)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_blank_next_page_is_no_continuation() {
        let params = ReadParams::new("people").with_fields(["id"]);
        assert_eq!(params.continuation(), None);
        assert_eq!(params.clone().with_next_page("").continuation(), None);
        assert_eq!(params.clone().with_next_page("  ").continuation(), None);
        assert_eq!(
            params
                .with_next_page("https://webexapis.com/v1/people?cursor=abc")
                .continuation(),
            Some("https://webexapis.com/v1/people?cursor=abc")
        );

        let parsed: ReadParams =
            serde_json::from_value(json!({"object_name": "people", "next_page": ""})).unwrap();
        assert_eq!(parsed.continuation(), None);

        let result = ReadResult::new(Vec::new(), Some(String::new()));
        assert!(result.done);
        assert_eq!(result.next_page, None);
    }

    #[test]
    fn test_write_params_validation() {
        assert!(matches!(
            WriteParams::default().validate(),
            Err(ConnectorError::MissingObjects)
        ));
        assert!(matches!(
            WriteParams::new("people").validate(),
            Err(ConnectorError::MissingRecordData)
        ));
        assert!(matches!(
            WriteParams::new("people").with_record_data(Value::Null).validate(),
            Err(ConnectorError::MissingRecordData)
        ));
        assert!(WriteParams::new("people")
            .with_record_data(json!({"displayName": "x"}))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_write_params_update_detection() {
        assert!(!WriteParams::new("people").is_update());
        assert!(!WriteParams::new("people").with_record_id("").is_update());
        assert!(WriteParams::new("people").with_record_id("p-1").is_update());
    }

    #[test]
    fn test_delete_params_validation() {
        assert!(matches!(
            DeleteParams::new("", "p-1").validate(),
            Err(ConnectorError::MissingObjects)
        ));
        assert!(matches!(
            DeleteParams::new("people", "").validate(),
            Err(ConnectorError::MissingRecordId)
        ));
        assert!(DeleteParams::new("people", "p-1").validate().is_ok());
    }

    #[test]
    fn test_row_projection() {
        let row = ReadResultRow::from_record(record(), &fields(["id", "DISPLAYNAME", "emails", "missing"]));

        assert_eq!(row.id.as_deref(), Some("p-1"));
        assert_eq!(row.fields.len(), 3);
        assert_eq!(row.fields["displayname"], json!("admin@example.wbx.ai"));
        assert_eq!(row.fields["emails"], json!(["admin@example.wbx.ai"]));
        assert!(!row.fields.contains_key("orgid"));
        assert_eq!(row.raw["orgId"], json!("org-1"));
    }

    #[test]
    fn test_read_result_done_tracks_next_page() {
        let last = ReadResult::new(vec![ReadResultRow::default()], None);
        assert_eq!(last.rows, 1);
        assert!(last.done);

        let more = ReadResult::new(Vec::new(), Some("https://host/next".to_string()));
        assert_eq!(more.rows, 0);
        assert!(!more.done);

        assert!(ReadResult::empty().done);
    }
}
