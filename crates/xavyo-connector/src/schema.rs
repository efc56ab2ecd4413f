//! Connector Framework object metadata
//!
//! Describes objects and their fields. Providers without a schema endpoint
//! infer metadata from sample records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Value type of a field, inferred from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Boolean,
    Int,
    Float,
    Array,
    Object,
    /// Null, or values of conflicting types across records.
    Other,
}

impl ValueType {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Other => "other",
        }
    }

    /// Type of a single JSON value. Returns `None` for null.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ValueType::Int),
            Value::Number(_) => Some(ValueType::Float),
            Value::String(_) => Some(ValueType::String),
            Value::Array(_) => Some(ValueType::Array),
            Value::Object(_) => Some(ValueType::Object),
        }
    }

    /// Combine the types seen for the same field in two records.
    ///
    /// `None` means only nulls were seen so far. Once a conflict yields
    /// `Other` it stays `Other`.
    fn merge(seen: Option<ValueType>, value: Option<ValueType>) -> Option<ValueType> {
        match (seen, value) {
            (None, t) | (t, None) => t,
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(ValueType::Int), Some(ValueType::Float))
            | (Some(ValueType::Float), Some(ValueType::Int)) => Some(ValueType::Float),
            _ => Some(ValueType::Other),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata for one field of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub display_name: String,
    pub value_type: ValueType,
}

/// Metadata for one object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub display_name: String,

    /// Fields keyed by their lower-cased name.
    pub fields: BTreeMap<String, FieldMetadata>,
}

impl ObjectMetadata {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Infer fields from sample records.
    ///
    /// Fields are the union over all records. A field that is only ever
    /// null, or whose values disagree in type, is [`ValueType::Other`].
    pub fn infer<'a>(
        display_name: impl Into<String>,
        records: impl IntoIterator<Item = &'a Map<String, Value>>,
    ) -> Self {
        // lower-cased name -> (first spelling seen, merged type)
        let mut observed: BTreeMap<String, (String, Option<ValueType>)> = BTreeMap::new();

        for record in records {
            for (name, value) in record {
                let value_type = ValueType::of(value);
                observed
                    .entry(name.to_lowercase())
                    .and_modify(|(_, seen)| *seen = ValueType::merge(*seen, value_type))
                    .or_insert_with(|| (name.clone(), value_type));
            }
        }

        let mut metadata = Self::new(display_name);
        metadata.fields = observed
            .into_iter()
            .map(|(key, (display_name, seen))| {
                let field = FieldMetadata {
                    display_name,
                    value_type: seen.unwrap_or(ValueType::Other),
                };
                (key, field)
            })
            .collect();
        metadata
    }

    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.get(&name.to_lowercase())
    }
}

/// Result of describing several objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListObjectMetadataResult {
    /// Metadata per successfully described object.
    pub result: BTreeMap<String, ObjectMetadata>,

    /// Error message per object that could not be described.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl ListObjectMetadataResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_metadata(&mut self, object: impl Into<String>, metadata: ObjectMetadata) {
        self.result.insert(object.into(), metadata);
    }

    pub fn add_error(&mut self, object: impl Into<String>, error: impl ToString) {
        self.errors.insert(object.into(), error.to_string());
    }
}
