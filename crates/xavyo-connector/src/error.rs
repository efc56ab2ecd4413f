//! Connector Framework error types
//!
//! Error definitions with transient/permanent classification. Vendor error
//! bodies never change the classification of an error, they only decorate
//! it (see [`ConnectorError::with_details`]).

use thiserror::Error;

use crate::registry::Operation;

/// Error that can occur during connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Request validation errors (raised before any network call)
    /// No object name was supplied.
    #[error("missing object name")]
    MissingObjects,

    /// A read requested no fields.
    #[error("missing fields: at least one field must be requested")]
    MissingFields,

    /// A write carried no record payload.
    #[error("missing record data")]
    MissingRecordData,

    /// A delete carried no record identifier.
    #[error("missing record id")]
    MissingRecordId,

    /// The capability table has no entry for this object and operation.
    #[error("operation '{operation}' is not supported for object '{object}'")]
    OperationNotSupportedForObject { object: String, operation: Operation },

    // Connection errors (usually transient)
    /// Failed to reach the target system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Target system is temporarily unavailable (rate limited or overloaded).
    #[error("target system unavailable: {message}")]
    TargetUnavailable { message: String },

    // Authentication errors (permanent)
    /// Invalid or expired credentials.
    #[error("authentication failed: invalid credentials")]
    AuthenticationFailed,

    /// Insufficient permissions for the operation.
    #[error("authorization failed: insufficient permissions for {operation}")]
    AuthorizationFailed { operation: String },

    // Configuration errors (permanent)
    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // Operation errors
    /// Object not found in target system.
    #[error("object not found: {identifier}")]
    ObjectNotFound { identifier: String },

    /// Object already exists in target system (create conflict).
    #[error("object already exists: {identifier}")]
    ObjectAlreadyExists { identifier: String },

    /// The target system rejected the request payload.
    #[error("invalid data: {message}")]
    InvalidData { message: String },

    /// Any other unsuccessful HTTP status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Operation failed.
    #[error("operation failed: {message}")]
    OperationFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization error.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// A classified error annotated with a vendor supplied explanation.
    #[error("{base}: {details}")]
    Detailed {
        #[source]
        base: Box<ConnectorError>,
        details: String,
    },
}

impl ConnectorError {
    /// Check if this error is transient and the operation may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.root(),
            ConnectorError::ConnectionFailed { .. } | ConnectorError::TargetUnavailable { .. }
        )
    }

    /// Check if this error is permanent and retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Check if this error was raised by request validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self.root(),
            ConnectorError::MissingObjects
                | ConnectorError::MissingFields
                | ConnectorError::MissingRecordData
                | ConnectorError::MissingRecordId
                | ConnectorError::OperationNotSupportedForObject { .. }
        )
    }

    /// The classified error underneath any vendor decoration.
    pub fn root(&self) -> &ConnectorError {
        match self {
            ConnectorError::Detailed { base, .. } => base.root(),
            other => other,
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self.root() {
            ConnectorError::MissingObjects => "MISSING_OBJECTS",
            ConnectorError::MissingFields => "MISSING_FIELDS",
            ConnectorError::MissingRecordData => "MISSING_RECORD_DATA",
            ConnectorError::MissingRecordId => "MISSING_RECORD_ID",
            ConnectorError::OperationNotSupportedForObject { .. } => "OPERATION_NOT_SUPPORTED",
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            ConnectorError::AuthenticationFailed => "AUTH_FAILED",
            ConnectorError::AuthorizationFailed { .. } => "AUTHORIZATION_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::ObjectNotFound { .. } => "OBJECT_NOT_FOUND",
            ConnectorError::ObjectAlreadyExists { .. } => "OBJECT_EXISTS",
            ConnectorError::InvalidData { .. } => "INVALID_DATA",
            ConnectorError::Http { .. } => "HTTP_ERROR",
            ConnectorError::OperationFailed { .. } => "OPERATION_FAILED",
            ConnectorError::Serialization { .. } => "SERIALIZATION_ERROR",
            ConnectorError::Detailed { .. } => "DETAILED",
        }
    }

    /// Annotate this error with a vendor message.
    ///
    /// An empty message returns the error unchanged.
    #[must_use]
    pub fn with_details(self, details: impl Into<String>) -> Self {
        let details = details.into();
        if details.is_empty() {
            return self;
        }
        ConnectorError::Detailed {
            base: Box::new(self),
            details,
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create an operation failed error with source.
    pub fn operation_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::OperationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an operation-not-supported error.
    pub fn not_supported(object: impl Into<String>, operation: Operation) -> Self {
        ConnectorError::OperationNotSupportedForObject {
            object: object.into(),
            operation,
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        let transient_errors = vec![
            ConnectorError::connection_failed("test"),
            ConnectorError::TargetUnavailable {
                message: "test".to_string(),
            },
        ];

        for err in transient_errors {
            assert!(
                err.is_transient(),
                "Expected {} to be transient",
                err.error_code()
            );
            assert!(!err.is_permanent());
        }
    }

    #[test]
    fn test_permanent_errors() {
        let permanent_errors = vec![
            ConnectorError::AuthenticationFailed,
            ConnectorError::MissingFields,
            ConnectorError::ObjectNotFound {
                identifier: "test".to_string(),
            },
            ConnectorError::Http { status: 418 },
        ];

        for err in permanent_errors {
            assert!(
                err.is_permanent(),
                "Expected {} to be permanent",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_validation_errors() {
        assert!(ConnectorError::MissingObjects.is_validation());
        assert!(ConnectorError::not_supported("people", Operation::Delete).is_validation());
        assert!(!ConnectorError::AuthenticationFailed.is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = ConnectorError::not_supported("unknown", Operation::Read);
        assert_eq!(
            err.to_string(),
            "operation 'read' is not supported for object 'unknown'"
        );

        let err = ConnectorError::Http { status: 500 };
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_with_details_keeps_classification() {
        let err = ConnectorError::ObjectNotFound {
            identifier: "abc".to_string(),
        }
        .with_details("The requested resource could not be found.");

        assert_eq!(
            err.to_string(),
            "object not found: abc: The requested resource could not be found."
        );
        assert_eq!(err.error_code(), "OBJECT_NOT_FOUND");
        assert!(matches!(err.root(), ConnectorError::ObjectNotFound { .. }));
    }

    #[test]
    fn test_with_empty_details_is_noop() {
        let err = ConnectorError::AuthenticationFailed.with_details("");
        assert!(matches!(err, ConnectorError::AuthenticationFailed));
        assert_eq!(err.to_string(), "authentication failed: invalid credentials");
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "underlying error");
        let err = ConnectorError::connection_failed_with_source("failed", source_err);

        assert!(err.is_transient());
        if let ConnectorError::ConnectionFailed { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected ConnectionFailed variant");
        }
    }
}
