//! Error response interpretation
//!
//! Turns an unsuccessful HTTP response into a [`ConnectorError`]: the status
//! code picks the error class, then the body is matched against the
//! provider's known error shapes to attach the vendor's explanation.

use serde_json::{Map, Value};

use crate::error::ConnectorError;

/// A decoded vendor error body.
pub trait ErrorDescriptor: Send + Sync {
    /// Decorate an already classified error with what the vendor said.
    fn combine_err(&self, base: ConnectorError) -> ConnectorError;
}

/// Decoder for one error shape. Returns `None` when the body does not decode.
pub type DescriptorDecoder = fn(&Value) -> Option<Box<dyn ErrorDescriptor>>;

/// One known error shape: keys that must be present, and how to decode it.
#[derive(Clone, Copy)]
pub struct FormatTemplate {
    pub must_keys: &'static [&'static str],
    pub decode: DescriptorDecoder,
}

impl FormatTemplate {
    pub const fn new(must_keys: &'static [&'static str], decode: DescriptorDecoder) -> Self {
        Self { must_keys, decode }
    }

    fn matches(&self, object: &Map<String, Value>) -> bool {
        self.must_keys.iter().all(|key| object.contains_key(*key))
    }
}

impl std::fmt::Debug for FormatTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatTemplate")
            .field("must_keys", &self.must_keys)
            .finish_non_exhaustive()
    }
}

/// Decode `value` as `T` and box it as a descriptor.
///
/// The usual [`DescriptorDecoder`] for serde-backed shapes.
pub fn decode_as<T>(value: &Value) -> Option<Box<dyn ErrorDescriptor>>
where
    T: ErrorDescriptor + serde::de::DeserializeOwned + 'static,
{
    T::deserialize(value)
        .ok()
        .map(|descriptor| Box::new(descriptor) as Box<dyn ErrorDescriptor>)
}

/// Ordered set of error shapes. The first template whose keys are all
/// present wins.
#[derive(Debug, Clone, Default)]
pub struct FormatSwitch {
    templates: Vec<FormatTemplate>,
}

impl FormatSwitch {
    pub fn new(templates: impl IntoIterator<Item = FormatTemplate>) -> Self {
        Self {
            templates: templates.into_iter().collect(),
        }
    }

    /// Decode a raw error body into the first matching shape.
    pub fn parse(&self, body: &[u8]) -> Option<Box<dyn ErrorDescriptor>> {
        let value: Value = serde_json::from_slice(body).ok()?;
        self.parse_value(&value)
    }

    /// Same as [`FormatSwitch::parse`] for an already parsed body.
    pub fn parse_value(&self, value: &Value) -> Option<Box<dyn ErrorDescriptor>> {
        let object = value.as_object()?;
        let template = self.templates.iter().find(|t| t.matches(object))?;
        (template.decode)(value)
    }

    /// Decorate `base` with the vendor message in `body`, if any shape matches.
    pub fn combine(&self, base: ConnectorError, body: &[u8]) -> ConnectorError {
        match self.parse(body) {
            Some(descriptor) => descriptor.combine_err(base),
            None => base,
        }
    }
}

/// Classify an unsuccessful status code.
///
/// `identifier` names the record for not-found and conflict errors.
pub fn status_error(status: http::StatusCode, identifier: &str) -> ConnectorError {
    use http::StatusCode;

    match status {
        StatusCode::UNAUTHORIZED => ConnectorError::AuthenticationFailed,
        StatusCode::FORBIDDEN => ConnectorError::AuthorizationFailed {
            operation: "API call".to_string(),
        },
        StatusCode::NOT_FOUND => ConnectorError::ObjectNotFound {
            identifier: identifier.to_string(),
        },
        StatusCode::CONFLICT => ConnectorError::ObjectAlreadyExists {
            identifier: identifier.to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ConnectorError::InvalidData {
            message: format!("HTTP {status}"),
        },
        StatusCode::TOO_MANY_REQUESTS => ConnectorError::TargetUnavailable {
            message: "rate limited".to_string(),
        },
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            ConnectorError::TargetUnavailable {
                message: format!("HTTP {status}"),
            }
        }
        _ => ConnectorError::Http {
            status: status.as_u16(),
        },
    }
}

/// Classify the status and decorate with the body in one step.
pub fn interpret_error(
    status: http::StatusCode,
    body: &[u8],
    formats: &FormatSwitch,
    identifier: &str,
) -> ConnectorError {
    formats.combine(status_error(status, identifier), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct MessageError {
        message: String,
    }

    impl ErrorDescriptor for MessageError {
        fn combine_err(&self, base: ConnectorError) -> ConnectorError {
            base.with_details(self.message.clone())
        }
    }

    #[derive(Deserialize)]
    struct CodeError {
        code: String,
        description: String,
    }

    impl ErrorDescriptor for CodeError {
        fn combine_err(&self, base: ConnectorError) -> ConnectorError {
            base.with_details(format!("[{}] {}", self.code, self.description))
        }
    }

    fn formats() -> FormatSwitch {
        FormatSwitch::new([
            FormatTemplate::new(&["code", "description"], decode_as::<CodeError>),
            FormatTemplate::new(&["message"], decode_as::<MessageError>),
        ])
    }

    #[test]
    fn test_first_full_match_wins() {
        let body = br#"{"code": "E42", "description": "bad", "message": "ignored"}"#;
        let err = formats().combine(ConnectorError::Http { status: 500 }, body);
        assert_eq!(err.to_string(), "HTTP 500: [E42] bad");
    }

    #[test]
    fn test_partial_key_match_falls_through() {
        let body = br#"{"code": "E42", "message": "fallback"}"#;
        let err = formats().combine(ConnectorError::Http { status: 500 }, body);
        assert_eq!(err.to_string(), "HTTP 500: fallback");
    }

    #[test]
    fn test_no_match_returns_base() {
        for body in [&b""[..], b"not json", b"[]", br#"{"error": "x"}"#] {
            let err = formats().combine(ConnectorError::AuthenticationFailed, body);
            assert!(matches!(err, ConnectorError::AuthenticationFailed));
        }
    }

    #[test]
    fn test_undecodable_shape_returns_base() {
        let body = br#"{"message": 42}"#;
        let err = formats().combine(ConnectorError::Http { status: 500 }, body);
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "x"),
            ConnectorError::AuthenticationFailed
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "abc"),
            ConnectorError::ObjectNotFound { identifier } if identifier == "abc"
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "x"),
            ConnectorError::TargetUnavailable { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::IM_A_TEAPOT, "x"),
            ConnectorError::Http { status: 418 }
        ));
    }

    #[test]
    fn test_interpret_error_keeps_class() {
        let err = interpret_error(
            StatusCode::NOT_FOUND,
            br#"{"message": "Person not found"}"#,
            &formats(),
            "p-1",
        );
        assert_eq!(err.error_code(), "OBJECT_NOT_FOUND");
        assert!(err.to_string().ends_with(": Person not found"));
    }
}
