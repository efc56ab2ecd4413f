//! Webex error bodies
//!
//! Webex answers failures with `{"message": "...", "errors": [...],
//! "trackingId": "..."}`. Only `message` is surfaced.

use serde::Deserialize;
use std::sync::LazyLock;
use xavyo_connector::error::ConnectorError;
use xavyo_connector::interpreter::{decode_as, ErrorDescriptor, FormatSwitch, FormatTemplate};

/// Error shapes Webex is known to return, in match order.
pub static ERROR_FORMATS: LazyLock<FormatSwitch> = LazyLock::new(|| {
    FormatSwitch::new([FormatTemplate::new(
        &["message"],
        decode_as::<ResponseMessageError>,
    )])
});

/// Webex error body carrying a human-readable message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessageError {
    pub message: String,
}

impl ErrorDescriptor for ResponseMessageError {
    fn combine_err(&self, base: ConnectorError) -> ConnectorError {
        base.with_details(self.message.clone())
    }
}
