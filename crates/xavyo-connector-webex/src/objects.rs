//! Webex object catalog and pagination
//!
//! The capability table for each [`ApiVariant`] and the extractor that
//! finds the next page of a list response.

use reqwest::header::HeaderMap;
use std::collections::HashMap;
use xavyo_connector::pagination::{next_page_from_link, NextPageFn};
use xavyo_connector::registry::{EndpointRegistryInput, EndpointSupport, ModuleId, Operation};

use crate::config::ApiVariant;

/// The people object.
pub const OBJECT_NAME_PEOPLE: &str = "people";

/// API path for an object.
pub fn object_path(object: &str) -> String {
    format!("/v1/{object}")
}

/// API path for a single record of an object.
pub fn record_path(object: &str, record_id: &str) -> String {
    format!("/v1/{object}/{record_id}")
}

/// Key holding the records of a list response.
pub const RESULTS_KEY: &str = "items";

/// Human-readable object name ("people" -> "People").
pub fn display_name(object: &str) -> String {
    let mut chars = object.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Which operations each object supports, per module.
pub fn supported_operations(variant: ApiVariant) -> EndpointRegistryInput {
    let operations: &[Operation] = match variant {
        ApiVariant::ReadOnly => &[Operation::Read],
        ApiVariant::ReadWriteDelete => &[Operation::Read, Operation::Write, Operation::Delete],
    };

    let supports = operations
        .iter()
        .map(|op| EndpointSupport::new(OBJECT_NAME_PEOPLE, *op))
        .collect();

    HashMap::from([(ModuleId::Root, supports)])
}

/// Next-page extractor for a list response.
///
/// Webex paginates through `Link: <url>; rel="next"`; the body is not
/// consulted.
pub fn next_records_url(headers: &HeaderMap) -> NextPageFn {
    next_page_from_link(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, LINK};
    use serde_json::json;
    use xavyo_connector::registry::EndpointRegistry;

    #[test]
    fn test_read_only_variant() {
        let registry = EndpointRegistry::new(supported_operations(ApiVariant::ReadOnly));

        assert_eq!(registry.len(), 1);
        assert!(registry.supports(&ModuleId::Root, "people", Operation::Read));
        assert!(!registry.supports(&ModuleId::Root, "people", Operation::Write));
        assert!(!registry.supports(&ModuleId::Root, "people", Operation::Delete));
    }

    #[test]
    fn test_read_write_delete_variant() {
        let registry = EndpointRegistry::new(supported_operations(ApiVariant::ReadWriteDelete));

        assert_eq!(
            registry.operations(&ModuleId::Root, "people"),
            vec![Operation::Read, Operation::Write, Operation::Delete]
        );
        assert!(!registry.supports(&ModuleId::Root, "rooms", Operation::Read));
    }

    #[test]
    fn test_declaration_order() {
        let input = supported_operations(ApiVariant::ReadWriteDelete);
        let supports = &input[&ModuleId::Root];
        let ops: Vec<_> = supports.iter().map(|s| s.support).collect();
        assert_eq!(ops, vec![Operation::Read, Operation::Write, Operation::Delete]);
        assert!(supports.iter().all(|s| s.endpoint == OBJECT_NAME_PEOPLE));
    }

    #[test]
    fn test_paths() {
        assert_eq!(object_path(OBJECT_NAME_PEOPLE), "/v1/people");
        assert_eq!(record_path(OBJECT_NAME_PEOPLE, "abc"), "/v1/people/abc");
        assert_eq!(display_name(OBJECT_NAME_PEOPLE), "People");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_next_records_url() {
        let mut headers = HeaderMap::new();
        assert_eq!(next_records_url(&headers)(&json!({})).unwrap(), None);

        headers.insert(
            LINK,
            HeaderValue::from_static(
                r#"<https://webexapis.com/v1/people?displayName=harold&max=10&after=Y2lzY29zcGFyazovL3VzL1BFT1BMRS83MTZlOWQxYy1jYTQ0LTRmZWQtOGZjYS05ZGY0YjRmNDE3ZjU>; rel="next""#,
            ),
        );
        assert_eq!(
            next_records_url(&headers)(&json!({"items": []})).unwrap().as_deref(),
            Some("https://webexapis.com/v1/people?displayName=harold&max=10&after=Y2lzY29zcGFyazovL3VzL1BFT1BMRS83MTZlOWQxYy1jYTQ0LTRmZWQtOGZjYS05ZGY0YjRmNDE3ZjU")
        );
    }
}
