//! Pagination helpers
//!
//! RFC 8288 `Link` header parsing and the next-page callback type that
//! providers hand back after each page.

use http::header::{HeaderMap, LINK};
use serde_json::Value;
use tracing::warn;

use crate::error::ConnectorResult;

/// Callback deciding where the next page lives.
///
/// Invoked once per page with the parsed response body. `Ok(None)` means
/// the page just read was the last one.
pub type NextPageFn = Box<dyn Fn(&Value) -> ConnectorResult<Option<String>> + Send + Sync>;

/// A single parsed `Link` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub url: String,
    /// Relation types, lower-cased.
    pub relations: Vec<String>,
}

impl LinkEntry {
    pub fn has_relation(&self, rel: &str) -> bool {
        self.relations.iter().any(|r| r.eq_ignore_ascii_case(rel))
    }
}

/// Parse every well-formed entry of a `Link` header value.
///
/// Fragments without `<url>` or without a `rel` parameter are skipped.
pub fn parse_link_header(value: &str) -> Vec<LinkEntry> {
    split_entries(value)
        .into_iter()
        .filter_map(|fragment| {
            let entry = parse_entry(fragment);
            if entry.is_none() && !fragment.trim().is_empty() {
                warn!(fragment = %fragment.trim(), "Skipping malformed Link header entry");
            }
            entry
        })
        .collect()
}

/// URL of the first `Link` entry carrying relation `rel`.
///
/// Every `Link` header line is considered, in order. Lookup is
/// case-insensitive on the header name.
pub fn header_link(headers: &HeaderMap, rel: &str) -> Option<String> {
    headers
        .get_all(LINK)
        .into_iter()
        .filter_map(|value| match value.to_str() {
            Ok(s) => Some(s),
            Err(_) => {
                warn!("Ignoring Link header with non-ASCII value");
                None
            }
        })
        .flat_map(parse_link_header)
        .find(|entry| entry.has_relation(rel))
        .map(|entry| entry.url)
}

/// A [`NextPageFn`] that ignores the body and follows `Link: <..>; rel="next"`.
pub fn next_page_from_link(headers: &HeaderMap) -> NextPageFn {
    let headers = headers.clone();
    Box::new(move |_body: &Value| Ok(header_link(&headers, "next")))
}

/// Split on commas that are not inside `<...>` or a quoted string.
fn split_entries(value: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut in_url = false;
    let mut in_quotes = false;

    for (idx, ch) in value.char_indices() {
        match ch {
            '<' if !in_quotes => in_url = true,
            '>' if !in_quotes => in_url = false,
            '"' if !in_url => in_quotes = !in_quotes,
            ',' if !in_url && !in_quotes => {
                entries.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    entries.push(&value[start..]);

    entries
}

fn parse_entry(fragment: &str) -> Option<LinkEntry> {
    let fragment = fragment.trim();
    let rest = fragment.strip_prefix('<')?;
    let end = rest.find('>')?;
    let url = rest[..end].trim();
    if url.is_empty() {
        return None;
    }

    let relations: Vec<String> = rest[end + 1..]
        .split(';')
        .filter_map(|param| {
            let (name, value) = param.split_once('=')?;
            if !name.trim().eq_ignore_ascii_case("rel") {
                return None;
            }
            Some(value.trim().trim_matches('"').to_string())
        })
        .flat_map(|rel| {
            rel.split_whitespace()
                .map(str::to_ascii_lowercase)
                .collect::<Vec<_>>()
        })
        .collect();

    if relations.is_empty() {
        return None;
    }

    Some(LinkEntry {
        url: url.to_string(),
        relations,
    })
}
