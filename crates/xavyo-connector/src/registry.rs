//! Endpoint capability registry
//!
//! Providers declare which objects support which operations, per API
//! module. The registry built from that declaration is the gate every
//! read, write and delete passes before a request is sent.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{ConnectorError, ConnectorResult};

/// An operation a connector can perform on an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
}

impl Operation {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API module an endpoint belongs to.
///
/// Most providers expose a single root module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    Root,
    Named(String),
}

impl ModuleId {
    pub fn as_str(&self) -> &str {
        match self {
            ModuleId::Root => "root",
            ModuleId::Named(name) => name,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" | "root" => ModuleId::Root,
            other => ModuleId::Named(other.to_string()),
        })
    }
}

/// One (endpoint, operation) pair in a provider's declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSupport {
    /// Object name as callers spell it (e.g., "people").
    pub endpoint: &'static str,
    /// Operation allowed on it.
    pub support: Operation,
}

impl EndpointSupport {
    pub const fn new(endpoint: &'static str, support: Operation) -> Self {
        Self { endpoint, support }
    }
}

/// Provider declaration: module to ordered endpoint support list.
pub type EndpointRegistryInput = HashMap<ModuleId, Vec<EndpointSupport>>;

/// Immutable set of (module, endpoint, operation) triples.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    entries: BTreeSet<(ModuleId, String, Operation)>,
}

impl EndpointRegistry {
    /// Build the registry from a provider declaration.
    pub fn new(input: EndpointRegistryInput) -> Self {
        let entries = input
            .into_iter()
            .flat_map(|(module, supports)| {
                supports
                    .into_iter()
                    .map(move |s| (module.clone(), s.endpoint.to_string(), s.support))
            })
            .collect();

        Self { entries }
    }

    /// Check whether `object` supports `operation` within `module`.
    pub fn supports(&self, module: &ModuleId, object: &str, operation: Operation) -> bool {
        self.entries
            .contains(&(module.clone(), object.to_string(), operation))
    }

    /// Reject unsupported object/operation combinations.
    pub fn check(&self, module: &ModuleId, object: &str, operation: Operation) -> ConnectorResult<()> {
        if self.supports(module, object, operation) {
            Ok(())
        } else {
            Err(ConnectorError::not_supported(object, operation))
        }
    }

    /// Objects registered for an operation within a module, sorted.
    pub fn objects(&self, module: &ModuleId, operation: Operation) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(m, _, op)| m == module && *op == operation)
            .map(|(_, endpoint, _)| endpoint.as_str())
            .collect()
    }

    /// Operations registered for an object within a module, sorted.
    pub fn operations(&self, module: &ModuleId, object: &str) -> Vec<Operation> {
        self.entries
            .iter()
            .filter(|(m, endpoint, _)| m == module && endpoint == object)
            .map(|(_, _, op)| *op)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
