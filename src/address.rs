//! Actor address: `actor://<node>/<type>/<id>`, parsed and formatted per §6.
//!
//! Two addresses are equal iff their formatted paths are equal (§3); `path()`
//! is therefore treated as the canonical key everywhere an address is used
//! to index a map (the directory, the actor registry, the subscription
//! table).

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The node name the local runtime uses for actors that did not specify one.
pub const LOCAL_NODE: &str = "local";

/// Location-transparent actor address.
///
/// `node` is an opaque, non-empty identifier; the literal `"local"` means
/// "unspecified node" (§6). `id` may itself contain slashes, since it is the
/// last grammar component and everything after the second slash belongs to
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    node: String,
    kind: String,
    id: String,
}

/// Failure to parse a string as an [`Address`] path (§7: `InvalidActorPath`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid actor path: {0:?}")]
pub struct AddressError(pub String);

impl Address {
    /// Builds an address directly from its components.
    pub fn new(node: impl Into<String>, kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Builds a local-node address (`node = "local"`).
    pub fn local(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(LOCAL_NODE, kind, id)
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Formats the canonical path: `actor://<node>/<type>/<id>`.
    pub fn path(&self) -> String {
        format!("actor://{}/{}/{}", self.node, self.kind, self.id)
    }

    /// Parses `^actor://([^/]+)/([^/]+)/(.+)$`. Parse failure is an error,
    /// never a silent default (§3).
    pub fn parse(path: &str) -> Result<Self, AddressError> {
        let rest = path
            .strip_prefix("actor://")
            .ok_or_else(|| AddressError(path.to_string()))?;

        let mut parts = rest.splitn(3, '/');
        let node = parts.next().filter(|s| !s.is_empty());
        let kind = parts.next().filter(|s| !s.is_empty());
        let id = parts.next().filter(|s| !s.is_empty());

        match (node, kind, id) {
            (Some(node), Some(kind), Some(id)) => Ok(Self::new(node, kind, id)),
            _ => Err(AddressError(path.to_string())),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
