//! Distributed directory abstraction as consumed by the local runtime (§4.4).
//!
//! Replication/gossip semantics are out of scope (§1); the core only needs
//! register/unregister/lookup and change notification. [`InMemoryDirectory`]
//! is a complete local implementation; there is no remote directory in this
//! crate, only the trait boundary a distributed layer would implement
//! against.

mod in_memory;

pub use in_memory::InMemoryDirectory;

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::address::Address;

/// A change notification for a directory subscriber (§4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryChange {
    Registered { path: String, location: String },
    Unregistered { path: String },
}

/// A directory subscriber's unsubscribe handle. Dropping it does not
/// unsubscribe. Call `unsubscribe()` explicitly, matching the reference
/// handle's `subscribe -> unsubscribe` shape used elsewhere in this crate.
pub struct DirectorySubscription {
    unsubscribe: Box<dyn FnOnce() + Send>,
}

impl DirectorySubscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Box::new(unsubscribe),
        }
    }

    pub fn unsubscribe(self) {
        (self.unsubscribe)()
    }
}

/// Cluster-wide map from address path to location string, as the local
/// runtime needs it (§4.4). A location is typically a node identifier; the
/// local runtime only ever compares it against its own node name to decide
/// whether a send is local or remote.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Writes the binding and notifies change subscribers with `Registered`.
    async fn register(&self, address: &Address, location: &str);

    /// Removes the binding and notifies subscribers with `Unregistered`.
    async fn unregister(&self, address: &Address);

    /// Cache hit returns immediately; a miss consults the underlying map and
    /// populates the cache with the configured TTL.
    async fn lookup(&self, address: &Address) -> Option<String>;

    /// Enumerates current bindings of a given actor type: path -> location.
    async fn list_by_type(&self, kind: &str) -> HashMap<String, String>;

    /// Enumerates every current binding: path -> location.
    async fn get_all(&self) -> HashMap<String, String>;

    /// Drops the local cache (not the underlying bindings).
    async fn cleanup(&self);

    /// Subscribes to `Registered`/`Unregistered` notifications.
    fn subscribe_to_changes(
        &self,
        listener: Box<dyn Fn(DirectoryChange) + Send + Sync>,
    ) -> DirectorySubscription;
}
