//! Id generation helpers.
//!
//! Per-system atomic counters for actor id generation (§9 Design Notes:
//! "per-system atomic counters ... never global process state, so multiple
//! systems in one process do not interfere"). `next_actor_sequence` takes the
//! counter to use, rather than reaching for a process-wide static, so every
//! `ActorSystem` owns its own sequence.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Draws the next value from a per-system actor-id sequence.
///
/// Used when `spawn` is called without an explicit id: `format!("actor-{n}")`
/// keeps generated ids short and readable in logs, unlike a raw UUID.
pub fn next_actor_sequence(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::Relaxed)
}

/// Unique identifier correlating an `ask` request with its `RESPONSE`.
///
/// Globally unique (UUID v4) since correlation ids are compared across the
/// whole process, not scoped to one system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generates a fresh, globally-unique correlation id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrows the id as a plain string, for envelope stamping.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
