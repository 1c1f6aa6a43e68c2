//! Cluster state as the local runtime sees it (§3 "Cluster State").
//!
//! Membership consensus is out of scope (§1): the core tracks this record
//! as something written to by `join`/`leave` calls, not something it
//! computes. A real deployment's cluster layer would be the one actually
//! deciding `leader` and `status`.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Membership status of this node (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClusterStatus {
    #[default]
    Down,
    Joining,
    Up,
    Leaving,
}

/// Opaque cluster-wide record (§3): `{nodes, leader?, status}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterState {
    pub nodes: Vec<String>,
    pub leader: Option<String>,
    pub status: ClusterStatus,
}

/// Cluster membership notifications (`subscribeToClusterEvents`, §4.1).
#[derive(Debug, Clone)]
pub enum ClusterEvent {
    NodeJoined(String),
    NodeLeft(String),
    LeaderChanged(Option<String>),
}
