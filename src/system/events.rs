//! System-wide lifecycle events (§6 "System events").

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::address::Address;

/// Broadcast on `subscribeToSystemEvents` (§6).
#[derive(Debug, Clone)]
pub enum SystemEvent {
    Initialized,
    Started,
    Stopping,
    Stopped,
    ActorSpawned { address: Address },
    ActorStopping { address: Address },
    ActorStopped { address: Address },
}
