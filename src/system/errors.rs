//! System-level error types (§7).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::address::{Address, AddressError};

/// System-level errors surfaced to synchronous API callers (§7: "Synchronous
/// API misuse ... throws immediately"). Delivery failures visible only to
/// the runtime never appear here; they become dead letters instead.
#[derive(Error, Debug)]
pub enum SystemError {
    /// `spawn` was called before `start()` or after `stop()`.
    #[error("system is not running")]
    SystemNotRunning,

    /// `spawn` would exceed the configured `max_actors`.
    #[error("actor capacity exceeded: current {current}, max {max}")]
    CapacityExceeded { current: usize, max: usize },

    /// An explicit spawn id collided with a live actor (§9 open question:
    /// second spawn with a duplicate id fails rather than overwriting).
    #[error("an actor is already registered at {0}")]
    DuplicateActorId(Address),

    /// `lookup`/`stop` received a path that doesn't match the address
    /// grammar.
    #[error(transparent)]
    InvalidActorPath(#[from] AddressError),

    /// No local actor record exists for the given address.
    #[error("actor not found: {0}")]
    ActorNotFound(Address),

    /// Graceful shutdown did not complete within `shutdown_timeout`.
    #[error("shutdown timed out after {0:?}")]
    ShutdownTimeout(Duration),

    /// `flush` did not observe quiescence before its deadline.
    #[error("flush timed out after {0:?}")]
    FlushTimeout(Duration),

    /// `flush` ran `maxRounds` round-robin passes without reaching
    /// quiescence.
    #[error("flush did not settle within {0} rounds")]
    FlushMaxRoundsExceeded(usize),
}

impl SystemError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SystemError::SystemNotRunning | SystemError::ShutdownTimeout(_))
    }

    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_display() {
        let err = SystemError::CapacityExceeded { current: 10, max: 5 };
        assert!(err.to_string().contains("10"));
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn system_not_running_is_fatal() {
        assert!(SystemError::SystemNotRunning.is_fatal());
        assert!(!SystemError::SystemNotRunning.is_recoverable());
    }

    #[test]
    fn actor_not_found_is_recoverable() {
        let err = SystemError::ActorNotFound(Address::local("worker", "1"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn invalid_actor_path_converts_from_address_error() {
        let address_err = AddressError("bad".to_string());
        let system_err: SystemError = address_err.into();
        assert!(matches!(system_err, SystemError::InvalidActorPath(_)));
    }
}
