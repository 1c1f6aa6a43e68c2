//! Remote transport hook (§1 "Out of scope: remote transport").
//!
//! The core never opens a socket; it calls this opaque hook when routing a
//! send to an address whose directory entry resolves to a non-local
//! location. [`UnconfiguredTransport`] is the default and always fails,
//! which is the correct behavior for a single-node deployment.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use thiserror::Error;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::envelope::Envelope;

/// Failure delivering to a remote location (§7: `RemoteDeliveryFailed`).
#[derive(Debug, Error)]
pub enum RemoteDeliveryError {
    #[error("no remote transport is configured for this system")]
    NotConfigured,
    #[error("remote delivery to {location} failed: {reason}")]
    Failed { location: String, reason: String },
}

/// The boundary the core calls to deliver to a non-local location. A real
/// deployment supplies an implementation over its own wire protocol; this
/// crate only defines the interface (§1).
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn deliver_remote(
        &self,
        location: &str,
        address: &Address,
        message: Envelope,
    ) -> Result<(), RemoteDeliveryError>;
}

/// Default transport for a system with no remote peers: every delivery
/// fails immediately, which `send`'s fire-and-forget contract (§7) reports
/// to the caller, not the dead-letter queue.
#[derive(Debug, Default)]
pub struct UnconfiguredTransport;

#[async_trait]
impl RemoteTransport for UnconfiguredTransport {
    async fn deliver_remote(
        &self,
        _location: &str,
        _address: &Address,
        _message: Envelope,
    ) -> Result<(), RemoteDeliveryError> {
        Err(RemoteDeliveryError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[tokio::test]
    async fn unconfigured_transport_always_fails() {
        let transport = UnconfiguredTransport;
        let err = transport
            .deliver_remote(
                "node-2",
                &Address::local("worker", "1"),
                Envelope::new("X", Value::Null),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteDeliveryError::NotConfigured));
    }
}
