//! Request/response manager: a pending-ask table keyed by correlation id,
//! with timer-driven expiry (§4, design note "Coroutine-style `ask`").
//!
//! Realized as a oneshot-channel-per-request plus `tokio::time::timeout`,
//! rather than true coroutines. Request/reply is layered on top of plain
//! fire-and-forget sends, but pulled out into its own component since it's
//! a first-class part of the system (§2 table).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use crate::envelope::Envelope;
use crate::util::CorrelationId;

/// Default timeout for `ask` when the caller doesn't specify one (§6).
pub const DEFAULT_ASK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Failure modes for a pending `ask` (§7).
#[derive(Debug, Error)]
pub enum AskError {
    /// No matching response arrived within the timeout.
    #[error("ask timed out waiting for a response")]
    Timeout,
    /// The system was stopped while this ask was still pending.
    #[error("system is shutting down")]
    SystemShuttingDown,
}

/// Pending-ask table: one entry per in-flight `ask`, keyed by correlation id.
#[derive(Default)]
pub struct AskManager {
    pending: DashMap<String, oneshot::Sender<Envelope>>,
}

impl AskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new pending ask and returns a future that resolves when
    /// a matching `RESPONSE` arrives (via [`AskManager::complete`]) or the
    /// timeout elapses.
    pub fn register(&self, correlation_id: &CorrelationId, timeout: Duration) -> PendingAsk {
        let (tx, rx) = oneshot::channel();
        self.pending.insert(correlation_id.as_str().to_string(), tx);
        PendingAsk { rx, timeout }
    }

    /// Resolves a pending ask whose correlation id matches this envelope's,
    /// if any is still pending. Called by the executor whenever an actor
    /// emits a `RESPONSE` event (§4.2 step 6).
    pub fn complete(&self, response: &Envelope) -> bool {
        let Some(correlation_id) = &response.correlation_id else {
            return false;
        };
        if let Some((_, tx)) = self.pending.remove(correlation_id) {
            let _ = tx.send(response.clone());
            true
        } else {
            false
        }
    }

    /// Removes and rejects every pending ask with `SystemShuttingDown`,
    /// dropping the sender so each waiter observes the rejection
    /// immediately (§4.1 `stop()`).
    pub fn cancel_all(&self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// A future-like handle for one in-flight `ask` (§4.6, §5).
pub struct PendingAsk {
    rx: oneshot::Receiver<Envelope>,
    timeout: Duration,
}

impl PendingAsk {
    /// Awaits the response, rejecting with [`AskError::Timeout`] if none
    /// arrives in time, or [`AskError::SystemShuttingDown`] if the sender
    /// was dropped without a response (system shutdown cancelled it).
    pub async fn wait(self) -> Result<Envelope, AskError> {
        match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(envelope)) => Ok(envelope),
            Ok(Err(_)) => Err(AskError::SystemShuttingDown),
            Err(_) => Err(AskError::Timeout),
        }
    }
}
