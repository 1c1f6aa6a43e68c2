//! The behavior contract: `onStart`/`onMessage`/`onStop` and result
//! interpretation (§3 Actor Record, §4.2).
//!
//! Dynamically dispatched rather than compile-time generic over a message
//! type: one `ActorSystem` here hosts many unrelated actor types behind a
//! single location-transparent registry, so `Behavior` must be object-safe
//! (`Arc<dyn Behavior>`). Context is plain JSON, any JSON-shaped value,
//! never a statically-known Rust type, since the actor's "opaque user state"
//! has no fixed shape the runtime can name up front.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde_json::Value;

// Layer 3: Internal module imports
use crate::envelope::Envelope;
use crate::system::ActorContext;

/// An event a behavior emits from `on_message` (§3, §4.2 step 4).
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub kind: String,
    pub payload: Value,
    pub correlation_id: Option<String>,
}

impl EmittedEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Normalizes this event into a full outgoing [`Envelope`] (§4.2 step 4):
    /// `{type, payload, sender, timestamp, version}`.
    pub fn into_envelope(self, sender: crate::address::Address) -> Envelope {
        let mut envelope = Envelope::new(self.kind, self.payload).with_sender(sender);
        if let Some(id) = self.correlation_id {
            envelope = envelope.with_correlation_id(id);
        }
        envelope
    }
}

/// The result of handling one message (§4.2 step 4): an optional context
/// replacement, plus zero or more emitted events.
#[derive(Debug, Clone, Default)]
pub struct BehaviorOutcome {
    pub context: Option<Value>,
    pub emit: Vec<EmittedEvent>,
}

impl BehaviorOutcome {
    /// No context change, no events: the common case.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_context(context: Value) -> Self {
        Self {
            context: Some(context),
            emit: Vec::new(),
        }
    }

    pub fn emit(mut self, event: EmittedEvent) -> Self {
        self.emit.push(event);
        self
    }
}

/// A behavior failure during `on_start`, `on_message` or `on_stop` (§7:
/// `BehaviorFailure`). Boxes the user's real error behind one dynamic type
/// so `Behavior` can stay object-safe across heterogeneous actors.
#[derive(Debug)]
pub struct BehaviorFailure(pub anyhow::Error);

impl fmt::Display for BehaviorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BehaviorFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl<E> From<E> for BehaviorFailure
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Definition of `onStart`/`onMessage`/`onStop` (§4, component table "Behavior
/// Contract"). `on_message` is the only required method; `on_start`/`on_stop`
/// default to no-ops so a behavior that doesn't care about lifecycle hooks
/// can skip them entirely.
#[async_trait]
pub trait Behavior: Send + Sync + 'static {
    /// Called once, before the first message is processed (§4.2 step 1,
    /// invariant I2). Its returned context, if any, replaces the actor's
    /// initial context.
    async fn on_start(&self, _ctx: &ActorContext) -> Result<Option<Value>, BehaviorFailure> {
        Ok(None)
    }

    /// Handles one message (§4.2 steps 2-7). Required.
    async fn on_message(
        &self,
        message: Envelope,
        ctx: &ActorContext,
    ) -> Result<BehaviorOutcome, BehaviorFailure>;

    /// Called once when the actor is stopping (§4.1 `stop`). Errors are
    /// logged, never propagated to the caller of `stop`.
    async fn on_stop(&self, _ctx: &ActorContext) -> Result<(), BehaviorFailure> {
        Ok(())
    }
}
