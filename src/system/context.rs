//! Dependencies handed to a behavior on every invocation (§4.2 step 3:
//! "the dependencies record provides: actorId, self reference, emit(event)
//! hook, send(to, msg), ask(to, msg, timeout?), logger, back-reference to
//! the system").

// Layer 1: Standard library imports
use std::sync::Weak;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use serde_json::Value;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::ask::AskError;
use crate::behavior::EmittedEvent;
use crate::envelope::Envelope;
use crate::system::actor_system::ActorSystemInner;

/// Everything a [`Behavior`](crate::behavior::Behavior) method can see and
/// do during one invocation.
///
/// Built fresh by the executor for every call; holding one past the call
/// that produced it is pointless since `context()` is a snapshot.
pub struct ActorContext {
    address: Address,
    context: Value,
    correlation_id: Option<String>,
    emitted: Mutex<Vec<EmittedEvent>>,
    system: Weak<ActorSystemInner>,
}

impl ActorContext {
    pub(crate) fn new(
        address: Address,
        context: Value,
        correlation_id: Option<String>,
        system: Weak<ActorSystemInner>,
    ) -> Self {
        Self {
            address,
            context,
            correlation_id,
            emitted: Mutex::new(Vec::new()),
            system,
        }
    }

    /// This actor's own address (`dependencies.self`/`actorId`).
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The context as it stood when this call began.
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Correlation id of the message being processed, if any (empty during
    /// `onStart`/`onStop`).
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Queues an event for fan-out after this call returns, equivalent to
    /// returning `emit` from `onMessage` (§4.2 step 4). Available from any
    /// hook, not only `onMessage`.
    pub fn emit(&self, event: EmittedEvent) {
        self.emitted.lock().push(event);
    }

    pub(crate) fn take_emitted(&self) -> Vec<EmittedEvent> {
        std::mem::take(&mut self.emitted.lock())
    }

    /// Fire-and-forget send to another actor (`dependencies.send`).
    pub async fn send(&self, to: &Address, kind: impl Into<String>, payload: Value) {
        if let Some(system) = self.system.upgrade() {
            let envelope = Envelope::new(kind, payload).with_sender(self.address.clone());
            let _ = system.enqueue_message(&to.path(), envelope).await;
        }
    }

    /// Request/response to another actor (`dependencies.ask`).
    pub async fn ask(
        &self,
        to: &Address,
        kind: impl Into<String>,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Envelope, AskError> {
        match self.system.upgrade() {
            Some(system) => system.ask(to, self.address.clone(), kind, payload, timeout).await,
            None => Err(AskError::SystemShuttingDown),
        }
    }

    pub fn log_debug(&self, message: &str) {
        tracing::debug!(actor = %self.address, "{message}");
    }

    pub fn log_info(&self, message: &str) {
        tracing::info!(actor = %self.address, "{message}");
    }

    pub fn log_warn(&self, message: &str) {
        tracing::warn!(actor = %self.address, "{message}");
    }

    pub fn log_error(&self, message: &str) {
        tracing::error!(actor = %self.address, "{message}");
    }
}
