//! Fluent actor-spawn builder (§4.1 `spawn`).
//!
//! Collects plain runtime values (mailbox capacity, overflow policy,
//! supervision policy, initial context) and hands them to the system on
//! `.spawn(behavior)`, rather than a compile-time `Actor<M>`-generic chain.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::Value;

// Layer 3: Internal module imports
use crate::behavior::Behavior;
use crate::mailbox::OverflowPolicy;
use crate::reference::ActorRef;
use crate::supervisor::SupervisionPolicy;
use crate::system::actor_system::ActorSystemInner;
use crate::system::errors::SystemError;

/// Builder returned by `ActorSystem::spawn(kind)` (§4.1).
pub struct ActorSpawnBuilder {
    system: Arc<ActorSystemInner>,
    kind: String,
    id: Option<String>,
    mailbox_capacity: Option<usize>,
    overflow_policy: OverflowPolicy,
    policy: SupervisionPolicy,
    initial_context: Value,
}

impl ActorSpawnBuilder {
    pub(crate) fn new(system: Arc<ActorSystemInner>, kind: impl Into<String>) -> Self {
        Self {
            system,
            kind: kind.into(),
            id: None,
            mailbox_capacity: None,
            overflow_policy: OverflowPolicy::default(),
            policy: SupervisionPolicy::default(),
            initial_context: Value::Null,
        }
    }

    /// Explicit actor id. Defaults to an auto-assigned sequence number.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    pub fn supervision(mut self, policy: SupervisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn initial_context(mut self, context: Value) -> Self {
        self.initial_context = context;
        self
    }

    /// Registers the actor and returns a reference immediately. `onStart`
    /// has not yet run (§4.1); it runs lazily, on the first message this
    /// actor's executor loop processes.
    pub async fn spawn(self, behavior: Arc<dyn Behavior>) -> Result<ActorRef, SystemError> {
        let capacity = self
            .mailbox_capacity
            .unwrap_or(self.system.config().default_mailbox_capacity);
        self.system
            .spawn_actor_internal(
                self.kind,
                self.id,
                capacity,
                self.overflow_policy,
                self.policy,
                self.initial_context,
                behavior,
            )
            .await
    }
}
