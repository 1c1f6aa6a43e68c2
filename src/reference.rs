//! Location-transparent actor handles (`ActorRef`) and the emit-channel
//! subscription handle returned by `ActorSystem::subscribe` (§4, §4.1).
//!
//! A reference never owns the actor's state, only its address and a weak
//! pointer back to the system that can route to it.

// Layer 1: Standard library imports
use std::sync::{Arc, Weak};
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde_json::{json, Value};

// Layer 3: Internal module imports
use crate::address::Address;
use crate::ask::AskError;
use crate::envelope::Envelope;
use crate::system::actor_system::ActorSystemInner;
use crate::system::errors::SystemError;
use crate::system::record::ActorStatsSnapshot;
use crate::transport::RemoteDeliveryError;

/// A handle to a (possibly remote) actor. Cloning a reference is cheap and
/// shares the same underlying system handle (§3).
#[derive(Clone)]
pub struct ActorRef {
    address: Address,
    system: Weak<ActorSystemInner>,
}

impl ActorRef {
    pub(crate) fn new(address: Address, system: Weak<ActorSystemInner>) -> Self {
        Self { address, system }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Fire-and-forget send (§4.1). Local misrouting never surfaces here;
    /// it becomes a dead letter. Only remote-transport failures are returned.
    pub async fn send(
        &self,
        kind: impl Into<String>,
        payload: Value,
    ) -> Result<(), RemoteDeliveryError> {
        let Some(system) = self.system.upgrade() else {
            return Err(RemoteDeliveryError::NotConfigured);
        };
        let envelope = Envelope::new(kind, payload);
        system.enqueue_message(&self.address.path(), envelope).await
    }

    /// Request/response (§4.6). `timeout` overrides the system's
    /// `defaultAskTimeout` when set.
    pub async fn ask(
        &self,
        kind: impl Into<String>,
        payload: Value,
        timeout: Option<Duration>,
    ) -> Result<Envelope, AskError> {
        let Some(system) = self.system.upgrade() else {
            return Err(AskError::SystemShuttingDown);
        };
        system.ask(&self.address, None, kind, payload, timeout).await
    }

    /// Stops this actor (§4.1 `stop`).
    pub async fn stop(&self) -> Result<(), SystemError> {
        let system = self
            .system
            .upgrade()
            .ok_or_else(|| SystemError::ActorNotFound(self.address.clone()))?;
        system.stop_actor(&self.address).await
    }

    /// True while the system still has a live record at this address.
    pub fn is_alive(&self) -> bool {
        self.system
            .upgrade()
            .map(|system| system.has_actor(&self.address))
            .unwrap_or(false)
    }

    pub fn get_stats(&self) -> Option<ActorStatsSnapshot> {
        self.system.upgrade()?.actor_stats(&self.address)
    }

    /// Subscribes `subscriber` to every message *received* by this actor
    /// (the introspection/direct channel, as opposed to
    /// [`ActorSystem::subscribe`](crate::system::ActorSystem::subscribe)'s
    /// emit channel). Takes effect immediately, with no message round-trip.
    pub fn subscribe(&self, event_type: &str, subscriber: &ActorRef) -> Option<DirectSubscription> {
        let system = self.system.upgrade()?;
        system.subscribe_direct(&self.address, event_type, subscriber.address.clone());
        Some(DirectSubscription {
            publisher: self.address.clone(),
            event_type: event_type.to_string(),
            subscriber: subscriber.address.clone(),
            system: Arc::downgrade(&system),
        })
    }
}

/// Handle returned by [`ActorRef::subscribe`]; unsubscribes on request, not
/// on drop.
pub struct DirectSubscription {
    publisher: Address,
    event_type: String,
    subscriber: Address,
    system: Weak<ActorSystemInner>,
}

impl DirectSubscription {
    pub fn unsubscribe(self) {
        if let Some(system) = self.system.upgrade() {
            system.unsubscribe_direct(&self.publisher, &self.event_type, &self.subscriber);
        }
    }
}

/// Handle returned by [`ActorSystem::subscribe`](crate::system::ActorSystem::subscribe);
/// unsubscribing re-enters the publisher's mailbox as an `UNSUBSCRIBE`
/// control envelope, mirroring how the subscription was established.
pub struct EventSubscription {
    publisher: Address,
    subscriber: Address,
    events: Option<Vec<String>>,
    system: Weak<ActorSystemInner>,
}

impl EventSubscription {
    pub(crate) fn new(
        publisher: Address,
        subscriber: Address,
        events: Option<Vec<String>>,
        system: Weak<ActorSystemInner>,
    ) -> Self {
        Self {
            publisher,
            subscriber,
            events,
            system,
        }
    }

    pub async fn unsubscribe(self) {
        let Some(system) = self.system.upgrade() else {
            return;
        };
        let payload = json!({
            "subscriber": self.subscriber.path(),
            "events": self.events,
        });
        let envelope = Envelope::new("UNSUBSCRIBE", payload);
        let _ = system.enqueue_message(&self.publisher.path(), envelope).await;
    }
}
