//! Subscription registry: publisher-path + event-type → subscriber list
//! (§3, §4, design note "the receive event through emit dual path").
//!
//! Two independent channels share one keyed table, a DashMap-of-`Vec`
//! keyed by publisher path:
//!
//! - **Direct** (`path:TYPE`, `path:*`): introspection. Every envelope an
//!   actor *receives* is also handed to whoever subscribed directly on that
//!   actor via [`ActorRef::subscribe`](crate::reference::ActorRef::subscribe).
//! - **Emit** (`path:EMIT:TYPE`, `path:EMIT:*`): pub/sub. An actor's
//!   *emitted* domain events are handed to whoever subscribed via
//!   [`ActorSystem::subscribe`](crate::system::ActorSystem::subscribe).
//!
//! Both are kept because real tests rely on both existing independently
//! (§9): one inspects what an actor was sent, the other what it chose to
//! publish.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::address::Address;

const WILDCARD: &str = "*";

fn direct_key(publisher_path: &str, event_type: &str) -> String {
    format!("{publisher_path}:{event_type}")
}

fn emit_key(publisher_path: &str, event_type: &str) -> String {
    format!("{publisher_path}:EMIT:{event_type}")
}

/// Keyed subscription table (§3). Subscriber entries are addresses only,
/// message-passing is the only way a subscriber is notified, so the
/// registry never holds an owning reference to the subscriber's actor.
#[derive(Default)]
pub struct SubscriptionRegistry {
    table: DashMap<String, Vec<Address>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `subscriber` directly to `publisher`'s incoming messages
    /// of `event_type` (or every message, for `"*"`).
    pub fn subscribe_direct(&self, publisher_path: &str, event_type: &str, subscriber: Address) {
        self.table
            .entry(direct_key(publisher_path, event_type))
            .or_default()
            .push(subscriber);
    }

    pub fn unsubscribe_direct(&self, publisher_path: &str, event_type: &str, subscriber: &Address) {
        if let Some(mut entry) = self.table.get_mut(&direct_key(publisher_path, event_type)) {
            entry.retain(|a| a != subscriber);
        }
    }

    /// Subscribes `subscriber` to `publisher`'s emitted events. `event_types
    /// = None` subscribes to every emitted event (`EMIT:*`).
    pub fn subscribe_emit(
        &self,
        publisher_path: &str,
        event_types: Option<&[String]>,
        subscriber: Address,
    ) {
        match event_types {
            Some(types) if !types.is_empty() => {
                for event_type in types {
                    self.table
                        .entry(emit_key(publisher_path, event_type))
                        .or_default()
                        .push(subscriber.clone());
                }
            }
            _ => {
                self.table
                    .entry(emit_key(publisher_path, WILDCARD))
                    .or_default()
                    .push(subscriber);
            }
        }
    }

    pub fn unsubscribe_emit(
        &self,
        publisher_path: &str,
        event_types: Option<&[String]>,
        subscriber: &Address,
    ) {
        let keys: Vec<String> = match event_types {
            Some(types) if !types.is_empty() => types
                .iter()
                .map(|t| emit_key(publisher_path, t))
                .collect(),
            _ => vec![emit_key(publisher_path, WILDCARD)],
        };
        for key in keys {
            if let Some(mut entry) = self.table.get_mut(&key) {
                entry.retain(|a| a != subscriber);
            }
        }
    }

    /// Subscribers notified for an incoming message of `event_type`:
    /// direct `path:TYPE` plus direct `path:*`.
    pub fn direct_subscribers(&self, publisher_path: &str, event_type: &str) -> Vec<Address> {
        let mut out = self
            .table
            .get(&direct_key(publisher_path, event_type))
            .map(|v| v.clone())
            .unwrap_or_default();
        out.extend(
            self.table
                .get(&direct_key(publisher_path, WILDCARD))
                .map(|v| v.clone())
                .unwrap_or_default(),
        );
        out
    }

    /// Subscribers notified for an emitted event of `event_type`:
    /// `path:EMIT:TYPE` plus `path:EMIT:*`.
    pub fn emit_subscribers(&self, publisher_path: &str, event_type: &str) -> Vec<Address> {
        let mut out = self
            .table
            .get(&emit_key(publisher_path, event_type))
            .map(|v| v.clone())
            .unwrap_or_default();
        out.extend(
            self.table
                .get(&emit_key(publisher_path, WILDCARD))
                .map(|v| v.clone())
                .unwrap_or_default(),
        );
        out
    }
}
