//! Built-in event-collector actor (§6 component table, `spawnEventCollector`).
//!
//! Accumulates every non-control message it receives into its own context,
//! and answers `GET_EVENTS` with a `RESPONSE` event carrying the
//! accumulated list: an actor whose entire behavior is bookkeeping other
//! actors' traffic.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use serde_json::{json, Value};

// Layer 3: Internal module imports
use crate::behavior::{Behavior, BehaviorFailure, BehaviorOutcome, EmittedEvent};
use crate::envelope::Envelope;
use crate::system::ActorContext;

const GET_EVENTS: &str = "GET_EVENTS";
const CLEAR_EVENTS: &str = "CLEAR_EVENTS";
const START_COLLECTING: &str = "START_COLLECTING";
const STOP_COLLECTING: &str = "STOP_COLLECTING";

/// Collects emitted/forwarded messages for later inspection, typically used
/// alongside `ActorSystem::subscribe` in tests and demos.
pub struct EventCollectorBehavior {
    auto_start: bool,
}

impl EventCollectorBehavior {
    pub fn new(auto_start: bool) -> Self {
        Self { auto_start }
    }
}

#[async_trait]
impl Behavior for EventCollectorBehavior {
    async fn on_start(&self, _ctx: &ActorContext) -> Result<Option<Value>, BehaviorFailure> {
        Ok(Some(json!({ "collecting": self.auto_start, "events": [] })))
    }

    async fn on_message(&self, message: Envelope, ctx: &ActorContext) -> Result<BehaviorOutcome, BehaviorFailure> {
        let mut state = ctx.context().clone();
        let collecting = state.get("collecting").and_then(Value::as_bool).unwrap_or(self.auto_start);
        let mut events = state
            .get("events")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        match message.kind.as_str() {
            START_COLLECTING => {
                state["collecting"] = Value::Bool(true);
                Ok(BehaviorOutcome::with_context(state))
            }
            STOP_COLLECTING => {
                state["collecting"] = Value::Bool(false);
                Ok(BehaviorOutcome::with_context(state))
            }
            CLEAR_EVENTS => {
                state["events"] = Value::Array(Vec::new());
                Ok(BehaviorOutcome::with_context(state))
            }
            GET_EVENTS => {
                let mut response = EmittedEvent::new("RESPONSE", Value::Array(events));
                if let Some(correlation_id) = &message.correlation_id {
                    response = response.with_correlation_id(correlation_id.clone());
                }
                Ok(BehaviorOutcome::none().emit(response))
            }
            _ => {
                if collecting {
                    events.push(serde_json::to_value(&message).unwrap_or(Value::Null));
                    state["events"] = Value::Array(events);
                }
                Ok(BehaviorOutcome::with_context(state))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use std::sync::Weak;

    fn ctx(context: Value) -> ActorContext {
        ActorContext::new(Address::local("collector", "1"), context, None, Weak::new())
    }

    #[tokio::test]
    async fn on_start_seeds_empty_event_list() {
        let behavior = EventCollectorBehavior::new(true);
        let started = behavior.on_start(&ctx(Value::Null)).await.expect("ok").expect("context");
        assert_eq!(started["collecting"], Value::Bool(true));
        assert_eq!(started["events"], Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn collects_non_control_messages_when_collecting() {
        let behavior = EventCollectorBehavior::new(true);
        let state = json!({ "collecting": true, "events": [] });
        let outcome = behavior
            .on_message(Envelope::new("PING", Value::Null), &ctx(state))
            .await
            .expect("ok");
        let events = outcome.context.expect("context").get("events").cloned().unwrap();
        assert_eq!(events.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ignores_messages_while_stopped() {
        let behavior = EventCollectorBehavior::new(false);
        let state = json!({ "collecting": false, "events": [] });
        let outcome = behavior
            .on_message(Envelope::new("PING", Value::Null), &ctx(state))
            .await
            .expect("ok");
        let events = outcome.context.expect("context").get("events").cloned().unwrap();
        assert!(events.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_events_emits_response_with_correlation_id() {
        let behavior = EventCollectorBehavior::new(true);
        let state = json!({ "collecting": true, "events": ["x"] });
        let request = Envelope::new(GET_EVENTS, Value::Null).with_correlation_id("c1");
        let outcome = behavior.on_message(request, &ctx(state)).await.expect("ok");
        assert_eq!(outcome.emit.len(), 1);
        assert_eq!(outcome.emit[0].kind, "RESPONSE");
        assert_eq!(outcome.emit[0].correlation_id.as_deref(), Some("c1"));
    }
}
