//! Per-actor processing loop (§4.2 "Message Processing Unit").
//!
//! One call to [`run`] drains everything currently reachable for one actor:
//! `onStart` (once, invariant I2), then messages until the mailbox is empty,
//! applying supervision on any behavior failure (§4.5). A reschedulable unit
//! of work over a shared [`Mailbox`](crate::mailbox::Mailbox) rather than a
//! per-actor tokio task owning an mpsc receiver: this crate drains a mailbox
//! from whichever task currently holds the
//! claim (`ActorRecord::try_claim_schedule`), rather than owning a
//! dedicated task for the actor's entire lifetime, since actors are
//! expected to be numerous and mostly idle.

// Layer 1: Standard library imports
use std::sync::atomic::Ordering;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::address::Address;
use crate::behavior::{BehaviorFailure, EmittedEvent};
use crate::envelope::Envelope;
use crate::supervisor::Directive;
use crate::system::actor_system::ActorSystemInner;
use crate::system::context::ActorContext;
use crate::system::record::{ActorRecord, ExecState};

fn is_reserved_subscription(kind: &str) -> bool {
    matches!(kind, "SUBSCRIBE" | "UNSUBSCRIBE")
}

/// Drains `record`'s mailbox until empty, handling the race where a new
/// message arrives between `dequeue()` returning `None` and the loop flag
/// being cleared (§4.1 routing policy, race-free scheduling note).
pub(crate) async fn run(system: Arc<ActorSystemInner>, record: Arc<ActorRecord>) {
    record.processing_flag.store(true, Ordering::Release);

    if record.exec_state() == ExecState::Fresh && !run_on_start(&system, &record).await {
        record.processing_flag.store(false, Ordering::Release);
        record.clear_schedule();
        return;
    }

    loop {
        match record.mailbox.dequeue() {
            Some(envelope) => {
                record.record_received();
                if is_reserved_subscription(&envelope.kind) {
                    handle_subscription_control(&system, &record, &envelope);
                    continue;
                }
                if !process_one(&system, &record, envelope).await {
                    record.processing_flag.store(false, Ordering::Release);
                    record.clear_schedule();
                    return;
                }
            }
            None => {
                record.processing_flag.store(false, Ordering::Release);
                record.clear_schedule();
                if record.mailbox.is_empty() {
                    return;
                }
                if !record.try_claim_schedule() {
                    return;
                }
                record.processing_flag.store(true, Ordering::Release);
            }
        }
    }
}

async fn run_on_start(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>) -> bool {
    let ctx = ActorContext::new(
        record.address.clone(),
        record.context.lock().clone(),
        None,
        Arc::downgrade(system),
    );

    let outcome = record.behavior.on_start(&ctx).await;
    let emitted = ctx.take_emitted();
    for event in emitted {
        fan_out(system, record, event).await;
    }

    match outcome {
        Ok(new_context) => {
            if let Some(new_context) = new_context {
                *record.context.lock() = new_context;
            }
            record.set_exec_state(ExecState::Started);
            true
        }
        Err(failure) => {
            record.set_exec_state(ExecState::Started);
            record.record_error();
            handle_failure(system, record, failure).await
        }
    }
}

/// Processes one message (§4.2 steps 2-7). Returns `false` if supervision
/// decided to stop the actor, in which case the caller must not dequeue
/// again.
async fn process_one(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>, envelope: Envelope) -> bool {
    notify_direct_subscribers(system, record, &envelope).await;

    let ctx = ActorContext::new(
        record.address.clone(),
        record.context.lock().clone(),
        envelope.correlation_id.clone(),
        Arc::downgrade(system),
    );

    match record.behavior.on_message(envelope, &ctx).await {
        Ok(outcome) => {
            record.record_processed();
            if let Some(new_context) = outcome.context {
                *record.context.lock() = new_context;
            }
            let mut emitted = outcome.emit;
            emitted.extend(ctx.take_emitted());
            for event in emitted {
                fan_out(system, record, event).await;
            }
            true
        }
        Err(failure) => {
            record.record_error();
            handle_failure(system, record, failure).await
        }
    }
}

/// Notifies direct (introspection) subscribers of every message this actor
/// receives, regardless of outcome (subscription.rs design note: "every
/// envelope an actor receives").
async fn notify_direct_subscribers(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>, envelope: &Envelope) {
    let subscribers = system.subscriptions().direct_subscribers(&record.address.path(), &envelope.kind);
    for subscriber in subscribers {
        let forwarded = envelope.clone();
        let _ = system.enqueue_message(&subscriber.path(), forwarded).await;
    }
}

/// Fans an emitted event out to its emit-channel subscribers and, when it is
/// a `RESPONSE`, completes the matching pending `ask` and also notifies any
/// direct `path:RESPONSE` subscribers, so the ask pattern is observable
/// through the same introspection channel as any other received message
/// (§4.2 step 6, §9 dual-path design note).
async fn fan_out(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>, event: EmittedEvent) {
    let envelope = event.into_envelope(record.address.clone());
    let path = record.address.path();

    if envelope.kind == "RESPONSE" {
        system.ask_manager().complete(&envelope);

        let direct_subscribers = system.subscriptions().direct_subscribers(&path, "RESPONSE");
        for subscriber in direct_subscribers {
            let _ = system.enqueue_message(&subscriber.path(), envelope.clone()).await;
        }
    }

    let subscribers = system.subscriptions().emit_subscribers(&path, &envelope.kind);
    for subscriber in subscribers {
        let _ = system.enqueue_message(&subscriber.path(), envelope.clone()).await;
    }
}

/// Applies the `SUBSCRIBE`/`UNSUBSCRIBE` reserved message types before they
/// ever reach a behavior (§6 "reserved message types"). Built into the
/// executor uniformly rather than per-behavior, since subscription
/// bookkeeping is a system concern, not an actor one.
fn handle_subscription_control(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>, envelope: &Envelope) {
    let Some(subscriber_path) = envelope.payload.get("subscriber").and_then(|v| v.as_str()) else {
        return;
    };
    let Ok(subscriber) = Address::parse(subscriber_path) else {
        return;
    };
    let events: Option<Vec<String>> = envelope
        .payload
        .get("events")
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    let publisher_path = record.address.path();
    match envelope.kind.as_str() {
        "SUBSCRIBE" => system.subscriptions().subscribe_emit(&publisher_path, events.as_deref(), subscriber),
        "UNSUBSCRIBE" => system.subscriptions().unsubscribe_emit(&publisher_path, events.as_deref(), &subscriber),
        _ => {}
    }
}

/// Supervision on behavior failure (§4.5). Returns `true` if the actor
/// should keep processing its mailbox, `false` if it has been stopped.
async fn handle_failure(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>, failure: BehaviorFailure) -> bool {
    tracing::warn!(actor = %record.address, error = %failure, "behavior failure");

    match record.policy.directive {
        Directive::Resume => true,
        Directive::Restart => {
            let exceeded = record.backoff.lock().is_limit_exceeded();
            if exceeded {
                tracing::error!(actor = %record.address, "restart budget exhausted, escalating");
                stop_from_executor(system, record).await;
                false
            } else {
                record.backoff.lock().record_restart();
                let delay = record.backoff.lock().calculate_delay();
                tokio::time::sleep(delay).await;
                record.set_exec_state(ExecState::Fresh);
                run_on_start(system, record).await
            }
        }
        Directive::Stop | Directive::Escalate => {
            stop_from_executor(system, record).await;
            false
        }
    }
}

async fn stop_from_executor(system: &Arc<ActorSystemInner>, record: &Arc<ActorRecord>) {
    system.teardown_actor(record).await;
}
