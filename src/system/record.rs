//! The actor record: everything the system owns about one live actor (§3
//! "Actor Record").

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;

// Layer 3: Internal module imports
use crate::address::Address;
use crate::behavior::Behavior;
use crate::mailbox::Mailbox;
use crate::supervisor::{RestartBackoff, SupervisionPolicy};

/// Lifecycle state of one actor record (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Fresh,
    Started,
    Stopping,
    Stopped,
}

/// Point-in-time snapshot of an actor's counters (§3 `stats`).
#[derive(Debug, Clone)]
pub struct ActorStatsSnapshot {
    pub messages_received: u64,
    pub messages_processed: u64,
    pub errors: u64,
    pub start_time: DateTime<Utc>,
}

struct ActorStats {
    messages_received: AtomicU64,
    messages_processed: AtomicU64,
    errors: AtomicU64,
    start_time: DateTime<Utc>,
}

/// The per-actor record owned by the system, keyed by path (§3).
///
/// `context` and `exec_state` are only ever mutated by the executor that
/// owns this record's processing loop (invariant I1); other readers may see
/// slightly stale values, which is acceptable for stats (§5).
pub struct ActorRecord {
    pub address: Address,
    pub behavior: Arc<dyn Behavior>,
    pub mailbox: Mailbox,
    pub context: Mutex<Value>,
    pub exec_state: Mutex<ExecState>,
    /// There is an active executor schedule for this actor.
    pub loop_flag: AtomicBool,
    /// The executor is currently running synchronously for this actor.
    pub processing_flag: AtomicBool,
    pub policy: SupervisionPolicy,
    pub backoff: Mutex<RestartBackoff>,
    stats: ActorStats,
}

impl ActorRecord {
    pub fn new(
        address: Address,
        behavior: Arc<dyn Behavior>,
        mailbox: Mailbox,
        initial_context: Value,
        policy: SupervisionPolicy,
    ) -> Self {
        let retry_window = policy.retry_delay.max(std::time::Duration::from_millis(1)) * 10;
        Self {
            address,
            behavior,
            mailbox,
            context: Mutex::new(initial_context),
            exec_state: Mutex::new(ExecState::Fresh),
            loop_flag: AtomicBool::new(false),
            processing_flag: AtomicBool::new(false),
            backoff: Mutex::new(RestartBackoff::with_delays(
                policy.max_retries,
                retry_window,
                policy.retry_delay,
                std::time::Duration::from_secs(60),
            )),
            policy,
            stats: ActorStats {
                messages_received: AtomicU64::new(0),
                messages_processed: AtomicU64::new(0),
                errors: AtomicU64::new(0),
                start_time: Utc::now(),
            },
        }
    }

    pub fn exec_state(&self) -> ExecState {
        *self.exec_state.lock()
    }

    pub fn set_exec_state(&self, state: ExecState) {
        *self.exec_state.lock() = state;
    }

    pub fn record_received(&self) {
        self.stats.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self) {
        self.stats.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats_snapshot(&self) -> ActorStatsSnapshot {
        ActorStatsSnapshot {
            messages_received: self.stats.messages_received.load(Ordering::Relaxed),
            messages_processed: self.stats.messages_processed.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
            start_time: self.stats.start_time,
        }
    }

    /// Claims the right to schedule this actor's loop: sets `loop_flag`
    /// before the caller dispatches, so a second producer observing the
    /// flag already set will not double-schedule (§4.1 routing policy,
    /// race-free scheduling note).
    pub fn try_claim_schedule(&self) -> bool {
        self.loop_flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn clear_schedule(&self) {
        self.loop_flag.store(false, Ordering::Release);
    }

    pub fn is_processing(&self) -> bool {
        self.processing_flag.load(Ordering::Acquire)
    }
}
