//! Bounded per-actor mailbox (§3, §4.3).
//!
//! A FIFO with capacity `N` and a configurable overflow policy. Plain
//! `parking_lot::Mutex<VecDeque<_>>`-backed rather than a tokio mpsc channel:
//! `enqueue`/`dequeue`/`isEmpty`/`stop` all need to be observable synchronously
//! (§4.3), which is a better fit for a directly-owned queue than a channel,
//! and the executor already serializes access per actor.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::Notify;

// Layer 3: Internal module imports
use crate::envelope::Envelope;

/// Overflow policy chosen at actor creation (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// `enqueue` returns false; caller routes the rejected message to the
    /// dead-letter queue. Default per spec.
    #[default]
    DropNewest,
    /// Evict the head, push the new message, always succeed; the evicted
    /// message is routed to the dead-letter queue by the caller.
    DropOldest,
    /// `enqueue` waits until space exists or the mailbox stops.
    Suspend,
}

/// Outcome of a single `enqueue` call.
#[derive(Debug)]
pub enum EnqueueOutcome {
    /// The message was queued.
    Accepted,
    /// The message was rejected (mailbox full under `DropNewest`, or
    /// the mailbox had already been stopped).
    Rejected,
    /// The message was queued, but displaced the oldest queued message
    /// (`DropOldest`); the caller is responsible for dead-lettering it.
    Displaced(Envelope),
}

struct Inner {
    queue: Mutex<VecDeque<Envelope>>,
    capacity: usize,
    policy: OverflowPolicy,
    stopped: std::sync::atomic::AtomicBool,
    space_available: Notify,
}

/// A bounded, FIFO, per-actor mailbox.
///
/// Cloning a `Mailbox` shares the same underlying queue (`Arc`-backed),
/// mirroring how a channel's sender and receiver halves share one buffer.
#[derive(Clone)]
pub struct Mailbox {
    inner: Arc<Inner>,
}

impl Mailbox {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
                capacity,
                policy,
                stopped: std::sync::atomic::AtomicBool::new(false),
                space_available: Notify::new(),
            }),
        }
    }

    /// Enqueues an envelope per the configured overflow policy (§4.3).
    ///
    /// Under `Suspend`, this waits for space to free up (via `dequeue`) or
    /// for `stop()` to be called; on stop it returns `Rejected` rather than
    /// blocking forever.
    pub async fn enqueue(&self, envelope: Envelope) -> EnqueueOutcome {
        loop {
            if self.inner.stopped.load(std::sync::atomic::Ordering::Acquire) {
                return EnqueueOutcome::Rejected;
            }

            let mut queue = self.inner.queue.lock();
            if queue.len() < self.inner.capacity {
                queue.push_back(envelope);
                return EnqueueOutcome::Accepted;
            }

            match self.inner.policy {
                OverflowPolicy::DropNewest => return EnqueueOutcome::Rejected,
                OverflowPolicy::DropOldest => {
                    let evicted = queue.pop_front();
                    queue.push_back(envelope);
                    drop(queue);
                    return match evicted {
                        Some(evicted) => EnqueueOutcome::Displaced(evicted),
                        None => EnqueueOutcome::Accepted,
                    };
                }
                OverflowPolicy::Suspend => {
                    drop(queue);
                    self.inner.space_available.notified().await;
                    continue;
                }
            }
        }
    }

    /// Dequeues the next envelope, if any. Draining continues to work after
    /// `stop()` until the queue is empty (§4.3).
    pub fn dequeue(&self) -> Option<Envelope> {
        let mut queue = self.inner.queue.lock();
        let popped = queue.pop_front();
        if popped.is_some() {
            drop(queue);
            self.inner.space_available.notify_one();
        }
        popped
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Stops the mailbox: future `enqueue` calls return `Rejected` (or, for
    /// `Suspend` waiters, wake up and return `Rejected`). Already-queued
    /// messages remain drainable via `dequeue`.
    pub fn stop(&self) {
        self.inner.stopped.store(true, std::sync::atomic::Ordering::Release);
        self.inner.space_available.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(std::sync::atomic::Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn env(kind: &str) -> Envelope {
        Envelope::new(kind, Value::Null)
    }

    #[tokio::test]
    async fn fifo_order_preserved() {
        let mailbox = Mailbox::new(10, OverflowPolicy::DropNewest);
        mailbox.enqueue(env("a")).await;
        mailbox.enqueue(env("b")).await;
        assert_eq!(mailbox.dequeue().unwrap().kind, "a");
        assert_eq!(mailbox.dequeue().unwrap().kind, "b");
        assert!(mailbox.dequeue().is_none());
    }

    #[tokio::test]
    async fn drop_newest_rejects_when_full() {
        let mailbox = Mailbox::new(1, OverflowPolicy::DropNewest);
        assert!(matches!(
            mailbox.enqueue(env("a")).await,
            EnqueueOutcome::Accepted
        ));
        assert!(matches!(
            mailbox.enqueue(env("b")).await,
            EnqueueOutcome::Rejected
        ));
        assert_eq!(mailbox.dequeue().unwrap().kind, "a");
    }

    #[tokio::test]
    async fn drop_oldest_evicts_head() {
        let mailbox = Mailbox::new(1, OverflowPolicy::DropOldest);
        mailbox.enqueue(env("a")).await;
        let outcome = mailbox.enqueue(env("b")).await;
        match outcome {
            EnqueueOutcome::Displaced(evicted) => assert_eq!(evicted.kind, "a"),
            other => panic!("expected displacement, got {other:?}"),
        }
        assert_eq!(mailbox.dequeue().unwrap().kind, "b");
    }

    #[tokio::test]
    async fn stop_rejects_future_enqueues_but_drains_existing() {
        let mailbox = Mailbox::new(10, OverflowPolicy::DropNewest);
        mailbox.enqueue(env("a")).await;
        mailbox.stop();
        assert!(matches!(
            mailbox.enqueue(env("b")).await,
            EnqueueOutcome::Rejected
        ));
        assert_eq!(mailbox.dequeue().unwrap().kind, "a");
        assert!(mailbox.dequeue().is_none());
    }

    #[tokio::test]
    async fn suspend_unblocks_on_dequeue() {
        let mailbox = Mailbox::new(1, OverflowPolicy::Suspend);
        mailbox.enqueue(env("a")).await;

        let mailbox2 = mailbox.clone();
        let handle = tokio::spawn(async move { mailbox2.enqueue(env("b")).await });

        tokio::task::yield_now().await;
        assert_eq!(mailbox.dequeue().unwrap().kind, "a");

        let outcome = handle.await.expect("task completes");
        assert!(matches!(outcome, EnqueueOutcome::Accepted));
        assert_eq!(mailbox.dequeue().unwrap().kind, "b");
    }

    #[tokio::test]
    async fn suspend_unblocks_on_stop() {
        let mailbox = Mailbox::new(0, OverflowPolicy::Suspend);
        let mailbox2 = mailbox.clone();
        let handle = tokio::spawn(async move { mailbox2.enqueue(env("a")).await });

        tokio::task::yield_now().await;
        mailbox.stop();

        let outcome = handle.await.expect("task completes");
        assert!(matches!(outcome, EnqueueOutcome::Rejected));
    }

    #[test]
    fn is_empty_reflects_live_contents() {
        let mailbox = Mailbox::new(10, OverflowPolicy::DropNewest);
        assert!(mailbox.is_empty());
    }
}
