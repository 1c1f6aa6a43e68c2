//! Dead-letter queue for undeliverable messages (§3, §4.7).
//!
//! Bounded ring; on overflow the oldest entry is evicted. Synchronous by
//! contract (§4.7): callers, including tests, expect `add` to be observable
//! immediately, so this is `parking_lot::Mutex`-backed rather than behind an
//! async lock.

// Layer 1: Standard library imports
use std::collections::{HashMap, VecDeque};

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

// Layer 3: Internal module imports
use crate::envelope::Envelope;

/// Default ring capacity (§6).
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// A single dead-lettered message (§3).
#[derive(Debug, Clone)]
pub struct DeadLetter {
    pub message: Envelope,
    pub target_path: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub attempts: u32,
    pub error: Option<String>,
}

/// Aggregate statistics over the current ring contents (§6).
#[derive(Debug, Clone, Default)]
pub struct DeadLetterStats {
    pub size: usize,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
    pub message_types: HashMap<String, usize>,
    pub actors: HashMap<String, usize>,
}

struct Inner {
    ring: VecDeque<DeadLetter>,
    max_size: usize,
}

/// A bounded ring of dead letters (§4.7, P7).
pub struct DeadLetterQueue {
    inner: Mutex<Inner>,
}

impl DeadLetterQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ring: VecDeque::with_capacity(max_size.min(1024)),
                max_size,
            }),
        }
    }

    /// Adds an entry, evicting the oldest one if the ring is already full
    /// (P7: the ring never exceeds `max_size`, and the oldest is always the
    /// one evicted).
    pub fn add(
        &self,
        message: Envelope,
        target_path: impl Into<String>,
        reason: impl Into<String>,
        attempts: u32,
        error: Option<String>,
    ) {
        let entry = DeadLetter {
            message,
            target_path: target_path.into(),
            reason: reason.into(),
            timestamp: Utc::now(),
            attempts,
            error,
        };

        let mut inner = self.inner.lock();
        if inner.ring.len() >= inner.max_size {
            inner.ring.pop_front();
        }
        inner.ring.push_back(entry);
    }

    pub fn get_all(&self) -> Vec<DeadLetter> {
        self.inner.lock().ring.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.inner.lock().ring.clear();
    }

    pub fn get_stats(&self) -> DeadLetterStats {
        let inner = self.inner.lock();
        let mut stats = DeadLetterStats {
            size: inner.ring.len(),
            ..Default::default()
        };

        for entry in &inner.ring {
            *stats.message_types.entry(entry.message.kind.clone()).or_insert(0) += 1;
            *stats.actors.entry(entry.target_path.clone()).or_insert(0) += 1;
        }

        stats.oldest_timestamp = inner.ring.front().map(|e| e.timestamp);
        stats.newest_timestamp = inner.ring.back().map(|e| e.timestamp);
        stats
    }
}
