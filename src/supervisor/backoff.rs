//! Restart rate limiting and exponential backoff for the `Restart` directive
//! (§4.5).
//!
//! Tracks restart history in a sliding time window and computes an
//! exponentially increasing delay between restart attempts, to avoid a
//! restart storm when a behavior fails repeatedly in a tight loop.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none needed for backoff)

/// Restart budget and exponential backoff for one actor record.
///
/// `delay = base_delay * 2^min(restart_count, 10)`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RestartBackoff {
    max_restarts: u32,
    restart_window: Duration,
    restart_history: VecDeque<DateTime<Utc>>,
    base_delay: Duration,
    max_delay: Duration,
}

impl RestartBackoff {
    pub fn new(max_restarts: u32, restart_window: Duration) -> Self {
        Self {
            max_restarts,
            restart_window,
            restart_history: VecDeque::new(),
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
        }
    }

    pub fn with_delays(
        max_restarts: u32,
        restart_window: Duration,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_restarts,
            restart_window,
            restart_history: VecDeque::new(),
            base_delay,
            max_delay,
        }
    }

    /// True once `restart_count()` (after expiring stale entries) has
    /// reached `max_restarts`, checked *before* attempting another
    /// restart, so exactly `max_restarts` restarts are ever granted.
    pub fn is_limit_exceeded(&mut self) -> bool {
        self.cleanup_expired_restarts();
        self.restart_history.len() >= self.max_restarts as usize
    }

    pub fn record_restart(&mut self) {
        self.restart_history.push_front(Utc::now());
    }

    pub fn calculate_delay(&mut self) -> Duration {
        self.cleanup_expired_restarts();

        let restart_count = self.restart_history.len() as u32;
        let capped_count = restart_count.min(10);
        let multiplier = 2u64.pow(capped_count);
        let delay_ms = self.base_delay.as_millis() as u64 * multiplier;

        Duration::from_millis(delay_ms).min(self.max_delay)
    }

    pub fn restart_count(&mut self) -> u32 {
        self.cleanup_expired_restarts();
        self.restart_history.len() as u32
    }

    pub fn reset(&mut self) {
        self.restart_history.clear();
    }

    fn cleanup_expired_restarts(&mut self) {
        let now = Utc::now();
        let Ok(chrono_window) = chrono::Duration::from_std(self.restart_window) else {
            return;
        };
        let window_start = now - chrono_window;

        while let Some(&oldest) = self.restart_history.back() {
            if oldest < window_start {
                self.restart_history.pop_back();
            } else {
                break;
            }
        }
    }
}

impl Default for RestartBackoff {
    /// 5 restarts per 60 seconds, 100ms base delay, 60s cap.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}
