//! Supervision directives and the policy that selects one (§4.5).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Action applied when a behavior fails during `onStart`, `onMessage` or
/// `onStop` (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Directive {
    /// Discard the failing message, keep context, continue processing the
    /// mailbox. The default when no policy is configured.
    #[default]
    Resume,
    /// Re-invoke `onStart` with a fresh initial context; keep the mailbox;
    /// honors `max_retries`/`retry_delay`. Exhausted retries escalate.
    Restart,
    /// Stop the actor (§4.1 stop flow).
    Stop,
    /// Stop the actor and surface the failure above the core (the core
    /// itself has no parent to escalate to, so this is observably the same
    /// as `Stop` plus a louder log).
    Escalate,
}

/// Per-actor supervision configuration (§4.5).
#[derive(Debug, Clone)]
pub struct SupervisionPolicy {
    pub directive: Directive,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl SupervisionPolicy {
    pub fn resume() -> Self {
        Self {
            directive: Directive::Resume,
            ..Self::default()
        }
    }

    pub fn restart(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            directive: Directive::Restart,
            max_retries,
            retry_delay,
        }
    }

    pub fn stop() -> Self {
        Self {
            directive: Directive::Stop,
            ..Self::default()
        }
    }

    pub fn escalate() -> Self {
        Self {
            directive: Directive::Escalate,
            ..Self::default()
        }
    }
}

impl Default for SupervisionPolicy {
    fn default() -> Self {
        Self {
            directive: Directive::Resume,
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
        }
    }
}
