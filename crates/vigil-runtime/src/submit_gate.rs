#![forbid(unsafe_code)]

//! Debounced submit gating.
//!
//! Every value edit anywhere in the form restarts one shared deadline. When
//! the host polls past the deadline the gate fires once: the controller runs
//! a silent full validation and enables or disables the submit control.
//!
//! Time is passed in explicitly so the gate stays deterministic under test.
//!
//! # Invariants
//!
//! - **Trailing edge**: a burst of edits yields one firing, after the last
//!   edit plus the delay.
//! - **Single timer**: at most one deadline is pending.
//! - **Cancel is final for the pending deadline**: after `cancel`, `poll`
//!   never fires until the next `restart`.

use std::time::Duration;

use web_time::Instant;

/// Whether the submit control should be disabled.
///
/// Disabled while the form is invalid, or, when a change is required, while
/// every field still holds its default.
#[must_use]
pub fn submit_disabled(valid: bool, require_change: bool, any_changed: bool) -> bool {
    !valid || (require_change && !any_changed)
}

/// Debounce timer plus bookkeeping of completed runs.
#[derive(Debug, Clone)]
pub struct SubmitGate {
    delay: Duration,
    deadline: Option<Instant>,
    runs: u64,
    last_disabled: Option<bool>,
}

impl SubmitGate {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            runs: 0,
            last_disabled: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending deadline with `now + delay`.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Whether the pending deadline has passed. Consumes it when it has.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a completed run and its decision.
    pub fn record(&mut self, disabled: bool) {
        self.runs += 1;
        self.last_disabled = Some(disabled);
    }

    /// Completed runs.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Decision of the most recent run, `true` meaning disabled.
    #[must_use]
    pub fn last_disabled(&self) -> Option<bool> {
        self.last_disabled
    }
}
