#![forbid(unsafe_code)]

//! Validation trigger policy.
//!
//! Decides, per field and per host event, whether the field validates.
//!
//! | Strategy | Free-text controls | Choice controls (checkbox, radio, select, file) |
//! |----------|--------------------|-------------------------------------------------|
//! | `off` | never | never |
//! | `live` | `input` | `change` |
//! | `blur` | `blur` | `change` |
//! | `hybrid` | first `blur` arms, then `input` | first `change` arms, then `change` |
//!
//! In hybrid mode a field is `Idle` until armed. Arming validates; an armed
//! field validates on every edit. The arming trigger fires once per arming,
//! and reset returns every field to `Idle`.

use std::collections::HashSet;

use vigil_core::{ControlId, ControlKind, EventKind};

use crate::config::Strategy;

/// Hybrid-mode state of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    Idle,
    Armed,
}

/// What an event means for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Ignore,
    Validate,
}

/// Event that validates `kind` when a strategy reacts to edits.
fn edit_event(kind: ControlKind) -> EventKind {
    if kind.reports_change() {
        EventKind::Change
    } else {
        EventKind::Input
    }
}

/// Event that validates `kind` when a strategy reacts to focus loss.
fn leave_event(kind: ControlKind) -> EventKind {
    if kind.reports_change() {
        EventKind::Change
    } else {
        EventKind::Blur
    }
}

/// Per-form trigger state.
#[derive(Debug, Clone)]
pub struct StrategyController {
    strategy: Strategy,
    armed: HashSet<ControlId>,
}

impl StrategyController {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            armed: HashSet::new(),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub fn state(&self, control: ControlId) -> ArmState {
        if self.armed.contains(&control) {
            ArmState::Armed
        } else {
            ArmState::Idle
        }
    }

    /// Arm a field without an event (eager arming at attach time).
    pub fn arm(&mut self, control: ControlId) {
        self.armed.insert(control);
    }

    /// Return every field to `Idle`.
    pub fn disarm_all(&mut self) {
        self.armed.clear();
    }

    /// Decide whether `event` on a `kind` control validates it.
    ///
    /// One event yields at most one validation, even where the arming and
    /// edit triggers coincide.
    pub fn react(&mut self, control: ControlId, kind: ControlKind, event: EventKind) -> Reaction {
        let fires = match self.strategy {
            Strategy::Off => false,
            Strategy::Live => event == edit_event(kind),
            Strategy::Blur => event == leave_event(kind),
            Strategy::Hybrid => match self.state(control) {
                ArmState::Idle if event == leave_event(kind) => {
                    self.armed.insert(control);
                    true
                }
                ArmState::Idle => false,
                ArmState::Armed => event == edit_event(kind),
            },
        };
        if fires {
            Reaction::Validate
        } else {
            Reaction::Ignore
        }
    }
}
