#![forbid(unsafe_code)]

//! Form events forwarded by the host.
//!
//! The host translates its native notifications into [`FormEvent`]s and
//! hands them to the form controller. Which of them trigger validation is
//! decided by the configured strategy, not here.

use crate::control::ControlId;

/// The kind of interaction the host observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A free-text value changed (keystroke, paste).
    Input,
    /// A committed value change (checkbox toggle, select pick, file chosen).
    Change,
    /// The control lost focus.
    Blur,
    /// The form was reset to its default values.
    Reset,
}

impl EventKind {
    /// Events that restart the submit gate debounce.
    #[must_use]
    pub const fn edits_value(self) -> bool {
        matches!(self, Self::Input | Self::Change)
    }
}

/// One interaction, targeted at a control or at the form itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormEvent {
    pub kind: EventKind,
    /// `None` for form-level events such as [`EventKind::Reset`].
    pub target: Option<ControlId>,
}

impl FormEvent {
    #[must_use]
    pub const fn input(target: ControlId) -> Self {
        Self {
            kind: EventKind::Input,
            target: Some(target),
        }
    }

    #[must_use]
    pub const fn change(target: ControlId) -> Self {
        Self {
            kind: EventKind::Change,
            target: Some(target),
        }
    }

    #[must_use]
    pub const fn blur(target: ControlId) -> Self {
        Self {
            kind: EventKind::Blur,
            target: Some(target),
        }
    }

    #[must_use]
    pub const fn reset() -> Self {
        Self {
            kind: EventKind::Reset,
            target: None,
        }
    }
}
