#![forbid(unsafe_code)]

//! Collaborator traits implemented by the embedding environment.
//!
//! ```text
//! ┌──────────────┐  reads   ┌──────────────┐  writes  ┌──────────────┐
//! │  executor /  │ ───────▶ │   FormHost   │          │  Presenter   │
//! │  compiler    │          └──────────────┘          └──────────────┘
//! └──────────────┘                                      ▲
//! ┌──────────────┐ ─────────────────────────────────────┘
//! │ FormController│
//! └──────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. [`FormHost`] reads are live: group counts and cross-field lookups are
//!    answered from current state on every call, never from a snapshot.
//! 2. [`Presenter`] is only called by the form controller, never by
//!    predicates, so a validation pass in silent mode leaves no trace.

use crate::control::{Attribute, ControlId, ControlKind, FileInfo, NodeId};

/// Read access to the form being validated.
pub trait FormHost {
    /// Every control in the form, in document order, including hidden and
    /// submit inputs (eligibility filtering is the engine's job).
    fn controls(&self) -> Vec<ControlId>;

    /// Behavioral class of the control.
    fn kind(&self, control: ControlId) -> ControlKind;

    /// Raw attributes in document order.
    fn attributes(&self, control: ControlId) -> Vec<Attribute>;

    /// Whether the control carries the named attribute.
    fn has_attribute(&self, control: ControlId, name: &str) -> bool {
        self.attributes(control).iter().any(|attr| attr.name == name)
    }

    /// The control's `name`, used for radio/checkbox grouping.
    fn name(&self, control: ControlId) -> Option<String>;

    /// Live value.
    fn value(&self, control: ControlId) -> String;

    /// Value as initially authored.
    fn default_value(&self, control: ControlId) -> String;

    /// Live checked state (grouped controls only).
    fn checked(&self, control: ControlId) -> bool;

    /// Checked state as initially authored.
    fn default_checked(&self, control: ControlId) -> bool;

    /// Values of the selected options of a select control.
    fn selected_values(&self, control: ControlId) -> Vec<String>;

    /// Files currently attached to a file input.
    fn files(&self, control: ControlId) -> Vec<FileInfo>;

    /// Number of checked inputs in this form sharing the group name.
    fn checked_in_group(&self, group: &str) -> usize;

    /// Resolve a selector (`#id`, `[name=...]`) to a control.
    fn query(&self, selector: &str) -> Option<ControlId>;

    /// The form's submit control, if any.
    fn submit_control(&self) -> Option<ControlId>;
}

/// Handles to the nodes a field is decorated through.
///
/// Resolved once per field by [`Presenter::locate`] and cached until reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecorationHandles {
    /// Ancestor receiving the error/success classes.
    pub class_target: Option<NodeId>,
    /// Node holding the rendered error text.
    pub error_text: Option<NodeId>,
}

/// Class names and element shapes used when decorating fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationStyle {
    /// Class identifying the ancestor that receives state classes.
    pub class_to: String,
    pub error_classes: Vec<String>,
    pub success_classes: Vec<String>,
    /// Class identifying the container that receives the error text node.
    pub error_text_parent: String,
    pub error_text_tag: String,
    pub error_text_class: String,
}

impl PresentationStyle {
    /// Marker class carried by every error text node the engine creates.
    pub const ERROR_TEXT_MARKER: &'static str = "vigil-error";

    /// Split a space-separated class string, dropping empty segments.
    #[must_use]
    pub fn split_classes(classes: &str) -> Vec<String> {
        classes.split_whitespace().map(str::to_owned).collect()
    }

    /// Accessible id linking a control to its error text.
    #[must_use]
    pub fn error_id(control: ControlId) -> String {
        format!("error-{}", control.raw())
    }
}

/// Write access to the form: field decoration and submit gating.
pub trait Presenter {
    /// Opt the form out of the host's native constraint validation.
    fn suppress_native_validation(&mut self) {}

    /// Find (or create) the decoration nodes for a control.
    fn locate(&mut self, control: ControlId, style: &PresentationStyle) -> DecorationHandles;

    /// Mark the field invalid and render its errors.
    fn show_error(
        &mut self,
        control: ControlId,
        handles: &DecorationHandles,
        errors: &[String],
        style: &PresentationStyle,
    );

    /// Remove error decoration and mark the field valid.
    fn show_success(
        &mut self,
        control: ControlId,
        handles: &DecorationHandles,
        style: &PresentationStyle,
    );

    /// Remove every error text node and state class in the form.
    fn clear_decorations(&mut self, style: &PresentationStyle);

    /// Enable or disable the submit control.
    fn set_submit_disabled(&mut self, submit: ControlId, disabled: bool);
}
