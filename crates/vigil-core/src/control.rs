#![forbid(unsafe_code)]

//! Control identity and classification.

use std::fmt;

/// Opaque handle for one form control, assigned by the host.
///
/// Ids are only meaningful for the host that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlId(u32);

impl ControlId {
    /// Create an id from a raw value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// Opaque handle for a non-control node (decoration containers, error text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node handle from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Behavioral class of a control.
///
/// Only the distinctions the engine acts on are modeled: grouped controls
/// count checked siblings, file inputs carry attachments, multi-selects
/// yield several values, and hidden/submit inputs are never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Free-text `<input>` (text, email, number, password, ...).
    Text,
    /// `<textarea>`.
    TextArea,
    /// `<select>`, optionally with the `multiple` attribute.
    Select { multiple: bool },
    /// `<input type=checkbox>`.
    Checkbox,
    /// `<input type=radio>`.
    Radio,
    /// `<input type=file>`.
    File,
    /// `<input type=hidden...>`.
    Hidden,
    /// `<input type=submit...>`.
    Submit,
    /// `<button>` elements.
    Button,
}

impl ControlKind {
    /// Classify a control from its tag name and `type` attribute.
    ///
    /// `type` values are compared case-insensitively; `hidden` and `submit`
    /// match as prefixes.
    #[must_use]
    pub fn from_markup(tag: &str, type_attr: Option<&str>, multiple: bool) -> Self {
        if tag.eq_ignore_ascii_case("select") {
            return Self::Select { multiple };
        }
        if tag.eq_ignore_ascii_case("textarea") {
            return Self::TextArea;
        }
        if tag.eq_ignore_ascii_case("button") {
            return Self::Button;
        }
        let ty = type_attr.unwrap_or("text").trim().to_ascii_lowercase();
        if ty.starts_with("hidden") {
            Self::Hidden
        } else if ty.starts_with("submit") {
            Self::Submit
        } else {
            match ty.as_str() {
                "checkbox" => Self::Checkbox,
                "radio" => Self::Radio,
                "file" => Self::File,
                _ => Self::Text,
            }
        }
    }

    /// Whether controls of this kind take part in validation.
    #[must_use]
    pub const fn is_validatable(self) -> bool {
        !matches!(self, Self::Hidden | Self::Submit | Self::Button)
    }

    /// Checkbox and radio controls validate against their name group.
    #[must_use]
    pub const fn is_grouped(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }

    /// Controls whose value changes are reported through `change` rather
    /// than `input`, and that never see a meaningful blur-driven edit.
    #[must_use]
    pub const fn reports_change(self) -> bool {
        matches!(
            self,
            Self::Checkbox | Self::Radio | Self::Select { .. } | Self::File
        )
    }
}

/// A raw attribute as it appears on the control, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Metadata for one file attached to a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// File name without path.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type as reported by the host (may be empty).
    pub mime: String,
}

impl FileInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, size: u64, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime: mime.into(),
        }
    }
}
