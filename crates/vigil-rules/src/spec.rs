#![forbid(unsafe_code)]

//! Validator specifications.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::predicate::{Args, Predicate};

/// Default priority for validators that do not set one.
pub const DEFAULT_PRIORITY: i32 = 1;

type RenderFn = dyn Fn(&str, &Args) -> String;

/// A validator's own failure message.
#[derive(Clone)]
pub enum Message {
    /// Template rendered with positional substitution.
    Text(String),
    /// Templates keyed by locale; used only when the current locale has one.
    Localized(HashMap<String, String>),
    /// Computed from the value and the argument slots.
    Render(Rc<RenderFn>),
}

impl Message {
    /// Build a computed message.
    pub fn render(f: impl Fn(&str, &Args) -> String + 'static) -> Self {
        Self::Render(Rc::new(f))
    }

    /// Build a per-locale message table.
    pub fn localized<L, T>(entries: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        Self::Localized(
            entries
                .into_iter()
                .map(|(locale, template)| (locale.into(), template.into()))
                .collect(),
        )
    }
}

impl From<&str> for Message {
    fn from(template: &str) -> Self {
        Self::Text(template.to_owned())
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Self::Text(template)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Localized(map) => f.debug_tuple("Localized").field(map).finish(),
            Self::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// A named validator: predicate plus ordering and message metadata.
///
/// # Example
///
/// ```rust
/// use vigil_rules::{Predicate, ValidatorSpec};
///
/// let spec = ValidatorSpec::new("nonzero", Predicate::new(|_, args| args.value() != "0"))
///     .with_message("Zero is not allowed")
///     .with_priority(10)
///     .with_halt(true);
/// assert_eq!(spec.priority(), 10);
/// assert!(spec.halts());
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorSpec {
    name: String,
    predicate: Predicate,
    message: Option<Message>,
    priority: i32,
    halt: bool,
}

impl ValidatorSpec {
    /// Create a spec with default priority and no halt.
    pub fn new(name: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            predicate,
            message: None,
            priority: DEFAULT_PRIORITY,
            halt: false,
        }
    }

    /// An unnamed spec for a single field.
    ///
    /// Locale overrides and dictionary entries are looked up by name, so an
    /// anonymous spec falls back to its own message or the generic default.
    pub fn anonymous(predicate: Predicate) -> Self {
        Self::new(String::new(), predicate)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_optional_message(mut self, message: Option<Message>) -> Self {
        self.message = message;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_halt(mut self, halt: bool) -> Self {
        self.halt = halt;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether a failure stops the rest of the chain for the current value.
    #[must_use]
    pub fn halts(&self) -> bool {
        self.halt
    }
}
