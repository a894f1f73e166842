#![forbid(unsafe_code)]

//! Locale dictionaries and the current-locale pointer.
//!
//! The [`MessageCatalog`] owns one template table per locale plus the
//! process-wide current locale. The executor reads it at failure time, so
//! messages registered after a form was attached still apply to it.
//!
//! # Invariants
//!
//! 1. `add_messages` merges keys into an existing locale table; it never
//!    replaces the table wholesale.
//! 2. The current locale only changes through `set_locale`.
//! 3. `version` advances on every mutation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Dictionary key holding a locale's generic failure message.
pub const DEFAULT_KEY: &str = "default";

/// Last-resort message when no dictionary provides a default.
pub const FALLBACK_MESSAGE: &str = "Please enter a correct value";

const BUILTIN_EN: &[(&str, &str)] = &[
    ("required", "This field is required"),
    ("email", "This field requires a valid email address"),
    ("number", "This field requires a number"),
    ("integer", "This field requires an integer value"),
    ("url", "This field requires a valid website URL"),
    ("tel", "This field requires a valid telephone number"),
    ("maxlength", "This field's length must be at most ${1}"),
    ("minlength", "This field's length must be at least ${1}"),
    ("min", "Minimum value for this field is ${1}"),
    ("max", "Maximum value for this field is ${1}"),
    ("filesize", "Maximum file size is ${1}"),
    ("filesizetotal", "Maximum total file size is ${1}"),
    ("filetype", "Allowed file types: ${1..}"),
    ("pattern", "Please match the requested format"),
    ("equals", "The two fields do not match"),
    (DEFAULT_KEY, FALLBACK_MESSAGE),
];

thread_local! {
    static GLOBAL_CATALOG: MessageCatalog = MessageCatalog::with_builtin_dictionary();
}

#[derive(Debug)]
struct CatalogState {
    dictionaries: HashMap<String, HashMap<String, String>>,
    current: String,
    version: u64,
}

/// Shared handle to locale dictionaries. Clones share state.
#[derive(Clone, Debug)]
pub struct MessageCatalog {
    state: Rc<RefCell<CatalogState>>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCatalog {
    /// An empty catalog with the current locale set to `en`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(CatalogState {
                dictionaries: HashMap::new(),
                current: DEFAULT_LOCALE.to_owned(),
                version: 0,
            })),
        }
    }

    /// A catalog holding the built-in English dictionary.
    #[must_use]
    pub fn with_builtin_dictionary() -> Self {
        let catalog = Self::new();
        catalog.add_messages(DEFAULT_LOCALE, BUILTIN_EN.iter().copied());
        catalog
    }

    /// The process-wide catalog (thread-local).
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_CATALOG.with(Clone::clone)
    }

    /// Merge templates into a locale's dictionary, creating it if needed.
    pub fn add_messages<K, V>(&self, locale: &str, messages: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut state = self.state.borrow_mut();
        let table = state.dictionaries.entry(locale.to_owned()).or_default();
        let before = table.len();
        for (key, template) in messages {
            table.insert(key.into(), template.into());
        }
        let added = table.len() - before;
        state.version += 1;
        debug!(locale, added, "locale messages merged");
    }

    /// Switch the current locale.
    pub fn set_locale(&self, locale: &str) {
        let mut state = self.state.borrow_mut();
        let locale = locale.trim();
        if state.current != locale {
            state.current = locale.to_owned();
            state.version += 1;
        }
    }

    #[must_use]
    pub fn current_locale(&self) -> String {
        self.state.borrow().current.clone()
    }

    /// Raw dictionary lookup.
    #[must_use]
    pub fn entry(&self, locale: &str, key: &str) -> Option<String> {
        self.state
            .borrow()
            .dictionaries
            .get(locale)
            .and_then(|table| table.get(key))
            .cloned()
    }

    /// Dictionary template for a failed validator in `locale`.
    ///
    /// Tries the validator's entry, then the locale's generic default, then
    /// the English default, then [`FALLBACK_MESSAGE`].
    #[must_use]
    pub fn dictionary_template(&self, locale: &str, validator: &str) -> String {
        let state = self.state.borrow();
        let lookup = |locale: &str, key: &str| {
            state
                .dictionaries
                .get(locale)
                .and_then(|table| table.get(key))
        };
        let named = (!validator.is_empty())
            .then(|| lookup(locale, validator))
            .flatten();
        named
            .or_else(|| lookup(locale, DEFAULT_KEY))
            .or_else(|| lookup(DEFAULT_LOCALE, DEFAULT_KEY))
            .cloned()
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_owned())
    }

    /// Mutation counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }
}

/// Convenience: merge messages into the process-wide catalog.
pub fn add_messages<K, V>(locale: &str, messages: impl IntoIterator<Item = (K, V)>)
where
    K: Into<String>,
    V: Into<String>,
{
    MessageCatalog::global().add_messages(locale, messages);
}

/// Convenience: set the process-wide current locale.
pub fn set_locale(locale: &str) {
    MessageCatalog::global().set_locale(locale);
}

/// Convenience: the process-wide current locale.
#[must_use]
pub fn current_locale() -> String {
    MessageCatalog::global().current_locale()
}
