#![forbid(unsafe_code)]

//! Vigil public facade crate.
//!
//! Re-exports the types a host needs to attach validation to a form, plus the
//! process-wide operations: registering validators, registering locale
//! messages, switching the current locale, and setting default configuration.
//!
//! ```rust
//! use vigil::prelude::*;
//!
//! vigil::register_validator(
//!     ValidatorSpec::new("postcode", Predicate::new(|_, args| {
//!         args.value().is_empty() || args.value().len() == 5
//!     }))
//!     .with_message("Postcodes have five characters"),
//! );
//! vigil::add_messages("fr", [("postcode", "Cinq caractères")]);
//! assert_eq!(vigil::current_locale(), "en");
//! ```

use std::fmt;

use tracing::debug;

// --- Core re-exports -------------------------------------------------------

pub use vigil_core::{
    Attribute, ControlId, ControlKind, DecorationHandles, EventKind, FileInfo, FormEvent,
    FormHost, NodeId, PresentationStyle, Presenter,
};

#[cfg(feature = "test-helpers")]
pub use vigil_core::memory;

// --- Rules re-exports ------------------------------------------------------

pub use vigil_rules::{
    Args, CompiledField, DEFAULT_LOCALE, FieldReport, Message, MessageCatalog, PatternError,
    Predicate, RegexLiteral, Subject, ValidatorRegistry, ValidatorSpec, Verdict,
};

// --- Runtime re-exports ----------------------------------------------------

pub use vigil_runtime::{
    ConfigError, FormConfig, FormConfigOverrides, FormController, FormControllerBuilder,
    Strategy, Target, global_config,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Vigil setup.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be read.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for Vigil setup APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Process-wide operations ----------------------------------------------

/// Register (or replace) a validator for forms attached afterwards.
pub fn register_validator(spec: ValidatorSpec) {
    vigil_rules::registry::register(spec);
}

/// Merge locale templates into the process-wide dictionary.
pub fn add_messages<K, V>(locale: &str, messages: impl IntoIterator<Item = (K, V)>)
where
    K: Into<String>,
    V: Into<String>,
{
    vigil_rules::catalog::add_messages(locale, messages);
}

/// Switch the process-wide current locale.
pub fn set_locale(locale: &str) {
    vigil_rules::catalog::set_locale(locale);
}

#[must_use]
pub fn current_locale() -> String {
    vigil_rules::catalog::current_locale()
}

/// Merge overrides into the default configuration for forms attached
/// afterwards.
pub fn set_global_config(overrides: &FormConfigOverrides) {
    vigil_runtime::set_global_config(overrides);
}

/// Read overrides from a camelCase JSON object and apply them globally.
pub fn set_global_config_json(json: &str) -> Result<()> {
    let overrides = FormConfigOverrides::from_json(json)?;
    debug!(?overrides, "global config read from json");
    set_global_config(&overrides);
    Ok(())
}

/// Attach a controller to `host` using the process-wide defaults.
pub fn attach<H: FormHost + Presenter>(host: &mut H, overrides: FormConfigOverrides) -> FormController {
    FormController::attach(host, overrides)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Args, ControlId, Error, FormConfigOverrides, FormController, FormEvent, FormHost,
        Message, Predicate, Presenter, Result, Strategy, Subject, Target, ValidatorSpec,
    };
}
