#![forbid(unsafe_code)]

//! Validator resolution and execution.
//!
//! This crate turns declarative constraints into executable validator chains:
//! - [`ValidatorRegistry`]: name → [`ValidatorSpec`] lookup table, with a
//!   thread-local process-wide instance seeded with the built-ins
//! - [`compiler`]: attribute discovery and chain compilation per control
//! - [`executor`]: ordered, halt-aware chain execution with async predicates
//! - [`MessageCatalog`]: locale dictionaries and the current-locale pointer
//!
//! # Example
//!
//! ```rust
//! use vigil_rules::{Predicate, ValidatorRegistry, ValidatorSpec};
//!
//! let registry = ValidatorRegistry::with_builtins();
//! registry.register(
//!     ValidatorSpec::new("even", Predicate::new(|_, args| {
//!         args.value().len() % 2 == 0
//!     }))
//!     .with_message("Length of ${0} must be even")
//!     .with_priority(5),
//! );
//! assert!(registry.contains("even"));
//! assert!(registry.contains("required"));
//! ```

pub mod builtins;
pub mod catalog;
pub mod compiler;
pub mod executor;
pub mod field;
pub mod pattern;
pub mod predicate;
pub mod registry;
pub mod spec;
pub mod template;

pub use catalog::{DEFAULT_LOCALE, MessageCatalog};
pub use compiler::{Declaration, compile, compile_control, compile_form, discover};
pub use executor::{FieldReport, execute_field, extract_values, resolve_message};
pub use field::{ChainLink, CompiledField};
pub use pattern::{PatternError, RegexLiteral};
pub use predicate::{Args, Predicate, Subject, Verdict};
pub use registry::ValidatorRegistry;
pub use spec::{Message, ValidatorSpec};
