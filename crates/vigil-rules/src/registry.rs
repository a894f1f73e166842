#![forbid(unsafe_code)]

//! Process-wide validator registry.
//!
//! The registry maps constraint names to [`ValidatorSpec`]s. A thread-local
//! instance seeded with the built-ins serves as the process-wide default;
//! independent instances can be created for isolation and injected into a
//! form controller.
//!
//! # Invariants
//!
//! 1. Registering an existing name replaces the previous spec.
//! 2. Compiled chains hold their own `Rc` to each spec, so later
//!    registrations never change an already-compiled field.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::builtins;
use crate::spec::ValidatorSpec;

thread_local! {
    static GLOBAL_REGISTRY: ValidatorRegistry = ValidatorRegistry::with_builtins();
}

/// Shared handle to a name → spec table. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct ValidatorRegistry {
    specs: Rc<RefCell<HashMap<String, Rc<ValidatorSpec>>>>,
}

impl ValidatorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in validators.
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        builtins::install(&registry);
        registry
    }

    /// The process-wide registry (thread-local).
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Clone::clone)
    }

    /// Insert or replace the spec registered under its name.
    pub fn register(&self, spec: ValidatorSpec) {
        debug!(
            name = spec.name(),
            priority = spec.priority(),
            halt = spec.halts(),
            "validator registered"
        );
        self.specs
            .borrow_mut()
            .insert(spec.name().to_owned(), Rc::new(spec));
    }

    /// Look up a spec by constraint name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<ValidatorSpec>> {
        self.specs.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.borrow().contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.specs.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.borrow().is_empty()
    }
}

/// Register a validator in the process-wide registry.
///
/// Affects forms attached afterwards.
pub fn register(spec: ValidatorSpec) {
    ValidatorRegistry::global().register(spec);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;

    #[test]
    fn builtins_are_present() {
        let registry = ValidatorRegistry::with_builtins();
        for name in [
            "text",
            "required",
            "email",
            "number",
            "integer",
            "minlength",
            "maxlength",
            "min",
            "max",
            "pattern",
            "equals",
            "filesize",
            "filesizetotal",
            "filetype",
        ] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
        let required = registry.get("required").unwrap();
        assert_eq!(required.priority(), 99);
        assert!(required.halts());
        assert_eq!(registry.get("text").unwrap().priority(), 0);
        assert_eq!(registry.get("number").unwrap().priority(), 2);
        assert_eq!(registry.get("email").unwrap().priority(), 1);
    }

    #[test]
    fn register_is_last_write_wins() {
        let registry = ValidatorRegistry::new();
        registry.register(ValidatorSpec::new("x", Predicate::always()).with_priority(3));
        registry.register(ValidatorSpec::new("x", Predicate::always()).with_priority(7));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("x").unwrap().priority(), 7);
    }

    #[test]
    fn clones_share_state() {
        let registry = ValidatorRegistry::new();
        let alias = registry.clone();
        alias.register(ValidatorSpec::new("shared", Predicate::always()));
        assert!(registry.contains("shared"));
        assert_eq!(registry.names(), vec!["shared".to_string()]);
    }

    #[test]
    fn isolated_instances_do_not_leak() {
        let a = ValidatorRegistry::with_builtins();
        let b = ValidatorRegistry::with_builtins();
        a.register(ValidatorSpec::new("only-a", Predicate::always()));
        assert!(!b.contains("only-a"));
    }
}
