#![forbid(unsafe_code)]

//! Compiled per-control validation state.
//!
//! # Invariants
//!
//! 1. `chain` is ordered by descending priority; equal priorities keep the
//!    order in which validators were added.
//! 2. `errors` holds the messages of the most recent execution (or
//!    `add_error` calls since); it is never cleared implicitly.
//! 3. `handles` is populated lazily by the presenter and dropped on reset.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::rc::Rc;

use vigil_core::{ControlId, ControlKind, DecorationHandles};

use crate::spec::ValidatorSpec;

/// One validator in a field's chain, with its declared parameters.
#[derive(Debug, Clone)]
pub struct ChainLink {
    spec: Rc<ValidatorSpec>,
    params: Vec<String>,
}

impl ChainLink {
    #[must_use]
    pub fn new(spec: Rc<ValidatorSpec>, params: Vec<String>) -> Self {
        Self { spec, params }
    }

    #[must_use]
    pub fn spec(&self) -> &ValidatorSpec {
        &self.spec
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Declared parameters (slot 1 onwards).
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// A control's ordered validator chain plus its runtime state.
#[derive(Debug, Clone)]
pub struct CompiledField {
    control: ControlId,
    kind: ControlKind,
    chain: Vec<ChainLink>,
    messages: HashMap<String, HashMap<String, String>>,
    touched: bool,
    errors: Vec<String>,
    handles: Option<DecorationHandles>,
}

impl CompiledField {
    #[must_use]
    pub fn new(control: ControlId, kind: ControlKind) -> Self {
        Self {
            control,
            kind,
            chain: Vec::new(),
            messages: HashMap::new(),
            touched: false,
            errors: Vec::new(),
            handles: None,
        }
    }

    #[must_use]
    pub fn control(&self) -> ControlId {
        self.control
    }

    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    #[must_use]
    pub fn chain(&self) -> &[ChainLink] {
        &self.chain
    }

    /// Chain names in execution order.
    #[must_use]
    pub fn chain_names(&self) -> Vec<&str> {
        self.chain.iter().map(ChainLink::name).collect()
    }

    /// Add a declared constraint without re-sorting.
    ///
    /// A name already in the chain keeps its position and takes the new
    /// parameters.
    pub(crate) fn declare(&mut self, spec: Rc<ValidatorSpec>, params: Vec<String>) {
        if let Some(link) = self
            .chain
            .iter_mut()
            .find(|link| !link.name().is_empty() && link.name() == spec.name())
        {
            link.params = params;
            return;
        }
        self.chain.push(ChainLink::new(spec, params));
    }

    pub(crate) fn sort_chain(&mut self) {
        self.chain.sort_by_key(|link| Reverse(link.spec.priority()));
    }

    /// Append an ad-hoc validator and restore priority order.
    pub fn add_validator(&mut self, spec: ValidatorSpec) {
        self.chain.push(ChainLink::new(Rc::new(spec), Vec::new()));
        self.sort_chain();
    }

    #[must_use]
    pub fn has_validator(&self, name: &str) -> bool {
        self.chain.iter().any(|link| link.name() == name)
    }

    /// Declared parameters of the named validator.
    #[must_use]
    pub fn params(&self, name: &str) -> Option<&[String]> {
        self.chain
            .iter()
            .find(|link| link.name() == name)
            .map(ChainLink::params)
    }

    pub(crate) fn set_locale_message(&mut self, locale: &str, validator: &str, template: &str) {
        self.messages
            .entry(locale.to_owned())
            .or_default()
            .insert(validator.to_owned(), template.to_owned());
    }

    /// Field-level message override for a validator in a locale.
    #[must_use]
    pub fn locale_message(&self, locale: &str, validator: &str) -> Option<&str> {
        self.messages
            .get(locale)
            .and_then(|table| table.get(validator))
            .map(String::as_str)
    }

    #[must_use]
    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn set_touched(&mut self, touched: bool) {
        self.touched = touched;
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_errors(&mut self, errors: Vec<String>) {
        self.errors = errors;
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    #[must_use]
    pub fn handles(&self) -> Option<DecorationHandles> {
        self.handles
    }

    pub fn set_handles(&mut self, handles: DecorationHandles) {
        self.handles = Some(handles);
    }

    pub fn clear_handles(&mut self) {
        self.handles = None;
    }
}
