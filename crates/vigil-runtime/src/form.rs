#![forbid(unsafe_code)]

//! Form controller.
//!
//! A [`FormController`] owns the compiled fields of one form and drives them
//! from host events. It is the only component that talks to the
//! [`Presenter`].
//!
//! # Lifecycle
//!
//! ```text
//! attach ──▶ poll (deferred work) ──▶ handle_event / validate / poll ... ──▶ destroy
//!                                          │
//!                                          └─ reset event ─▶ reset
//! ```
//!
//! Work that must run after attach returns (eager validation of pre-filled
//! values, the first submit-gate run, the gate run after a reset) is queued
//! and executed by the next [`FormController::poll`].
//!
//! # Invariants
//!
//! 1. Fields validate in document order, each fully resolved before the next.
//! 2. Every mutating operation borrows the controller exclusively, so a
//!    `destroy` can never interleave with an in-flight validation.
//! 3. After `destroy` the controller holds no fields, no pending work and no
//!    deadline; every operation is a no-op.

use std::collections::{HashMap, VecDeque};

use tracing::{Instrument, debug, debug_span, warn};
use vigil_core::{ControlId, EventKind, FormEvent, FormHost, PresentationStyle, Presenter};
use vigil_rules::compiler::compile_form;
use vigil_rules::executor::execute_field;
use vigil_rules::{CompiledField, MessageCatalog, ValidatorRegistry, ValidatorSpec};
use web_time::Instant;

use crate::config::{FormConfig, FormConfigOverrides, global_config};
use crate::strategy::{Reaction, StrategyController};
use crate::submit_gate::{SubmitGate, submit_disabled};

/// Which fields an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    /// Every compiled field.
    #[default]
    All,
    Control(ControlId),
    Controls(Vec<ControlId>),
}

impl From<ControlId> for Target {
    fn from(control: ControlId) -> Self {
        Target::Control(control)
    }
}

impl From<Vec<ControlId>> for Target {
    fn from(controls: Vec<ControlId>) -> Self {
        Target::Controls(controls)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    /// Shown validation of one field.
    Validate(ControlId),
    /// A submit-gate run.
    Gate,
}

/// Builder for a [`FormController`] with injected collaborators.
///
/// Defaults to the process-wide configuration, registry and catalog.
#[derive(Debug, Default)]
pub struct FormControllerBuilder {
    overrides: FormConfigOverrides,
    defaults: Option<FormConfig>,
    registry: Option<ValidatorRegistry>,
    catalog: Option<MessageCatalog>,
}

impl FormControllerBuilder {
    #[must_use]
    pub fn config(mut self, overrides: FormConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Defaults the overrides are merged onto, instead of the global config.
    #[must_use]
    pub fn defaults(mut self, defaults: FormConfig) -> Self {
        self.defaults = Some(defaults);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Compile the host's controls and bind the controller to it.
    pub fn attach<H: FormHost + Presenter>(self, host: &mut H) -> FormController {
        let defaults = self.defaults.unwrap_or_else(global_config);
        let config = self.overrides.resolve(&defaults);
        let registry = self.registry.unwrap_or_else(ValidatorRegistry::global);
        let catalog = self.catalog.unwrap_or_else(MessageCatalog::global);
        FormController::bind(host, config, registry, catalog)
    }
}

/// Validation state and trigger wiring for one form.
#[derive(Debug)]
pub struct FormController {
    fields: Vec<CompiledField>,
    index: HashMap<ControlId, usize>,
    config: FormConfig,
    style: PresentationStyle,
    strategy: StrategyController,
    gate: Option<SubmitGate>,
    deferred: VecDeque<Deferred>,
    submit: Option<ControlId>,
    catalog: MessageCatalog,
    destroyed: bool,
}

impl FormController {
    #[must_use]
    pub fn builder() -> FormControllerBuilder {
        FormControllerBuilder::default()
    }

    /// Attach with the process-wide defaults merged with `overrides`.
    pub fn attach<H: FormHost + Presenter>(host: &mut H, overrides: FormConfigOverrides) -> Self {
        Self::builder().config(overrides).attach(host)
    }

    fn bind<H: FormHost + Presenter>(
        host: &mut H,
        config: FormConfig,
        registry: ValidatorRegistry,
        catalog: MessageCatalog,
    ) -> Self {
        host.suppress_native_validation();
        let fields = compile_form(&*host, &registry);
        let index = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.control(), idx))
            .collect();

        let mut controller = Self {
            style: config.presentation_style(),
            strategy: StrategyController::new(config.validation_strategy),
            gate: config
                .disable_submit_until_valid
                .then(|| SubmitGate::new(config.debounce())),
            deferred: VecDeque::new(),
            submit: host.submit_control(),
            fields,
            index,
            config,
            catalog,
            destroyed: false,
        };

        if controller.config.validate_default_values {
            for field in &mut controller.fields {
                if eager(&*host, field) {
                    field.set_touched(true);
                    controller.strategy.arm(field.control());
                    controller.deferred.push_back(Deferred::Validate(field.control()));
                }
            }
        }
        if controller.gate.is_some() {
            controller.deferred.push_back(Deferred::Gate);
        }

        debug!(
            fields = controller.fields.len(),
            strategy = %controller.config.validation_strategy,
            gated = controller.gate.is_some(),
            deferred = controller.deferred.len(),
            "form attached"
        );
        controller
    }

    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    #[must_use]
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, control: ControlId) -> Option<&CompiledField> {
        self.index.get(&control).map(|&idx| &self.fields[idx])
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Validate `target`, painting results unless `silent`.
    ///
    /// Resolves to `true` iff every targeted field passed. Controls that are
    /// not fields of this form are skipped with a warning.
    pub async fn validate<H: FormHost + Presenter>(
        &mut self,
        host: &mut H,
        target: impl Into<Target>,
        silent: bool,
    ) -> bool {
        let indices = self.resolve(&target.into(), "validate");
        let span = debug_span!("vigil.validate", fields = indices.len(), silent);
        self.run(host, &indices, silent).instrument(span).await
    }

    async fn run<H: FormHost + Presenter>(
        &mut self,
        host: &mut H,
        indices: &[usize],
        silent: bool,
    ) -> bool {
        let mut valid = true;
        for &idx in indices {
            let report = execute_field(&mut self.fields[idx], &*host, &self.catalog).await;
            if !silent {
                self.paint(host, idx);
            }
            valid &= report.valid;
        }
        valid
    }

    fn resolve(&self, target: &Target, operation: &str) -> Vec<usize> {
        match target {
            Target::All => (0..self.fields.len()).collect(),
            Target::Control(control) => self.lookup(*control, operation).into_iter().collect(),
            Target::Controls(controls) => controls
                .iter()
                .filter_map(|control| self.lookup(*control, operation))
                .collect(),
        }
    }

    fn lookup(&self, control: ControlId, operation: &str) -> Option<usize> {
        let idx = self.index.get(&control).copied();
        if idx.is_none() {
            warn!(control = %control, operation, "control is not a validated field");
        }
        idx
    }

    fn paint<P: Presenter>(&mut self, presenter: &mut P, idx: usize) {
        let field = &mut self.fields[idx];
        let handles = match field.handles() {
            Some(handles) => handles,
            None => {
                let handles = presenter.locate(field.control(), &self.style);
                field.set_handles(handles);
                handles
            }
        };
        if field.errors().is_empty() {
            presenter.show_success(field.control(), &handles, &self.style);
        } else {
            presenter.show_error(field.control(), &handles, field.errors(), &self.style);
        }
    }

    /// Fields that currently hold errors, in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<(ControlId, Vec<String>)> {
        self.fields
            .iter()
            .filter(|field| !field.errors().is_empty())
            .map(|field| (field.control(), field.errors().to_vec()))
            .collect()
    }

    /// Cached errors of one field. Empty, with a warning, for a non-field.
    #[must_use]
    pub fn errors_for(&self, control: ControlId) -> &[String] {
        match self.lookup(control, "errors_for") {
            Some(idx) => self.fields[idx].errors(),
            None => &[],
        }
    }

    /// Add an ad-hoc validator to one field's chain.
    pub fn add_validator(&mut self, control: ControlId, spec: ValidatorSpec) {
        if let Some(idx) = self.lookup(control, "add_validator") {
            self.fields[idx].add_validator(spec);
        }
    }

    /// Append an error to a field and show it.
    pub fn add_error<P: Presenter>(
        &mut self,
        presenter: &mut P,
        control: ControlId,
        message: impl Into<String>,
    ) {
        if let Some(idx) = self.lookup(control, "add_error") {
            self.fields[idx].push_error(message);
            self.paint(presenter, idx);
        }
    }

    /// Feed a host event at time `now`.
    pub async fn handle_event<H: FormHost + Presenter>(
        &mut self,
        host: &mut H,
        event: FormEvent,
        now: Instant,
    ) {
        if self.destroyed {
            return;
        }
        if event.kind == EventKind::Reset {
            self.reset(host);
            return;
        }
        if event.kind.edits_value() {
            if let Some(gate) = self.gate.as_mut() {
                gate.restart(now);
            }
        }
        let Some(control) = event.target else {
            return;
        };
        let Some(&idx) = self.index.get(&control) else {
            return;
        };
        let kind = self.fields[idx].kind();
        if self.strategy.react(control, kind, event.kind) == Reaction::Validate {
            self.fields[idx].set_touched(true);
            self.run(host, &[idx], false)
                .instrument(debug_span!("vigil.validate", fields = 1usize, silent = false))
                .await;
        }
    }

    /// Run deferred work and, once its deadline has passed, the submit gate.
    pub async fn poll<H: FormHost + Presenter>(&mut self, host: &mut H, now: Instant) {
        if self.destroyed {
            return;
        }
        if self.gate.as_mut().is_some_and(|gate| gate.poll(now))
            && !self.deferred.contains(&Deferred::Gate)
        {
            self.deferred.push_back(Deferred::Gate);
        }
        while let Some(task) = self.deferred.pop_front() {
            match task {
                Deferred::Validate(control) => {
                    if let Some(&idx) = self.index.get(&control) {
                        self.run(host, &[idx], false).await;
                    }
                }
                Deferred::Gate => self.run_gate(host).await,
            }
        }
    }

    async fn run_gate<H: FormHost + Presenter>(&mut self, host: &mut H) {
        let Some(submit) = self.submit else {
            debug!("no submit control; gate skipped");
            return;
        };
        let all: Vec<usize> = (0..self.fields.len()).collect();
        let valid = self
            .run(host, &all, true)
            .instrument(debug_span!("vigil.validate", fields = all.len(), silent = true))
            .await;
        let changed = self.fields.iter().any(|field| changed(&*host, field));
        let disabled = submit_disabled(valid, self.config.require_change_before_submit, changed);
        host.set_submit_disabled(submit, disabled);
        if let Some(gate) = self.gate.as_mut() {
            gate.record(disabled);
        }
        debug!(valid, changed, disabled, "submit gate evaluated");
    }

    /// Clear touched state, cached errors and decoration handles, remove
    /// every decoration, and queue a gate run when gating is enabled.
    pub fn reset<P: Presenter>(&mut self, presenter: &mut P) {
        if self.destroyed {
            return;
        }
        self.clear(presenter);
        if self.gate.is_some() && !self.deferred.contains(&Deferred::Gate) {
            self.deferred.push_back(Deferred::Gate);
        }
        debug!(fields = self.fields.len(), "form reset");
    }

    fn clear<P: Presenter>(&mut self, presenter: &mut P) {
        for field in &mut self.fields {
            field.set_touched(false);
            field.set_errors(Vec::new());
            field.clear_handles();
        }
        self.strategy.disarm_all();
        presenter.clear_decorations(&self.style);
    }

    /// Tear down: cancel the gate, drop pending work, remove decorations
    /// and release every field. Idempotent.
    pub fn destroy<P: Presenter>(&mut self, presenter: &mut P) {
        if self.destroyed {
            return;
        }
        if let Some(gate) = self.gate.as_mut() {
            gate.cancel();
        }
        self.deferred.clear();
        self.clear(presenter);
        self.fields.clear();
        self.index.clear();
        self.destroyed = true;
        debug!("form destroyed");
    }

    /// Deadline of the pending submit-gate run, if any.
    ///
    /// Work queued for the next [`poll`](Self::poll) regardless of time is
    /// reported by [`has_deferred_work`](Self::has_deferred_work).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gate.as_ref().and_then(SubmitGate::next_deadline)
    }

    #[must_use]
    pub fn has_deferred_work(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Completed submit-gate runs.
    #[must_use]
    pub fn gate_runs(&self) -> u64 {
        self.gate.as_ref().map_or(0, SubmitGate::runs)
    }

    /// Decision of the most recent gate run, `true` meaning disabled.
    #[must_use]
    pub fn last_gate_result(&self) -> Option<bool> {
        self.gate.as_ref().and_then(SubmitGate::last_disabled)
    }
}

/// Whether the live value differs from the authored one.
fn changed(host: &dyn FormHost, field: &CompiledField) -> bool {
    let control = field.control();
    if field.kind().is_grouped() {
        host.checked(control) != host.default_checked(control)
    } else {
        host.value(control) != host.default_value(control)
    }
}

/// Pre-filled fields validate right after attach: changed ones, and
/// required ones already holding a value.
fn eager(host: &dyn FormHost, field: &CompiledField) -> bool {
    changed(host, field)
        || (field.has_validator("required") && !host.value(field.control()).trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use pollster::block_on;
    use std::time::Duration;
    use vigil_core::memory::{Decoration, MemoryControl, MemoryForm};

    fn controller(form: &mut MemoryForm, overrides: FormConfigOverrides) -> FormController {
        FormController::builder()
            .defaults(FormConfig::default())
            .config(overrides)
            .registry(ValidatorRegistry::with_builtins())
            .catalog(MessageCatalog::with_builtin_dictionary())
            .attach(form)
    }

    #[test]
    fn attach_compiles_eligible_controls() {
        let mut form = MemoryForm::new();
        let name = form.add(MemoryControl::input("text").attr("required", ""));
        form.add(MemoryControl::input("hidden"));
        form.add(MemoryControl::input("submit"));
        let ctl = controller(&mut form, FormConfigOverrides::default());
        assert_eq!(ctl.fields().len(), 1);
        assert!(ctl.field(name).is_some());
        assert!(form.native_validation_suppressed());
    }

    #[test]
    fn validate_paints_unless_silent() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("text").attr("required", ""));
        let mut ctl = controller(&mut form, FormConfigOverrides::default());

        assert!(!block_on(ctl.validate(&mut form, Target::All, true)));
        assert_eq!(form.decoration(id), None);
        assert_eq!(ctl.errors_for(id).to_vec(), vec!["This field is required"]);

        assert!(!block_on(ctl.validate(&mut form, id, false)));
        assert_eq!(
            form.decoration(id),
            Some(&Decoration::Error(vec!["This field is required".into()]))
        );

        form.set_value(id, "x");
        assert!(block_on(ctl.validate(&mut form, Target::All, false)));
        assert_eq!(form.decoration(id), Some(&Decoration::Success));
        assert_eq!(form.locate_calls(), 1);
    }

    #[test]
    fn unknown_target_is_a_no_op() {
        let mut form = MemoryForm::new();
        let mut ctl = controller(&mut form, FormConfigOverrides::default());
        let stranger = ControlId::from_raw(42);
        assert!(block_on(ctl.validate(&mut form, stranger, false)));
        assert!(ctl.errors_for(stranger).is_empty());
        ctl.add_validator(stranger, ValidatorSpec::anonymous(vigil_rules::Predicate::always()));
        ctl.add_error(&mut form, stranger, "nope");
        assert!(ctl.errors().is_empty());
    }

    #[test]
    fn add_error_appends_and_shows() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("text"));
        let mut ctl = controller(&mut form, FormConfigOverrides::default());
        ctl.add_error(&mut form, id, "Server says no");
        assert_eq!(ctl.errors(), vec![(id, vec!["Server says no".to_string()])]);
        assert_eq!(
            form.decoration(id),
            Some(&Decoration::Error(vec!["Server says no".into()]))
        );
    }

    #[test]
    fn eager_validation_runs_on_first_poll() {
        let mut form = MemoryForm::new();
        let filled = form.add(
            MemoryControl::input("email")
                .attr("required", "")
                .value("not-an-email"),
        );
        let empty = form.add(MemoryControl::input("text").attr("minlength", "3"));
        let mut ctl = controller(&mut form, FormConfigOverrides::default().disable_submit_until_valid(false));
        assert!(ctl.has_deferred_work());
        assert_eq!(form.decoration(filled), None);

        block_on(ctl.poll(&mut form, Instant::now()));
        assert!(matches!(form.decoration(filled), Some(Decoration::Error(_))));
        assert_eq!(form.decoration(empty), None);
        assert!(ctl.field(filled).unwrap().touched());
    }

    #[test]
    fn hybrid_event_flow() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("text").attr("minlength", "3"));
        let mut ctl = controller(
            &mut form,
            FormConfigOverrides::default()
                .strategy(Strategy::Hybrid)
                .disable_submit_until_valid(false),
        );
        let now = Instant::now();

        form.set_value(id, "a");
        block_on(ctl.handle_event(&mut form, FormEvent::input(id), now));
        assert_eq!(form.decoration(id), None);

        block_on(ctl.handle_event(&mut form, FormEvent::blur(id), now));
        assert!(matches!(form.decoration(id), Some(Decoration::Error(_))));

        form.set_value(id, "abc");
        block_on(ctl.handle_event(&mut form, FormEvent::input(id), now));
        assert_eq!(form.decoration(id), Some(&Decoration::Success));
    }

    #[test]
    fn gate_disables_until_valid_and_changed() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("text").attr("required", ""));
        form.add(MemoryControl::button("submit"));
        let mut ctl = controller(&mut form, FormConfigOverrides::default());
        let t0 = Instant::now();

        block_on(ctl.poll(&mut form, t0));
        assert_eq!(ctl.gate_runs(), 1);
        assert_eq!(form.submit_disabled(), Some(true));
        assert_eq!(form.decoration(id), None);

        form.set_value(id, "hello");
        block_on(ctl.handle_event(&mut form, FormEvent::input(id), t0));
        assert_eq!(ctl.next_deadline(), Some(t0 + Duration::from_millis(50)));
        block_on(ctl.poll(&mut form, t0 + Duration::from_millis(10)));
        assert_eq!(ctl.gate_runs(), 1);
        block_on(ctl.poll(&mut form, t0 + Duration::from_millis(50)));
        assert_eq!(ctl.gate_runs(), 2);
        assert_eq!(ctl.last_gate_result(), Some(false));
        assert_eq!(form.submit_disabled(), Some(false));
    }

    #[test]
    fn gate_without_submit_control_is_skipped() {
        let mut form = MemoryForm::new();
        form.add(MemoryControl::input("text"));
        let mut ctl = controller(&mut form, FormConfigOverrides::default());
        block_on(ctl.poll(&mut form, Instant::now()));
        assert_eq!(ctl.gate_runs(), 0);
        assert_eq!(form.submit_disabled(), None);
    }

    #[test]
    fn reset_clears_state_and_requeues_gate() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("text").attr("required", ""));
        form.add(MemoryControl::input("submit"));
        let mut ctl = controller(&mut form, FormConfigOverrides::default().strategy(Strategy::Hybrid));
        let t0 = Instant::now();
        block_on(ctl.poll(&mut form, t0));
        block_on(ctl.handle_event(&mut form, FormEvent::blur(id), t0));
        assert!(ctl.field(id).unwrap().touched());
        assert!(ctl.field(id).unwrap().handles().is_some());

        form.restore_defaults();
        block_on(ctl.handle_event(&mut form, FormEvent::reset(), t0));
        let field = ctl.field(id).unwrap();
        assert!(!field.touched());
        assert!(field.handles().is_none());
        assert!(field.errors().is_empty());
        assert_eq!(form.clear_calls(), 1);
        assert!(ctl.has_deferred_work());

        block_on(ctl.poll(&mut form, t0));
        assert_eq!(ctl.gate_runs(), 2);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("text").attr("required", ""));
        form.add(MemoryControl::input("submit"));
        let mut ctl = controller(&mut form, FormConfigOverrides::default().strategy(Strategy::Live));
        let t0 = Instant::now();
        block_on(ctl.handle_event(&mut form, FormEvent::input(id), t0));
        assert!(ctl.next_deadline().is_some());

        ctl.destroy(&mut form);
        ctl.destroy(&mut form);
        assert!(ctl.is_destroyed());
        assert_eq!(form.clear_calls(), 1);
        assert!(ctl.fields().is_empty());
        assert_eq!(ctl.next_deadline(), None);

        block_on(ctl.handle_event(&mut form, FormEvent::input(id), t0));
        block_on(ctl.poll(&mut form, t0 + Duration::from_secs(1)));
        assert_eq!(ctl.gate_runs(), 0);
        assert!(block_on(ctl.validate(&mut form, Target::All, false)));
    }
}
