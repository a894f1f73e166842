//! Process-wide operations through the facade.
//!
//! Global state is thread-local and each test runs on its own thread, so
//! tests here do not observe each other's registrations.

use pollster::block_on;
use vigil::prelude::*;
use vigil_core::memory::{Decoration, MemoryControl, MemoryForm};
use web_time::Instant;

#[test]
fn globally_registered_validator_applies_to_new_forms() {
    vigil::register_validator(
        ValidatorSpec::new("even", Predicate::new(|_, args| args.value().len() % 2 == 0))
            .with_message("${0} has odd length")
            .with_priority(5),
    );
    let mut form = MemoryForm::new();
    let id = form.add(MemoryControl::input("text").attr("data-constraint-even", ""));
    let mut ctl = vigil::attach(&mut form, FormConfigOverrides::default());

    form.set_value(id, "abc");
    assert!(!block_on(ctl.validate(&mut form, id, false)));
    assert_eq!(
        form.decoration(id),
        Some(&Decoration::Error(vec!["abc has odd length".into()]))
    );
}

#[test]
fn locale_switch_is_late_bound() {
    let mut form = MemoryForm::new();
    let id = form.add(MemoryControl::input("text").attr("required", ""));
    let mut ctl = vigil::attach(&mut form, FormConfigOverrides::default());

    vigil::add_messages("es", [("required", "Campo obligatorio")]);
    vigil::set_locale("es");
    assert_eq!(vigil::current_locale(), "es");
    assert!(!block_on(ctl.validate(&mut form, Target::All, true)));
    assert_eq!(ctl.errors_for(id).to_vec(), vec!["Campo obligatorio"]);
}

#[test]
fn global_config_json_sets_strategy() {
    vigil::set_global_config_json(r#"{"validationStrategy":"live","disableSubmitUntilValid":false}"#)
        .unwrap();
    assert_eq!(vigil::global_config().validation_strategy, Strategy::Live);

    let mut form = MemoryForm::new();
    let id = form.add(MemoryControl::input("text").attr("minlength", "2"));
    let mut ctl = vigil::attach(&mut form, FormConfigOverrides::default());
    assert_eq!(ctl.config().validation_strategy, Strategy::Live);

    form.set_value(id, "a");
    block_on(ctl.handle_event(&mut form, FormEvent::input(id), Instant::now()));
    assert!(matches!(form.decoration(id), Some(Decoration::Error(_))));
    assert_eq!(ctl.gate_runs(), 0);
}

#[test]
fn unknown_strategy_in_global_json_keeps_previous_default() {
    vigil::set_global_config(&FormConfigOverrides::default().strategy(Strategy::Blur));
    vigil::set_global_config_json(r#"{"validationStrategy":"eventually","debounceMs":20}"#)
        .unwrap();
    let config = vigil::global_config();
    assert_eq!(config.validation_strategy, Strategy::Blur);
    assert_eq!(config.debounce_ms, 20);
}

#[test]
fn malformed_config_json_is_reported() {
    let err = vigil::set_global_config_json("{not json").unwrap_err();
    assert!(err.to_string().starts_with("invalid configuration"));
    assert!(std::error::Error::source(&err).is_some());
    let Error::Config(inner) = err;
    assert!(matches!(inner, vigil::ConfigError::Json(_)));
}

#[test]
fn per_form_overrides_beat_global_config() {
    vigil::set_global_config(&FormConfigOverrides::default().strategy(Strategy::Blur));
    let mut form = MemoryForm::new();
    form.add(MemoryControl::input("text"));
    let ctl = vigil::attach(&mut form, FormConfigOverrides::default().strategy(Strategy::Hybrid));
    assert_eq!(ctl.config().validation_strategy, Strategy::Hybrid);
}
