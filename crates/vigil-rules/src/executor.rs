#![forbid(unsafe_code)]

//! Chain execution.
//!
//! Runs a compiled field's chain against the control's current value(s).
//! Execution reads the host but never paints: presentation is the
//! controller's decision.
//!
//! # Invariants
//!
//! 1. Validators run strictly in chain order, each awaited before the next.
//! 2. A failing validator with `halt` ends the chain for the current value.
//! 3. The first invalid value ends execution; errors are not accumulated
//!    across values.
//! 4. The resulting errors replace the field's cached errors.

use tracing::trace;
use vigil_core::{ControlId, ControlKind, FormHost};

use crate::catalog::MessageCatalog;
use crate::field::{ChainLink, CompiledField};
use crate::predicate::{Args, Subject};
use crate::spec::Message;
use crate::template;

/// Outcome of executing one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Values a control is validated against.
///
/// Multi-selects yield each selected option, file inputs each attached file
/// name, and text controls with a `multiple` attribute each comma-separated
/// item. A control with nothing selected or attached yields one empty value.
#[must_use]
pub fn extract_values(host: &dyn FormHost, control: ControlId, kind: ControlKind) -> Vec<String> {
    let values = match kind {
        ControlKind::Select { multiple: true } => host.selected_values(control),
        ControlKind::File => host.files(control).into_iter().map(|f| f.name).collect(),
        ControlKind::Text | ControlKind::TextArea if host.has_attribute(control, "multiple") => host
            .value(control)
            .split(',')
            .map(|item| item.trim().to_owned())
            .collect(),
        _ => vec![host.value(control)],
    };
    if values.is_empty() {
        vec![String::new()]
    } else {
        values
    }
}

/// Message for a failed link.
///
/// First match wins: the spec's computed message, its template, its entry
/// for the current locale, the field's override for the current locale,
/// then the catalog's dictionary chain.
#[must_use]
pub fn resolve_message(
    field: &CompiledField,
    link: &ChainLink,
    args: &Args,
    catalog: &MessageCatalog,
) -> String {
    let locale = catalog.current_locale();
    match link.spec().message() {
        Some(Message::Render(render)) => return render(args.value(), args),
        Some(Message::Text(text)) => return template::render(text, args.slots()),
        Some(Message::Localized(table)) => {
            if let Some(text) = table.get(&locale) {
                return template::render(text, args.slots());
            }
        }
        None => {}
    }
    let name = link.name();
    if !name.is_empty() {
        if let Some(text) = field.locale_message(&locale, name) {
            return template::render(text, args.slots());
        }
    }
    template::render(&catalog.dictionary_template(&locale, name), args.slots())
}

/// Run `field`'s chain and cache the resulting errors on it.
pub async fn execute_field(
    field: &mut CompiledField,
    host: &dyn FormHost,
    catalog: &MessageCatalog,
) -> FieldReport {
    let control = field.control();
    let subject = Subject::new(host, control, field.kind());
    let values = extract_values(host, control, field.kind());

    let mut valid = true;
    let mut errors = Vec::new();
    for value in &values {
        for link in field.chain() {
            let args = Args::new(value.as_str(), link.params());
            let passed = link.spec().predicate().call(&subject, &args).await;
            trace!(control = %control, validator = link.name(), passed, "predicate evaluated");
            if passed {
                continue;
            }
            valid = false;
            errors.push(resolve_message(field, link, &args, catalog));
            if link.spec().halts() {
                break;
            }
        }
        if !valid {
            break;
        }
    }

    field.set_errors(errors.clone());
    FieldReport { valid, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_control;
    use crate::predicate::Predicate;
    use crate::registry::ValidatorRegistry;
    use crate::spec::ValidatorSpec;
    use pollster::block_on;
    use vigil_core::FileInfo;
    use vigil_core::memory::{MemoryControl, MemoryForm};

    struct Fixture {
        form: MemoryForm,
        registry: ValidatorRegistry,
        catalog: MessageCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                form: MemoryForm::new(),
                registry: ValidatorRegistry::with_builtins(),
                catalog: MessageCatalog::with_builtin_dictionary(),
            }
        }

        fn run(&self, control: ControlId) -> FieldReport {
            let mut field = compile_control(&self.form, control, &self.registry).unwrap();
            block_on(execute_field(&mut field, &self.form, &self.catalog))
        }
    }

    #[test]
    fn minlength_scenario() {
        let mut fx = Fixture::new();
        let id = fx.form.add(MemoryControl::input("text").attr("minlength", "3").value("ab"));
        let report = fx.run(id);
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["This field's length must be at least 3"]);
        fx.form.set_value(id, "abc");
        assert_eq!(fx.run(id), FieldReport { valid: true, errors: vec![] });
    }

    #[test]
    fn empty_value_skips_non_required() {
        let mut fx = Fixture::new();
        let id = fx.form.add(
            MemoryControl::input("email")
                .attr("minlength", "3")
                .attr("pattern", r"/^\d+$/"),
        );
        assert!(fx.run(id).valid);
    }

    #[test]
    fn required_halts_chain() {
        let mut fx = Fixture::new();
        let id = fx.form.add(
            MemoryControl::input("email")
                .attr("required", "")
                .attr("minlength", "3")
                .value("   "),
        );
        let report = fx.run(id);
        assert_eq!(report.errors, vec!["This field is required"]);
    }

    #[test]
    fn non_halting_failures_accumulate_in_priority_order() {
        let mut fx = Fixture::new();
        fx.registry.register(
            ValidatorSpec::new("low", Predicate::new(|_, _| false))
                .with_message("low")
                .with_priority(1),
        );
        fx.registry.register(
            ValidatorSpec::new("high", Predicate::new(|_, _| false))
                .with_message("high")
                .with_priority(10),
        );
        let id = fx.form.add(
            MemoryControl::input("text")
                .attr("data-constraint-low", "")
                .attr("data-constraint-high", "")
                .value("x"),
        );
        assert_eq!(fx.run(id).errors, vec!["high", "low"]);
    }

    #[test]
    fn message_fallback_chain() {
        let mut fx = Fixture::new();
        let id = fx.form.add(
            MemoryControl::input("text")
                .attr("required", "")
                .attr("data-constraint-required-message-fr", "Champ requis"),
        );
        fx.catalog.set_locale("fr");
        assert_eq!(fx.run(id).errors, vec!["Champ requis"]);

        fx.catalog.set_locale("de");
        assert_eq!(fx.run(id).errors, vec!["Please enter a correct value"]);

        fx.catalog.add_messages("de", [("required", "Pflichtfeld")]);
        assert_eq!(fx.run(id).errors, vec!["Pflichtfeld"]);
    }

    #[test]
    fn field_message_beats_builtin_dictionary() {
        let mut fx = Fixture::new();
        let id = fx.form.add(
            MemoryControl::input("text")
                .attr("required", "")
                .attr("data-constraint-required-message", "Mine"),
        );
        assert_eq!(fx.catalog.current_locale(), "en");
        assert_eq!(fx.run(id).errors, vec!["Mine"]);

        let explicit = fx.form.add(
            MemoryControl::input("text")
                .attr("required", "")
                .attr("data-constraint-required-message-en", "Also mine"),
        );
        assert_eq!(fx.run(explicit).errors, vec!["Also mine"]);
    }

    #[test]
    fn spec_messages_take_precedence() {
        let mut fx = Fixture::new();
        fx.registry.register(
            ValidatorSpec::new("loc", Predicate::new(|_, _| false)).with_message(Message::localized([
                ("fr", "en français"),
            ])),
        );
        fx.registry.register(
            ValidatorSpec::new("computed", Predicate::new(|_, _| false))
                .with_message(Message::render(|value, args| {
                    format!("{value} vs {}", args.param(1).unwrap_or("?"))
                }))
                .with_priority(0),
        );
        let id = fx.form.add(
            MemoryControl::input("text")
                .attr("data-constraint-loc", "")
                .attr("data-constraint-computed", "7")
                .value("v"),
        );
        assert_eq!(
            fx.run(id).errors,
            vec!["Please enter a correct value", "v vs 7"]
        );
        fx.catalog.set_locale("fr");
        assert_eq!(fx.run(id).errors[0], "en français");
    }

    #[test]
    fn templates_receive_value_and_params() {
        let mut fx = Fixture::new();
        fx.catalog
            .add_messages("en", [("maxlength", "${0} is longer than ${1}")]);
        let id = fx.form.add(MemoryControl::input("text").attr("maxlength", "2").value("abc"));
        assert_eq!(fx.run(id).errors, vec!["abc is longer than 2"]);
    }

    #[test]
    fn async_predicates_are_awaited_in_order() {
        let mut fx = Fixture::new();
        fx.registry.register(
            ValidatorSpec::new(
                "taken",
                Predicate::future(|_, args| {
                    let value = args.value().to_owned();
                    async move { value != "admin" }
                }),
            )
            .with_message("${0} is taken")
            .with_halt(true)
            .with_priority(5),
        );
        let id = fx.form.add(
            MemoryControl::input("text")
                .attr("data-constraint-taken", "")
                .attr("minlength", "8")
                .value("admin"),
        );
        assert_eq!(fx.run(id).errors, vec!["admin is taken"]);
    }

    #[test]
    fn first_invalid_value_wins() {
        let mut fx = Fixture::new();
        let id = fx.form.add(
            MemoryControl::input("email")
                .attr("multiple", "")
                .value("a@example.com, nope, also-bad"),
        );
        let report = fx.run(id);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn multi_select_values() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::select().attr("multiple", ""));
        let kind = form.kind(id);
        assert_eq!(extract_values(&form, id, kind), vec![String::new()]);
        form.set_selected(id, &["a", "b"]);
        assert_eq!(extract_values(&form, id, kind), vec!["a", "b"]);
    }

    #[test]
    fn file_values_are_names() {
        let mut form = MemoryForm::new();
        let id = form.add(MemoryControl::input("file").file(FileInfo::new("a.txt", 1, "text/plain")));
        assert_eq!(extract_values(&form, id, ControlKind::File), vec!["a.txt"]);
    }

    #[test]
    fn errors_are_cached_on_field() {
        let mut fx = Fixture::new();
        let id = fx.form.add(MemoryControl::input("text").attr("required", ""));
        let mut field = compile_control(&fx.form, id, &fx.registry).unwrap();
        block_on(execute_field(&mut field, &fx.form, &fx.catalog));
        assert_eq!(field.errors().to_vec(), vec!["This field is required"]);
        fx.form.set_value(id, "ok");
        block_on(execute_field(&mut field, &fx.form, &fx.catalog));
        assert!(field.errors().is_empty());
    }
}
