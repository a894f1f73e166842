#![forbid(unsafe_code)]

//! Constraint discovery and chain compilation.
//!
//! Constraints are declared three ways on a control:
//!
//! | Form | Example | Constraint |
//! |------|---------|------------|
//! | namespaced | `data-constraint-minlength="3"` | `minlength`, params `["3"]` |
//! | native | `required`, `min`, `max`, `minlength`, `maxlength`, `pattern` | same name |
//! | type | `type="email"` | `email` |
//!
//! A namespaced declaration suppresses the native or type declaration of the
//! same constraint on the same control. `data-constraint-type="x"` declares
//! constraint `x`. A namespaced attribute ending in `-message` or
//! `-message-<locale>` is a message override, not a constraint.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use vigil_core::{Attribute, ControlId, ControlKind, FormHost};

use crate::catalog::DEFAULT_LOCALE;
use crate::field::CompiledField;
use crate::registry::ValidatorRegistry;

/// Attribute prefix for namespaced declarations.
pub const NAMESPACE: &str = "data-constraint-";

const NATIVE: [&str; 6] = ["required", "min", "max", "minlength", "maxlength", "pattern"];

static MESSAGE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-message(?:-([a-z]{2}(?:_[A-Z]{2})?))?$").expect("message suffix regex is valid")
});

/// A declaration found on a control, in attribute order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Constraint {
        name: String,
        raw: String,
    },
    Message {
        validator: String,
        locale: String,
        template: String,
    },
}

impl Declaration {
    fn constraint(name: &str, raw: &str) -> Self {
        Self::Constraint {
            name: name.to_owned(),
            raw: raw.to_owned(),
        }
    }
}

/// Scan raw attributes for constraint and message declarations.
#[must_use]
pub fn discover(attributes: &[Attribute]) -> Vec<Declaration> {
    let mut overlapping: HashSet<&str> = HashSet::new();
    for attr in attributes {
        if let Some(name) = attr.name.strip_prefix(NAMESPACE) {
            if NATIVE.contains(&name) {
                overlapping.insert(name);
            } else if name == "type" {
                overlapping.insert(attr.value.as_str());
            }
        }
    }

    let mut out = Vec::new();
    for attr in attributes {
        if let Some(name) = attr.name.strip_prefix(NAMESPACE) {
            if let Some(caps) = MESSAGE_SUFFIX.captures(name) {
                let suffix = caps.get(0).map_or(name.len(), |m| m.start());
                out.push(Declaration::Message {
                    validator: name[..suffix].to_owned(),
                    locale: caps
                        .get(1)
                        .map_or(DEFAULT_LOCALE, |m| m.as_str())
                        .to_owned(),
                    template: attr.value.clone(),
                });
            } else if name == "type" {
                out.push(Declaration::constraint(&attr.value, ""));
            } else {
                out.push(Declaration::constraint(name, &attr.value));
            }
        } else if NATIVE.contains(&attr.name.as_str()) {
            if !overlapping.contains(attr.name.as_str()) {
                out.push(Declaration::constraint(&attr.name, &attr.value));
            }
        } else if attr.name == "type" && !overlapping.contains(attr.value.as_str()) {
            out.push(Declaration::constraint(&attr.value, ""));
        }
    }
    out
}

/// Positional parameters for a raw declaration value.
fn split_params(name: &str, raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else if name == "pattern" {
        vec![raw.to_owned()]
    } else {
        raw.split(',').map(str::to_owned).collect()
    }
}

/// Build a field's chain from its declarations.
///
/// Names the registry does not know are skipped.
#[must_use]
pub fn compile(
    control: ControlId,
    kind: ControlKind,
    declarations: &[Declaration],
    registry: &ValidatorRegistry,
) -> CompiledField {
    let mut field = CompiledField::new(control, kind);
    for decl in declarations {
        match decl {
            Declaration::Message {
                validator,
                locale,
                template,
            } => field.set_locale_message(locale, validator, template),
            Declaration::Constraint { name, raw } => {
                if let Some(spec) = registry.get(name) {
                    field.declare(spec, split_params(name, raw));
                }
            }
        }
    }
    field.sort_chain();
    debug!(control = %control, chain = ?field.chain_names(), "field compiled");
    field
}

/// Compile one control of `host`, or `None` if it is not validatable.
#[must_use]
pub fn compile_control(
    host: &dyn FormHost,
    control: ControlId,
    registry: &ValidatorRegistry,
) -> Option<CompiledField> {
    let kind = host.kind(control);
    if !kind.is_validatable() {
        return None;
    }
    let declarations = discover(&host.attributes(control));
    Some(compile(control, kind, &declarations, registry))
}

/// Compile every eligible control of `host`, in document order.
#[must_use]
pub fn compile_form(host: &dyn FormHost, registry: &ValidatorRegistry) -> Vec<CompiledField> {
    host.controls()
        .into_iter()
        .filter_map(|control| compile_control(host, control, registry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::memory::{MemoryControl, MemoryForm};

    fn attrs(pairs: &[(&str, &str)]) -> Vec<Attribute> {
        pairs.iter().map(|(n, v)| Attribute::new(*n, *v)).collect()
    }

    fn constraint_names(decls: &[Declaration]) -> Vec<&str> {
        decls
            .iter()
            .filter_map(|d| match d {
                Declaration::Constraint { name, .. } => Some(name.as_str()),
                Declaration::Message { .. } => None,
            })
            .collect()
    }

    #[test]
    fn native_and_type_declarations() {
        let decls = discover(&attrs(&[("type", "email"), ("required", ""), ("minlength", "3")]));
        assert_eq!(constraint_names(&decls), vec!["email", "required", "minlength"]);
    }

    #[test]
    fn namespaced_wins_over_native() {
        let decls = discover(&attrs(&[
            ("minlength", "3"),
            ("data-constraint-minlength", "5"),
        ]));
        assert_eq!(
            decls,
            vec![Declaration::Constraint {
                name: "minlength".into(),
                raw: "5".into()
            }]
        );
    }

    #[test]
    fn namespaced_type_suppresses_native_type() {
        let decls = discover(&attrs(&[
            ("type", "email"),
            ("data-constraint-type", "email"),
        ]));
        assert_eq!(constraint_names(&decls), vec!["email"]);

        let decls = discover(&attrs(&[
            ("type", "text"),
            ("data-constraint-type", "integer"),
        ]));
        assert_eq!(constraint_names(&decls), vec!["text", "integer"]);
    }

    #[test]
    fn message_declarations() {
        let decls = discover(&attrs(&[
            ("data-constraint-required-message", "Needed"),
            ("data-constraint-required-message-fr", "Requis"),
            ("data-constraint-min-message-en_US", "Too small"),
        ]));
        assert_eq!(
            decls,
            vec![
                Declaration::Message {
                    validator: "required".into(),
                    locale: "en".into(),
                    template: "Needed".into()
                },
                Declaration::Message {
                    validator: "required".into(),
                    locale: "fr".into(),
                    template: "Requis".into()
                },
                Declaration::Message {
                    validator: "min".into(),
                    locale: "en_US".into(),
                    template: "Too small".into()
                },
            ]
        );
    }

    #[test]
    fn params_split_except_pattern() {
        let registry = ValidatorRegistry::with_builtins();
        let decls = discover(&attrs(&[
            ("data-constraint-filetype", "image/png,image/jpeg"),
            ("pattern", r"/^\d{1,3}$/"),
            ("required", ""),
        ]));
        let field = compile(ControlId::from_raw(0), ControlKind::File, &decls, &registry);
        assert_eq!(
            field.params("filetype"),
            Some(&["image/png".to_string(), "image/jpeg".to_string()][..])
        );
        assert_eq!(field.params("pattern"), Some(&[r"/^\d{1,3}$/".to_string()][..]));
        assert_eq!(field.params("required"), Some(&[][..]));
    }

    #[test]
    fn unknown_names_are_dropped_and_chain_sorted() {
        let registry = ValidatorRegistry::with_builtins();
        let decls = discover(&attrs(&[
            ("type", "number"),
            ("data-constraint-bogus", "1"),
            ("minlength", "2"),
            ("required", ""),
        ]));
        let field = compile(ControlId::from_raw(0), ControlKind::Text, &decls, &registry);
        assert_eq!(field.chain_names(), vec!["required", "number", "minlength"]);
    }

    #[test]
    fn hidden_and_submit_are_not_compiled() {
        let registry = ValidatorRegistry::with_builtins();
        let mut form = MemoryForm::new();
        form.add(MemoryControl::input("hidden").attr("required", ""));
        let text = form.add(MemoryControl::input("text").attr("required", ""));
        form.add(MemoryControl::input("submit"));
        let area = form.add(MemoryControl::textarea());
        let fields = compile_form(&form, &registry);
        let ids: Vec<ControlId> = fields.iter().map(CompiledField::control).collect();
        assert_eq!(ids, vec![text, area]);
        assert_eq!(fields[0].chain_names(), vec!["required", "text"]);
        assert!(fields[1].chain().is_empty());
    }
}
