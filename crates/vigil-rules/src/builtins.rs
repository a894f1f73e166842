#![forbid(unsafe_code)]

//! Built-in constraint validators.
//!
//! Every built-in except `required` passes on an empty value: constraints
//! only apply once there is something to check. File validators pass when
//! nothing is attached for the same reason.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use vigil_core::ControlKind;
use vigil_core::numeric::{parse_float_prefix, parse_int_prefix};

use crate::pattern::RegexLiteral;
use crate::predicate::{Args, Predicate, Subject};
use crate::registry::ValidatorRegistry;
use crate::spec::ValidatorSpec;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@']+(\.[^<>()\[\]\\.,;:\s@']+)*)|('.+'))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email regex is valid")
});

/// Register every built-in into `registry`.
pub fn install(registry: &ValidatorRegistry) {
    let patterns = PatternCache::default();
    let specs = [
        ValidatorSpec::new("text", Predicate::always()).with_priority(0),
        ValidatorSpec::new("required", Predicate::new(required))
            .with_priority(99)
            .with_halt(true),
        ValidatorSpec::new("email", Predicate::new(|_, args| email(args.value()))),
        ValidatorSpec::new("number", Predicate::new(|_, args| number(args.value())))
            .with_priority(2),
        ValidatorSpec::new("integer", Predicate::new(|_, args| integer(args.value()))),
        ValidatorSpec::new("minlength", Predicate::new(|_, args| length(args, |len, n| len >= n))),
        ValidatorSpec::new("maxlength", Predicate::new(|_, args| length(args, |len, n| len <= n))),
        ValidatorSpec::new(
            "min",
            Predicate::new(|subject, args| bound(subject, args, |a, b| a >= b, |c, n| c >= n)),
        ),
        ValidatorSpec::new(
            "max",
            Predicate::new(|subject, args| bound(subject, args, |a, b| a <= b, |c, n| c <= n)),
        ),
        ValidatorSpec::new("pattern", Predicate::new(move |_, args| pattern(&patterns, args))),
        ValidatorSpec::new("equals", Predicate::new(equals)),
        ValidatorSpec::new("filesize", Predicate::new(filesize)),
        ValidatorSpec::new("filesizetotal", Predicate::new(filesizetotal)),
        ValidatorSpec::new("filetype", Predicate::new(filetype)),
    ];
    for spec in specs {
        registry.register(spec);
    }
}

fn required(subject: &Subject<'_>, args: &Args) -> bool {
    match subject.kind() {
        ControlKind::Checkbox | ControlKind::Radio => subject.group_count() > 0,
        ControlKind::File => !subject.files().is_empty(),
        _ => !args.value().trim().is_empty(),
    }
}

fn email(value: &str) -> bool {
    value.is_empty() || EMAIL.is_match(value)
}

fn number(value: &str) -> bool {
    value.is_empty() || parse_float_prefix(value).is_some()
}

fn integer(value: &str) -> bool {
    value.is_empty() || value.bytes().all(|b| b.is_ascii_digit())
}

/// Length in UTF-16 code units, as form controls count it.
fn length(args: &Args, cmp: impl Fn(i64, i64) -> bool) -> bool {
    let value = args.value();
    if value.is_empty() {
        return true;
    }
    let Some(limit) = args.param(1).and_then(parse_int_prefix) else {
        return false;
    };
    let len = value.encode_utf16().count() as i64;
    cmp(len, limit)
}

/// `min`/`max`: checkbox groups compare their checked count, everything else
/// compares numerically.
fn bound(
    subject: &Subject<'_>,
    args: &Args,
    numeric: impl Fn(f64, f64) -> bool,
    count: impl Fn(i64, i64) -> bool,
) -> bool {
    let value = args.value();
    if value.is_empty() {
        return true;
    }
    let limit = args.param(1).unwrap_or_default();
    if subject.kind() == ControlKind::Checkbox {
        return parse_int_prefix(limit)
            .is_some_and(|limit| count(subject.group_count() as i64, limit));
    }
    match (parse_float_prefix(value), parse_float_prefix(limit)) {
        (Some(value), Some(limit)) => numeric(value, limit),
        _ => false,
    }
}

/// Compiled `pattern` literals, keyed by their source text. A literal that
/// fails to compile is remembered as `None` and logged once.
#[derive(Default)]
struct PatternCache(RefCell<HashMap<String, Option<Rc<RegexLiteral>>>>);

impl PatternCache {
    fn compiled(&self, literal: &str) -> Option<Rc<RegexLiteral>> {
        if let Some(hit) = self.0.borrow().get(literal) {
            return hit.clone();
        }
        let compiled = match RegexLiteral::parse(literal) {
            Ok(re) => Some(Rc::new(re)),
            Err(e) => {
                warn!(literal, error = %e, "pattern constraint could not be compiled");
                None
            }
        };
        self.0
            .borrow_mut()
            .insert(literal.to_owned(), compiled.clone());
        compiled
    }
}

fn pattern(cache: &PatternCache, args: &Args) -> bool {
    let value = args.value();
    if value.is_empty() {
        return true;
    }
    let Some(literal) = args.param(1) else {
        warn!("pattern constraint declared without a pattern");
        return false;
    };
    cache
        .compiled(literal)
        .is_some_and(|re| re.is_match(value))
}

/// Passes iff both values are empty or both are equal. A selector that
/// matches nothing fails.
fn equals(subject: &Subject<'_>, args: &Args) -> bool {
    let Some(selector) = args.param(1) else {
        return false;
    };
    match subject.lookup_value(selector) {
        Some(other) => other == args.value(),
        None => false,
    }
}

fn file_limit(args: &Args) -> Option<u64> {
    args.param(1)
        .and_then(parse_int_prefix)
        .and_then(|limit| u64::try_from(limit).ok())
}

fn filesize(subject: &Subject<'_>, args: &Args) -> bool {
    let files = subject.files();
    if files.is_empty() {
        return true;
    }
    file_limit(args).is_some_and(|limit| files.iter().all(|f| f.size <= limit))
}

fn filesizetotal(subject: &Subject<'_>, args: &Args) -> bool {
    let files = subject.files();
    if files.is_empty() {
        return true;
    }
    let total: u64 = files.iter().map(|f| f.size).sum();
    file_limit(args).is_some_and(|limit| total <= limit)
}

/// Allowed MIME types come from every parameter slot, since the compiler
/// already split the declaration on commas.
fn filetype(subject: &Subject<'_>, args: &Args) -> bool {
    let files = subject.files();
    if files.is_empty() {
        return true;
    }
    let allowed: Vec<String> = args
        .params()
        .iter()
        .flat_map(|p| p.split(','))
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    files
        .iter()
        .all(|f| allowed.contains(&f.mime.to_lowercase()))
}
