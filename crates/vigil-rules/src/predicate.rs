#![forbid(unsafe_code)]

//! Predicate calling convention.
//!
//! Every predicate, synchronous or not, is invoked the same way and returns
//! a [`Verdict`] future. Synchronous predicates resolve immediately; the
//! executor awaits both forms identically, so a chain never branches on how a
//! predicate was written.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use vigil_core::{ControlId, ControlKind, FileInfo, FormHost};

/// Eventual pass/fail outcome of one predicate invocation.
pub type Verdict = LocalBoxFuture<'static, bool>;

type PredicateFn = dyn Fn(&Subject<'_>, &Args) -> Verdict;

/// Positional arguments: slot 0 is the value under test, slots 1.. are the
/// constraint's declared parameters in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<String>);

impl Args {
    #[must_use]
    pub fn new(value: impl Into<String>, params: &[String]) -> Self {
        let mut slots = Vec::with_capacity(params.len() + 1);
        slots.push(value.into());
        slots.extend_from_slice(params);
        Self(slots)
    }

    /// Slot 0.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }

    /// Slot `n` (1-based for parameters).
    #[must_use]
    pub fn param(&self, n: usize) -> Option<&str> {
        if n == 0 {
            return None;
        }
        self.0.get(n).map(String::as_str)
    }

    /// Declared parameters, without the value.
    #[must_use]
    pub fn params(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    /// All slots, value first.
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.0
    }
}

/// The control a predicate is evaluating, with live access to its form.
pub struct Subject<'a> {
    host: &'a dyn FormHost,
    control: ControlId,
    kind: ControlKind,
}

impl<'a> Subject<'a> {
    #[must_use]
    pub fn new(host: &'a dyn FormHost, control: ControlId, kind: ControlKind) -> Self {
        Self {
            host,
            control,
            kind,
        }
    }

    #[must_use]
    pub fn host(&self) -> &'a dyn FormHost {
        self.host
    }

    #[must_use]
    pub fn control(&self) -> ControlId {
        self.control
    }

    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    /// Checked controls sharing this control's group name, queried live.
    ///
    /// An unnamed control forms a group of one.
    #[must_use]
    pub fn group_count(&self) -> usize {
        match self.host.name(self.control) {
            Some(name) if !name.is_empty() => self.host.checked_in_group(&name),
            _ => usize::from(self.host.checked(self.control)),
        }
    }

    /// Files currently attached to the control.
    #[must_use]
    pub fn files(&self) -> Vec<FileInfo> {
        self.host.files(self.control)
    }

    /// Live value of another control, located by selector.
    #[must_use]
    pub fn lookup_value(&self, selector: &str) -> Option<String> {
        self.host
            .query(selector)
            .map(|other| self.host.value(other))
    }
}

/// A validator predicate.
#[derive(Clone)]
pub struct Predicate(Rc<PredicateFn>);

impl Predicate {
    /// Wrap a synchronous check.
    pub fn new(check: impl Fn(&Subject<'_>, &Args) -> bool + 'static) -> Self {
        Self(Rc::new(move |subject: &Subject<'_>, args: &Args| {
            future::ready(check(subject, args)).boxed_local()
        }))
    }

    /// Wrap an asynchronous check.
    ///
    /// The returned future must own what it needs: read the subject before
    /// building it.
    pub fn future<F, Fut>(check: F) -> Self
    where
        F: Fn(&Subject<'_>, &Args) -> Fut + 'static,
        Fut: Future<Output = bool> + 'static,
    {
        Self(Rc::new(move |subject: &Subject<'_>, args: &Args| {
            check(subject, args).boxed_local()
        }))
    }

    /// A predicate that always passes.
    #[must_use]
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Invoke the predicate.
    #[must_use]
    pub fn call(&self, subject: &Subject<'_>, args: &Args) -> Verdict {
        (self.0)(subject, args)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
