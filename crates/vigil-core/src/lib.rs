#![forbid(unsafe_code)]

//! Core: control vocabulary, form events, and the host collaborator traits.
//!
//! `vigil-core` knows nothing about validators. It describes the form a
//! validation engine runs against: which controls exist, what their raw
//! attributes and live values are, and how results are painted back.
//!
//! # Role in Vigil
//! The rules crate reads controls through [`FormHost`] while executing
//! predicates. The runtime crate drives [`Presenter`] to decorate fields and
//! gate the submit control. A browser binding implements both traits over the
//! DOM; tests use the in-memory [`memory::MemoryForm`].

pub mod control;
pub mod event;
pub mod host;
pub mod numeric;

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use control::{Attribute, ControlId, ControlKind, FileInfo, NodeId};
pub use event::{EventKind, FormEvent};
pub use host::{DecorationHandles, FormHost, PresentationStyle, Presenter};
