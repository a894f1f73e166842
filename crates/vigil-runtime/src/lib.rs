#![forbid(unsafe_code)]

//! Runtime: configuration, trigger strategies, submit gating and the form
//! controller.
//!
//! # Role in Vigil
//! `vigil-runtime` connects compiled fields from `vigil-rules` to a host that
//! implements the `vigil-core` collaborator traits. The host forwards its
//! events to [`FormController::handle_event`] and calls
//! [`FormController::poll`] when idle or at [`FormController::next_deadline`].
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_runtime::{FormConfigOverrides, FormController, Strategy, Target};
//!
//! let mut form = build_host();
//! let mut controller =
//!     FormController::attach(&mut form, FormConfigOverrides::default().strategy(Strategy::Hybrid));
//! let valid = pollster::block_on(controller.validate(&mut form, Target::All, false));
//! ```

pub mod config;
pub mod form;
pub mod strategy;
pub mod submit_gate;

pub use config::{
    ConfigError, FormConfig, FormConfigOverrides, Strategy, global_config, parse_bool,
    reset_global_config, set_global_config,
};
pub use form::{FormController, FormControllerBuilder, Target};
pub use strategy::{ArmState, Reaction, StrategyController};
pub use submit_gate::{SubmitGate, submit_disabled};
