#![forbid(unsafe_code)]

//! Form configuration.
//!
//! [`FormConfig`] is the resolved, fully concrete configuration a form runs
//! with. [`FormConfigOverrides`] carries caller-supplied values; resolving it
//! against defaults is a shallow merge where every supplied value wins.
//!
//! Both serialize with camelCase keys, so a host can pass the configuration
//! object it already has as JSON:
//!
//! ```rust
//! use vigil_runtime::config::{FormConfig, FormConfigOverrides, Strategy};
//!
//! let overrides = FormConfigOverrides::from_json(
//!     r#"{"validationStrategy": "hybrid", "errorClass": "is-invalid"}"#,
//! ).unwrap();
//! let config = overrides.resolve(&FormConfig::default());
//! assert_eq!(config.validation_strategy, Strategy::Hybrid);
//! assert_eq!(config.error_class, "is-invalid");
//! assert_eq!(config.success_class, "has-success");
//! ```

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};
use vigil_core::PresentationStyle;

/// Errors produced while reading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A strategy name outside `live`, `blur`, `hybrid`, `off`.
    UnknownStrategy(String),
    /// The configuration object could not be decoded.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownStrategy(name) => write!(f, "unknown validation strategy: {name}"),
            ConfigError::Json(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::UnknownStrategy(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// When validation runs automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Only explicit `validate` calls.
    #[default]
    Off,
    /// Every value edit.
    Live,
    /// Focus loss (change for choice controls).
    Blur,
    /// Blur first, then every edit.
    Hybrid,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Off => "off",
            Strategy::Live => "live",
            Strategy::Blur => "blur",
            Strategy::Hybrid => "hybrid",
        }
    }

    /// Parse a strategy name, falling back to [`Strategy::Off`] with a
    /// warning when it is not recognized.
    #[must_use]
    pub fn parse_or_off(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: ConfigError| {
            warn!(error = %e, "falling back to strategy off");
            Strategy::Off
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Strategy::Off),
            "live" => Ok(Strategy::Live),
            "blur" => Ok(Strategy::Blur),
            "hybrid" => Ok(Strategy::Hybrid),
            _ => Err(ConfigError::UnknownStrategy(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Strategy::parse_or_off(&name))
    }
}

/// Resolved configuration for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// Class of the ancestor receiving state classes.
    pub class_to: String,
    /// Space-separated classes applied on failure.
    pub error_class: String,
    /// Space-separated classes applied on success.
    pub success_class: String,
    /// Class of the container holding the error text node.
    pub error_text_parent: String,
    pub error_text_tag: String,
    pub error_text_class: String,
    /// Keep the submit control disabled while the form is invalid.
    pub disable_submit_until_valid: bool,
    /// Validate pre-filled values right after attaching.
    pub validate_default_values: bool,
    /// Keep the submit control disabled until some value differs from its
    /// default.
    pub require_change_before_submit: bool,
    pub validation_strategy: Strategy,
    /// Quiet period before the submit gate re-validates.
    pub debounce_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            class_to: "form-group".to_owned(),
            error_class: "has-danger".to_owned(),
            success_class: "has-success".to_owned(),
            error_text_parent: "form-group".to_owned(),
            error_text_tag: "div".to_owned(),
            error_text_class: "text-help".to_owned(),
            disable_submit_until_valid: true,
            validate_default_values: true,
            require_change_before_submit: true,
            validation_strategy: Strategy::Off,
            debounce_ms: 50,
        }
    }
}

impl FormConfig {
    /// Decode a complete configuration; missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Presentation settings handed to the [`Presenter`](vigil_core::Presenter).
    #[must_use]
    pub fn presentation_style(&self) -> PresentationStyle {
        PresentationStyle {
            class_to: self.class_to.clone(),
            error_classes: PresentationStyle::split_classes(&self.error_class),
            success_classes: PresentationStyle::split_classes(&self.success_class),
            error_text_parent: self.error_text_parent.clone(),
            error_text_tag: self.error_text_tag.clone(),
            error_text_class: self.error_text_class.clone(),
        }
    }
}

/// Caller-supplied configuration values. `None` keeps the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text_parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_submit_until_valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_default_values: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_change_before_submit: Option<bool>,
    #[serde(
        default,
        deserialize_with = "strategy_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_strategy: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl FormConfigOverrides {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.validation_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn disable_submit_until_valid(mut self, enabled: bool) -> Self {
        self.disable_submit_until_valid = Some(enabled);
        self
    }

    #[must_use]
    pub fn validate_default_values(mut self, enabled: bool) -> Self {
        self.validate_default_values = Some(enabled);
        self
    }

    #[must_use]
    pub fn require_change_before_submit(mut self, enabled: bool) -> Self {
        self.require_change_before_submit = Some(enabled);
        self
    }

    #[must_use]
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = Some(ms);
        self
    }

    /// Shallow merge over `defaults`: every supplied value wins.
    #[must_use]
    pub fn resolve(&self, defaults: &FormConfig) -> FormConfig {
        let d = defaults.clone();
        FormConfig {
            class_to: self.class_to.clone().unwrap_or(d.class_to),
            error_class: self.error_class.clone().unwrap_or(d.error_class),
            success_class: self.success_class.clone().unwrap_or(d.success_class),
            error_text_parent: self.error_text_parent.clone().unwrap_or(d.error_text_parent),
            error_text_tag: self.error_text_tag.clone().unwrap_or(d.error_text_tag),
            error_text_class: self.error_text_class.clone().unwrap_or(d.error_text_class),
            disable_submit_until_valid: self
                .disable_submit_until_valid
                .unwrap_or(d.disable_submit_until_valid),
            validate_default_values: self
                .validate_default_values
                .unwrap_or(d.validate_default_values),
            require_change_before_submit: self
                .require_change_before_submit
                .unwrap_or(d.require_change_before_submit),
            validation_strategy: self.validation_strategy.unwrap_or(d.validation_strategy),
            debounce_ms: self.debounce_ms.unwrap_or(d.debounce_ms),
        }
    }
}

/// An unrecognized name is dropped with a warning, leaving the inherited
/// strategy in place.
fn strategy_override<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Strategy>, D::Error> {
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.and_then(|name| {
        name.parse()
            .map_err(|e: ConfigError| warn!(error = %e, "ignoring strategy override"))
            .ok()
    }))
}

thread_local! {
    static GLOBAL_CONFIG: RefCell<FormConfig> = RefCell::new(FormConfig::default());
}

/// The process-wide default configuration (thread-local).
#[must_use]
pub fn global_config() -> FormConfig {
    GLOBAL_CONFIG.with(|config| config.borrow().clone())
}

/// Merge `overrides` into the process-wide default configuration.
///
/// Affects forms attached afterwards.
pub fn set_global_config(overrides: &FormConfigOverrides) {
    GLOBAL_CONFIG.with(|config| {
        let mut config = config.borrow_mut();
        *config = overrides.resolve(&config);
        debug!(strategy = %config.validation_strategy, "global config updated");
    });
}

/// Restore the process-wide default configuration.
pub fn reset_global_config() {
    GLOBAL_CONFIG.with(|config| *config.borrow_mut() = FormConfig::default());
}

/// Read a boolean flag written as an attribute or query value.
#[must_use]
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
