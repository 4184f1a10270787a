//! Flow configuration.
//!
//! All fields have defaults, so an empty JSON object or TOML document is a
//! valid configuration.

use crate::core::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PROCESSING_DELAY_MS: u64 = 1000;
pub const DEFAULT_AUTO_DISMISS_MS: u64 = 5000;

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Display strings handed to the presentation layer.
///
/// These are opaque: the flow never inspects or validates them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLabels {
    /// Trigger label while the trigger is usable.
    pub idle: String,
    /// Trigger label while a submission is in flight.
    pub busy: String,
    pub success_title: String,
    pub success_body: String,
    /// Message shown when a failure carries no message of its own.
    pub failure: String,
}

impl Default for FlowLabels {
    fn default() -> Self {
        Self {
            idle: "Buy Now".to_string(),
            busy: "Adding...".to_string(),
            success_title: "Added to Cart!".to_string(),
            success_body: "Your product has been added to your cart.".to_string(),
            failure: "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Timing and variant options of a purchase flow.
///
/// # Example
///
/// ```rust
/// use purchase_flow::FlowConfig;
/// use std::time::Duration;
///
/// let config = FlowConfig::from_toml_str(
///     r#"
///     enable_notification = true
///     auto_dismiss_ms = 3000
///     "#,
/// )
/// .unwrap();
///
/// assert!(config.enable_notification);
/// assert_eq!(config.auto_dismiss(), Duration::from_secs(3));
/// assert_eq!(config.processing_delay(), Duration::from_secs(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    pub processing_delay_ms: u64,
    pub auto_dismiss_ms: u64,
    /// Show a dismissible success notification instead of resting silently
    /// in `Succeeded`.
    pub enable_notification: bool,
    pub history_limit: usize,
    pub labels: FlowLabels,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: DEFAULT_PROCESSING_DELAY_MS,
            auto_dismiss_ms: DEFAULT_AUTO_DISMISS_MS,
            enable_notification: false,
            history_limit: DEFAULT_HISTORY_LIMIT,
            labels: FlowLabels::default(),
        }
    }
}

impl FlowConfig {
    /// Defaults for the variant with a dismissible notification.
    pub fn notification() -> Self {
        Self {
            enable_notification: true,
            ..Self::default()
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.auto_dismiss_ms)
    }
}
