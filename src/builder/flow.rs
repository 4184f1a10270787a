//! Builder for constructing purchase flows.

use crate::builder::error::BuildError;
use crate::config::{duration_ms, FlowConfig, FlowLabels};
use crate::effects::{always_fails, ProcessingAction, PurchaseFlow};
use std::time::Duration;

/// Builder for constructing purchase flows with a fluent API.
///
/// # Example
///
/// ```
/// use purchase_flow::builder::PurchaseFlowBuilder;
/// use purchase_flow::effects::{from_env, ProcessingError};
/// use std::time::Duration;
///
/// #[derive(Clone)]
/// struct Store {
///     open: bool,
/// }
///
/// let flow = PurchaseFlowBuilder::new()
///     .env(Store { open: true })
///     .enable_notification(true)
///     .processing_delay(Duration::from_millis(300))
///     .action(from_env(|store: &Store| {
///         if store.open {
///             Ok(())
///         } else {
///             Err(ProcessingError::new("The store is closed"))
///         }
///     }))
///     .build()
///     .unwrap();
///
/// assert_eq!(flow.config().processing_delay_ms, 300);
/// ```
pub struct PurchaseFlowBuilder<Env> {
    config: FlowConfig,
    action: Option<ProcessingAction<Env>>,
    env: Option<Env>,
}

impl<Env: Clone + Send + Sync + 'static> PurchaseFlowBuilder<Env> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: FlowConfig::default(),
            action: None,
            env: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the environment handed to the processing action (required).
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    pub fn processing_delay(mut self, delay: Duration) -> Self {
        self.config.processing_delay_ms = duration_ms(delay);
        self
    }

    pub fn auto_dismiss(mut self, delay: Duration) -> Self {
        self.config.auto_dismiss_ms = duration_ms(delay);
        self
    }

    pub fn enable_notification(mut self, enabled: bool) -> Self {
        self.config.enable_notification = enabled;
        self
    }

    pub fn labels(mut self, labels: FlowLabels) -> Self {
        self.config.labels = labels;
        self
    }

    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Set the processing action. Defaults to one that always succeeds.
    pub fn action(mut self, action: ProcessingAction<Env>) -> Self {
        self.action = Some(action);
        self
    }

    /// Use an action that always fails with `message`.
    pub fn fails_with(self, message: impl Into<String>) -> Self {
        self.action(always_fails(message))
    }

    /// Build the flow.
    /// Returns an error if the environment is missing or the timings are
    /// unusable.
    pub fn build(self) -> Result<PurchaseFlow<Env>, BuildError> {
        let env = self.env.ok_or(BuildError::MissingEnvironment)?;

        if self.config.enable_notification && self.config.auto_dismiss_ms == 0 {
            return Err(BuildError::ZeroAutoDismiss);
        }

        Ok(PurchaseFlow::from_parts(self.config, self.action, env))
    }
}

impl<Env: Clone + Send + Sync + 'static> Default for PurchaseFlowBuilder<Env> {
    fn default() -> Self {
        Self::new()
    }
}
