//! Build errors for the purchase flow builder.

use thiserror::Error;

/// Errors that can occur when building a purchase flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Environment not specified. Call .env(env) before .build()")]
    MissingEnvironment,

    #[error("Auto-dismiss delay must be non-zero when notifications are enabled")]
    ZeroAutoDismiss,
}
