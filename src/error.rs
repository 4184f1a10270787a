//! Error taxonomy of the purchase flow.

use thiserror::Error;

/// Errors surfaced by the strict controller operations.
///
/// The lenient operations (`submit`, `dismiss_notification`) never return
/// `AlreadyInProgress` or `InvalidDismiss`; they treat those as no-ops.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("A submission is already in progress")]
    AlreadyInProgress,

    #[error("Processing failed: {message}")]
    ProcessingFailed { message: String },

    #[error("No notification is visible")]
    InvalidDismiss,
}

impl FlowError {
    /// Whether this error should be shown to the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::ProcessingFailed { .. })
    }
}
