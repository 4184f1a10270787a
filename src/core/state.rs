//! Purchase interaction states.
//!
//! `PurchaseState` is a plain value describing where a single purchase
//! action currently is. All methods are pure - no side effects - so the
//! presentation layer can derive everything it renders from a state value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a purchase action in its request-to-feedback lifecycle.
///
/// # Transitions
///
/// ```text
/// Idle       --submit-->         Submitting
/// Submitting --op success-->     Succeeded
/// Submitting --op failure-->     Failed
/// Succeeded  --dismiss/timer-->  Idle
/// Failed     --submit-->         Submitting
/// ```
///
/// # Example
///
/// ```rust
/// use purchase_flow::core::PurchaseState;
///
/// let state = PurchaseState::Succeeded { notification_visible: true };
/// assert!(state.accepts_submit());
/// assert!(state.notification_visible());
/// assert!(!PurchaseState::Submitting.accepts_submit());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PurchaseState {
    /// Resting state; the trigger is usable.
    #[default]
    Idle,

    /// Processing is in flight; further triggers are ignored.
    Submitting,

    /// Processing completed. `notification_visible` is only ever `true`
    /// when the notification variant is active.
    Succeeded { notification_visible: bool },

    /// Processing failed; the message is meant for display and the
    /// trigger stays usable for a retry.
    Failed { message: String },
}

impl PurchaseState {
    /// Get the state's name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Submitting => "Submitting",
            Self::Succeeded { .. } => "Succeeded",
            Self::Failed { .. } => "Failed",
        }
    }

    /// Whether a trigger issued in this state starts a new submission.
    ///
    /// Every state except `Submitting` accepts a trigger, which makes the
    /// flow re-enterable indefinitely.
    pub fn accepts_submit(&self) -> bool {
        !self.is_submitting()
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Whether a success notification is currently shown.
    pub fn notification_visible(&self) -> bool {
        matches!(
            self,
            Self::Succeeded {
                notification_visible: true
            }
        )
    }

    /// Display message of a failed attempt, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for PurchaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
