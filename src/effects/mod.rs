//! Effectful shell around the pure core.
//!
//! This module owns everything that touches time or shared ownership:
//!
//! - **Processing actions**: Stillwater effects run after the processing delay
//! - **Notification scheduler**: the single cancelable auto-dismiss timer
//! - **Controller**: `PurchaseFlow`, which sequences the two
//!
//! The controller assumes a Tokio runtime with the time driver enabled.

mod action;
mod controller;
mod scheduler;

pub use action::{always_fails, always_succeeds, from_env, ProcessingAction, ProcessingError};
pub use controller::{PurchaseFlow, SubmitOutcome};
pub use scheduler::NotificationScheduler;
