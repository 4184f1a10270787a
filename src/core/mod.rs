//! Pure core of the purchase flow.
//!
//! This module contains the side-effect free parts of the flow:
//! - `PurchaseState` and the predicates derived from it
//! - The bounded transition log
//!
//! Timers, processing and shared ownership live in [`crate::effects`].

mod history;
mod state;

pub use history::{FlowTransition, TransitionLog, TransitionTrigger, DEFAULT_HISTORY_LIMIT};
pub use state::PurchaseState;
