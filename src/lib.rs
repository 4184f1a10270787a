//! Purchase flow: a configurable purchase interaction state machine
//!
//! A purchase trigger goes through a short, staged lifecycle: it is
//! pressed, a processing step runs for a fixed delay, and the outcome is
//! reported back. Optionally a success notification is shown and hidden
//! again after a fixed delay unless the user closes it first.
//!
//! The crate follows a "pure core, imperative shell" layout:
//!
//! - **core**: `PurchaseState`, its predicates and the transition log
//! - **effects**: processing actions, the auto-dismiss scheduler and the
//!   `PurchaseFlow` controller
//! - **builder**: fluent construction of flows
//! - **snapshot**: the serializable observable state for renderers
//!
//! # Example
//!
//! ```rust
//! use purchase_flow::{FlowConfig, PurchaseFlow, PurchaseState, SubmitOutcome};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let flow = PurchaseFlow::new(FlowConfig {
//!     processing_delay_ms: 5,
//!     ..FlowConfig::default()
//! })
//! .unwrap();
//!
//! assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);
//! assert_eq!(
//!     flow.state(),
//!     PurchaseState::Succeeded { notification_visible: false }
//! );
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod error;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{BuildError, PurchaseFlowBuilder};
pub use config::{ConfigError, FlowConfig, FlowLabels};
pub use crate::core::{FlowTransition, PurchaseState, TransitionLog, TransitionTrigger};
pub use effects::{ProcessingError, PurchaseFlow, SubmitOutcome};
pub use error::FlowError;
pub use snapshot::{FlowSnapshot, SnapshotError};
