//! Builder API for purchase flow construction.
//!
//! The two presentation variants (plain trigger and trigger with a
//! dismissible notification) are one controller configured differently.
//! The helpers here build each variant with default timings.

pub mod error;
pub mod flow;

pub use error::BuildError;
pub use flow::PurchaseFlowBuilder;

use crate::config::FlowConfig;
use crate::effects::PurchaseFlow;

/// Flow for a plain trigger: success rests silently in `Succeeded`.
///
/// # Example
///
/// ```
/// use purchase_flow::builder::plain_flow;
///
/// let flow = plain_flow();
/// assert!(!flow.config().enable_notification);
/// ```
pub fn plain_flow() -> PurchaseFlow {
    PurchaseFlow::from_parts(FlowConfig::default(), None, ())
}

/// Flow for a trigger with a success notification that auto-dismisses.
///
/// # Example
///
/// ```
/// use purchase_flow::builder::notifying_flow;
///
/// let flow = notifying_flow();
/// assert_eq!(flow.config().auto_dismiss_ms, 5000);
/// ```
pub fn notifying_flow() -> PurchaseFlow {
    PurchaseFlow::from_parts(FlowConfig::notification(), None, ())
}
