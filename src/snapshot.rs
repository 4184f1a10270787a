//! Observable state handed to the presentation layer.
//!
//! A snapshot is everything a renderer needs to draw the trigger and the
//! feedback area. Snapshots serialize to JSON so a non-Rust front end can
//! consume them; they are not meant to be persisted and restored.

use crate::config::FlowLabels;
use crate::core::PurchaseState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while encoding or decoding snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("Snapshot deserialization failed: {0}")]
    Deserialization(String),
}

/// Point-in-time view of a purchase flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub flow_id: Uuid,
    pub state: PurchaseState,
    pub notification_visible: bool,
    pub error_message: Option<String>,
    /// The trigger must render as disabled while this is set.
    pub trigger_disabled: bool,
    pub trigger_label: String,
    pub attempt: usize,
    pub taken_at: DateTime<Utc>,
}

impl FlowSnapshot {
    pub(crate) fn capture(
        flow_id: Uuid,
        state: &PurchaseState,
        attempt: usize,
        labels: &FlowLabels,
    ) -> Self {
        let trigger_disabled = state.is_submitting();
        let trigger_label = if trigger_disabled {
            labels.busy.clone()
        } else {
            labels.idle.clone()
        };

        Self {
            flow_id,
            state: state.clone(),
            notification_visible: state.notification_visible(),
            error_message: state.error_message().map(str::to_string),
            trigger_disabled,
            trigger_label,
            attempt,
            taken_at: Utc::now(),
        }
    }

    /// Whether two snapshots render identically.
    ///
    /// Ignores bookkeeping fields (`flow_id`, `attempt`, `taken_at`).
    pub fn same_view(&self, other: &Self) -> bool {
        self.state == other.state
            && self.notification_visible == other.notification_visible
            && self.error_message == other.error_message
            && self.trigger_disabled == other.trigger_disabled
            && self.trigger_label == other.trigger_label
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(input).map_err(|e| SnapshotError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submitting_snapshot_disables_trigger() {
        let labels = FlowLabels::default();
        let snapshot = FlowSnapshot::capture(Uuid::new_v4(), &PurchaseState::Submitting, 1, &labels);

        assert!(snapshot.trigger_disabled);
        assert_eq!(snapshot.trigger_label, labels.busy);
        assert!(!snapshot.notification_visible);
        assert_eq!(snapshot.error_message, None);
    }

    #[test]
    fn failed_snapshot_exposes_message() {
        let labels = FlowLabels::default();
        let state = PurchaseState::Failed {
            message: "Declined".to_string(),
        };
        let snapshot = FlowSnapshot::capture(Uuid::new_v4(), &state, 2, &labels);

        assert!(!snapshot.trigger_disabled);
        assert_eq!(snapshot.trigger_label, labels.idle);
        assert_eq!(snapshot.error_message.as_deref(), Some("Declined"));
    }

    #[test]
    fn same_view_ignores_bookkeeping() {
        let labels = FlowLabels::default();
        let a = FlowSnapshot::capture(Uuid::new_v4(), &PurchaseState::Idle, 0, &labels);
        let b = FlowSnapshot::capture(Uuid::new_v4(), &PurchaseState::Idle, 3, &labels);
        let c = FlowSnapshot::capture(Uuid::new_v4(), &PurchaseState::Submitting, 3, &labels);

        assert!(a.same_view(&b));
        assert!(!a.same_view(&c));
    }

    #[test]
    fn json_round_trip_preserves_snapshot() {
        let labels = FlowLabels::default();
        let state = PurchaseState::Succeeded {
            notification_visible: true,
        };
        let snapshot = FlowSnapshot::capture(Uuid::new_v4(), &state, 1, &labels);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains(r#""notification_visible":true"#));
        assert_eq!(FlowSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            FlowSnapshot::from_json("{\"state\":"),
            Err(SnapshotError::Deserialization(_))
        ));
    }
}
