//! Transition log for a purchase flow.
//!
//! Keeps the most recent transitions of a single controller so the
//! presentation layer (or a test) can see how the flow got where it is.
//! The log is bounded: a long-lived page never grows it past its limit.

use super::state::PurchaseState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of transitions retained by a [`TransitionLog`].
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// What caused a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    /// The trigger was accepted and processing started.
    Submit,
    /// The processing action completed.
    ProcessingSucceeded,
    /// The processing action reported a failure.
    ProcessingFailed,
    /// The notification was closed explicitly.
    Dismissed,
    /// The auto-dismiss timer fired.
    AutoDismissed,
    /// The submitting future was dropped before processing finished.
    Abandoned,
}

/// Record of a single transition.
///
/// # Example
///
/// ```rust
/// use purchase_flow::core::{FlowTransition, PurchaseState, TransitionTrigger};
/// use chrono::Utc;
///
/// let transition = FlowTransition {
///     from: PurchaseState::Idle,
///     to: PurchaseState::Submitting,
///     trigger: TransitionTrigger::Submit,
///     attempt: 1,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to.name(), "Submitting");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowTransition {
    pub from: PurchaseState,
    pub to: PurchaseState,
    pub trigger: TransitionTrigger,
    /// Consecutive submission number since the last success (1-based).
    pub attempt: usize,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered log of transitions.
///
/// When the limit is reached the oldest entry is evicted. Deserialized
/// logs are re-bounded the same way.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "RawTransitionLog")]
pub struct TransitionLog {
    limit: usize,
    entries: VecDeque<FlowTransition>,
}

#[derive(Deserialize)]
struct RawTransitionLog {
    limit: usize,
    entries: Vec<FlowTransition>,
}

impl From<RawTransitionLog> for TransitionLog {
    fn from(raw: RawTransitionLog) -> Self {
        let mut log = Self::with_limit(raw.limit);
        for transition in raw.entries {
            log.record(transition);
        }
        log
    }
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl TransitionLog {
    /// Create an empty log that keeps at most `limit` transitions.
    ///
    /// A limit of zero is treated as one.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
        }
    }

    /// Append a transition, evicting the oldest one if the log is full.
    pub fn record(&mut self, transition: FlowTransition) {
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(transition);
    }

    pub fn transitions(&self) -> impl ExactSizeIterator<Item = &FlowTransition> + '_ {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&FlowTransition> {
        self.entries.back()
    }

    /// States visited, starting with the source of the oldest retained
    /// transition.
    pub fn path(&self) -> Vec<&PurchaseState> {
        let Some(first) = self.entries.front() else {
            return Vec::new();
        };
        std::iter::once(&first.from)
            .chain(self.entries.iter().map(|t| &t.to))
            .collect()
    }

    /// Wall-clock span between the oldest and newest retained transitions.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.entries.front()?;
        let last = self.entries.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
