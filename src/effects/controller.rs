//! The purchase flow controller.

use crate::builder::BuildError;
use crate::config::{FlowConfig, FlowLabels};
use crate::core::{FlowTransition, PurchaseState, TransitionLog, TransitionTrigger};
use crate::effects::action::{always_succeeds, ProcessingAction};
use crate::effects::scheduler::NotificationScheduler;
use crate::error::FlowError;
use crate::snapshot::FlowSnapshot;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use stillwater::effect::Effect;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a lenient [`PurchaseFlow::submit`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Processing completed and the flow is in `Succeeded`.
    Succeeded,
    /// Processing failed; the flow is in `Failed` and accepts a retry.
    Failed { message: String },
    /// A submission was already in flight; nothing happened.
    Ignored,
}

struct FlowInner {
    state: PurchaseState,
    attempt: usize,
    log: TransitionLog,
    scheduler: NotificationScheduler,
}

struct Shared<Env> {
    id: Uuid,
    config: FlowConfig,
    action: ProcessingAction<Env>,
    env: Env,
    inner: Mutex<FlowInner>,
    updates: watch::Sender<FlowSnapshot>,
}

impl<Env> Shared<Env> {
    fn labels(&self) -> &FlowLabels {
        &self.config.labels
    }

    /// Move to `to`, record the transition and publish a snapshot.
    fn apply(&self, inner: &mut FlowInner, to: PurchaseState, trigger: TransitionTrigger) {
        let from = std::mem::replace(&mut inner.state, to.clone());
        inner.log.record(FlowTransition {
            from,
            to,
            trigger,
            attempt: inner.attempt,
            timestamp: Utc::now(),
        });
        self.updates.send_replace(FlowSnapshot::capture(
            self.id,
            &inner.state,
            inner.attempt,
            self.labels(),
        ));
    }

    fn auto_dismiss(&self, generation: u64) {
        let mut inner = self.inner.lock();
        if !inner.scheduler.complete(generation) {
            return;
        }
        if inner.state.notification_visible() {
            self.apply(&mut inner, PurchaseState::Idle, TransitionTrigger::AutoDismissed);
            info!(flow_id = %self.id, "notification auto-dismissed");
        }
    }
}

/// Reverts an in-flight submission if its future is dropped early.
struct InFlight<'a, Env> {
    shared: &'a Shared<Env>,
    done: bool,
}

impl<Env> Drop for InFlight<'_, Env> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let mut inner = self.shared.inner.lock();
        if inner.state.is_submitting() {
            self.shared
                .apply(&mut inner, PurchaseState::Idle, TransitionTrigger::Abandoned);
            warn!(flow_id = %self.shared.id, "submission abandoned before completion");
        }
    }
}

/// Controller for a single purchase action.
///
/// Drives `Idle -> Submitting -> Succeeded | Failed` and, when the
/// notification variant is enabled, hides the success notification again
/// after `auto_dismiss_ms` unless it is dismissed first.
///
/// `PurchaseFlow` is a cheap handle: clones share the same flow. The
/// pending auto-dismiss timer is aborted when the last handle is dropped.
///
/// # Example
///
/// ```rust
/// use purchase_flow::{FlowConfig, PurchaseFlow, PurchaseState, SubmitOutcome};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let flow = PurchaseFlow::new(FlowConfig {
///     processing_delay_ms: 10,
///     ..FlowConfig::notification()
/// })
/// .unwrap();
///
/// assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);
/// assert!(flow.notification_visible());
///
/// flow.dismiss_notification();
/// assert_eq!(flow.state(), PurchaseState::Idle);
/// # }
/// ```
pub struct PurchaseFlow<Env = ()> {
    shared: Arc<Shared<Env>>,
}

impl<Env> Clone for PurchaseFlow<Env> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl PurchaseFlow<()> {
    /// Create a flow whose processing always succeeds.
    pub fn new(config: FlowConfig) -> Result<Self, BuildError> {
        crate::builder::PurchaseFlowBuilder::<()>::new()
            .config(config)
            .env(())
            .build()
    }

    pub fn builder() -> crate::builder::PurchaseFlowBuilder<()> {
        crate::builder::PurchaseFlowBuilder::<()>::new().env(())
    }
}

impl<Env: Clone + Send + Sync + 'static> PurchaseFlow<Env> {
    pub(crate) fn from_parts(config: FlowConfig, action: Option<ProcessingAction<Env>>, env: Env) -> Self {
        let id = Uuid::new_v4();
        let state = PurchaseState::Idle;
        let (updates, _) = watch::channel(FlowSnapshot::capture(id, &state, 0, &config.labels));

        let inner = FlowInner {
            state,
            attempt: 0,
            log: TransitionLog::with_limit(config.history_limit),
            scheduler: NotificationScheduler::new(),
        };

        debug!(
            flow_id = %id,
            processing_delay_ms = config.processing_delay_ms,
            auto_dismiss_ms = config.auto_dismiss_ms,
            enable_notification = config.enable_notification,
            "purchase flow created"
        );

        Self {
            shared: Arc::new(Shared {
                id,
                action: action.unwrap_or_else(always_succeeds::<Env>),
                config,
                env,
                inner: Mutex::new(inner),
                updates,
            }),
        }
    }

    /// Trigger a submission.
    ///
    /// Ignored while another submission is in flight. Otherwise waits for
    /// the processing delay, runs the processing action and settles in
    /// `Succeeded` or `Failed`.
    pub async fn submit(&self) -> SubmitOutcome {
        let shared = &*self.shared;

        {
            let mut inner = shared.inner.lock();
            if !inner.state.accepts_submit() {
                debug!(flow_id = %shared.id, "submit ignored: already in progress");
                return SubmitOutcome::Ignored;
            }
            // Only one notification is visible at a time; a new submission
            // replaces the previous one.
            inner.scheduler.cancel();
            inner.attempt = if inner.state.is_error() {
                inner.attempt + 1
            } else {
                1
            };
            shared.apply(&mut inner, PurchaseState::Submitting, TransitionTrigger::Submit);
            info!(flow_id = %shared.id, attempt = inner.attempt, "submission accepted");
        }

        let mut in_flight = InFlight {
            shared,
            done: false,
        };

        tokio::time::sleep(shared.config.processing_delay()).await;
        let result = (shared.action)().run(&shared.env).await;

        let mut inner = shared.inner.lock();
        in_flight.done = true;
        match result {
            Ok(()) => {
                let notification_visible = shared.config.enable_notification;
                shared.apply(
                    &mut inner,
                    PurchaseState::Succeeded {
                        notification_visible,
                    },
                    TransitionTrigger::ProcessingSucceeded,
                );
                if notification_visible {
                    let weak: Weak<Shared<Env>> = Arc::downgrade(&self.shared);
                    inner
                        .scheduler
                        .arm(shared.config.auto_dismiss(), move |generation| {
                            if let Some(shared) = weak.upgrade() {
                                shared.auto_dismiss(generation);
                            }
                        });
                }
                info!(
                    flow_id = %shared.id,
                    attempt = inner.attempt,
                    notification_visible,
                    "submission succeeded"
                );
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                let message = err.display_message(&shared.labels().failure);
                warn!(flow_id = %shared.id, attempt = inner.attempt, error = %err, "submission failed");
                shared.apply(
                    &mut inner,
                    PurchaseState::Failed {
                        message: message.clone(),
                    },
                    TransitionTrigger::ProcessingFailed,
                );
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Strict variant of [`submit`](Self::submit).
    ///
    /// Surfaces `AlreadyInProgress` and `ProcessingFailed` as errors.
    pub async fn try_submit(&self) -> Result<(), FlowError> {
        match self.submit().await {
            SubmitOutcome::Succeeded => Ok(()),
            SubmitOutcome::Failed { message } => Err(FlowError::ProcessingFailed { message }),
            SubmitOutcome::Ignored => Err(FlowError::AlreadyInProgress),
        }
    }
}

impl<Env> PurchaseFlow<Env> {
    /// Hide the success notification and return to `Idle`.
    ///
    /// Cancels the pending auto-dismiss timer. Returns `false` (and does
    /// nothing) when no notification is visible.
    pub fn dismiss_notification(&self) -> bool {
        self.try_dismiss_notification().is_ok()
    }

    /// Strict variant of [`dismiss_notification`](Self::dismiss_notification).
    pub fn try_dismiss_notification(&self) -> Result<(), FlowError> {
        let shared = &*self.shared;
        let mut inner = shared.inner.lock();
        if !inner.state.notification_visible() {
            debug!(flow_id = %shared.id, state = inner.state.name(), "dismiss ignored: no notification");
            return Err(FlowError::InvalidDismiss);
        }
        inner.scheduler.cancel();
        shared.apply(&mut inner, PurchaseState::Idle, TransitionTrigger::Dismissed);
        info!(flow_id = %shared.id, "notification dismissed");
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn config(&self) -> &FlowConfig {
        &self.shared.config
    }

    pub fn state(&self) -> PurchaseState {
        self.shared.inner.lock().state.clone()
    }

    pub fn notification_visible(&self) -> bool {
        self.shared.inner.lock().state.notification_visible()
    }

    pub fn error_message(&self) -> Option<String> {
        self.shared
            .inner
            .lock()
            .state
            .error_message()
            .map(str::to_string)
    }

    /// Whether the trigger must be rendered as disabled.
    pub fn is_trigger_disabled(&self) -> bool {
        self.shared.inner.lock().state.is_submitting()
    }

    pub fn trigger_label(&self) -> String {
        self.snapshot().trigger_label
    }

    /// Whether an auto-dismiss timer is pending.
    pub fn has_pending_dismiss(&self) -> bool {
        self.shared.inner.lock().scheduler.is_pending()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let inner = self.shared.inner.lock();
        FlowSnapshot::capture(
            self.shared.id,
            &inner.state,
            inner.attempt,
            self.shared.labels(),
        )
    }

    /// Receive a fresh snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn history(&self) -> TransitionLog {
        self.shared.inner.lock().log.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PurchaseFlowBuilder;
    use crate::effects::action::{always_fails, from_env};
    use crate::effects::ProcessingError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn notifying() -> PurchaseFlow {
        PurchaseFlow::new(FlowConfig::notification()).unwrap()
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn starts_idle() {
        let flow = notifying();
        assert_eq!(flow.state(), PurchaseState::Idle);
        assert!(!flow.notification_visible());
        assert!(!flow.is_trigger_disabled());
        assert!(!flow.has_pending_dismiss());
        assert_eq!(flow.error_message(), None);
        assert_eq!(flow.trigger_label(), "Buy Now");
        assert!(flow.history().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn success_shows_notification_and_arms_timer() {
        let flow = notifying();

        assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);
        assert_eq!(
            flow.state(),
            PurchaseState::Succeeded {
                notification_visible: true
            }
        );
        assert!(flow.has_pending_dismiss());
        assert!(!flow.is_trigger_disabled());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn plain_variant_rests_in_succeeded_without_timer() {
        let flow = PurchaseFlow::new(FlowConfig::default()).unwrap();

        assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);
        assert_eq!(
            flow.state(),
            PurchaseState::Succeeded {
                notification_visible: false
            }
        );
        assert!(!flow.has_pending_dismiss());
        assert!(!flow.dismiss_notification());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn trigger_is_disabled_while_submitting() {
        let flow = notifying();
        let observer = flow.clone();

        let (outcome, (disabled, label)) = tokio::join!(flow.submit(), async {
            tokio::task::yield_now().await;
            (observer.is_trigger_disabled(), observer.trigger_label())
        });

        assert_eq!(outcome, SubmitOutcome::Succeeded);
        assert!(disabled);
        assert_eq!(label, "Adding...");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn reentrant_submit_is_ignored() {
        let flow = notifying();

        let (first, second) = tokio::join!(flow.submit(), async {
            tokio::task::yield_now().await;
            flow.submit().await
        });

        assert_eq!(first, SubmitOutcome::Succeeded);
        assert_eq!(second, SubmitOutcome::Ignored);
        let triggers: Vec<_> = flow.history().transitions().map(|t| t.trigger).collect();
        assert_eq!(
            triggers,
            vec![TransitionTrigger::Submit, TransitionTrigger::ProcessingSucceeded]
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn try_submit_reports_in_progress() {
        let flow = notifying();

        let (first, second) = tokio::join!(flow.try_submit(), async {
            tokio::task::yield_now().await;
            flow.try_submit().await
        });

        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(FlowError::AlreadyInProgress));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn failure_is_retryable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let flow = PurchaseFlowBuilder::new()
            .env(())
            .enable_notification(true)
            .action(from_env(move |_: &()| {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ProcessingError::new("Payment declined"))
                } else {
                    Ok(())
                }
            }))
            .build()
            .unwrap();

        assert_eq!(
            flow.submit().await,
            SubmitOutcome::Failed {
                message: "Payment declined".to_string()
            }
        );
        assert_eq!(flow.error_message().as_deref(), Some("Payment declined"));
        assert!(!flow.is_trigger_disabled());
        assert!(!flow.has_pending_dismiss());

        assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);
        assert_eq!(flow.error_message(), None);
        assert_eq!(flow.snapshot().attempt, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn blank_failure_uses_failure_label() {
        let flow = PurchaseFlowBuilder::new()
            .env(())
            .action(always_fails(""))
            .build()
            .unwrap();

        assert_eq!(
            flow.try_submit().await,
            Err(FlowError::ProcessingFailed {
                message: "Something went wrong. Please try again.".to_string()
            })
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn dismiss_cancels_timer_and_is_idempotent() {
        let flow = notifying();
        flow.submit().await;

        assert!(flow.dismiss_notification());
        assert_eq!(flow.state(), PurchaseState::Idle);
        assert!(!flow.has_pending_dismiss());

        assert!(!flow.dismiss_notification());
        assert_eq!(flow.try_dismiss_notification(), Err(FlowError::InvalidDismiss));
        assert_eq!(flow.history().len(), 3);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn auto_dismiss_returns_to_idle() {
        let flow = notifying();
        flow.submit().await;

        tokio::time::sleep(Duration::from_millis(5000)).await;
        tokio::task::yield_now().await;

        assert_eq!(flow.state(), PurchaseState::Idle);
        assert!(!flow.has_pending_dismiss());
        assert_eq!(
            flow.history().last().map(|t| t.trigger),
            Some(TransitionTrigger::AutoDismissed)
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn resubmit_while_notification_visible_replaces_timer() {
        let flow = notifying();
        flow.submit().await;

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);

        // The first timer would have fired at 5000ms after the first success.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        tokio::task::yield_now().await;
        assert!(flow.notification_visible());
        assert!(flow.has_pending_dismiss());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn subscribers_see_every_transition() {
        let flow = notifying();
        let mut updates = flow.subscribe();
        assert_eq!(updates.borrow().state, PurchaseState::Idle);

        flow.submit().await;
        assert!(updates.has_changed().unwrap());
        let latest = updates.borrow_and_update().clone();
        assert!(latest.notification_visible);

        flow.dismiss_notification();
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().state, PurchaseState::Idle);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn dropped_submission_returns_to_idle() {
        let flow = notifying();

        let result = tokio::time::timeout(Duration::from_millis(500), flow.submit()).await;
        assert!(result.is_err());

        assert_eq!(flow.state(), PurchaseState::Idle);
        assert_eq!(
            flow.history().last().map(|t| t.trigger),
            Some(TransitionTrigger::Abandoned)
        );
        assert_eq!(flow.submit().await, SubmitOutcome::Succeeded);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn dropping_last_handle_closes_updates() {
        let flow = notifying();
        let mut updates = flow.subscribe();
        flow.submit().await;
        updates.borrow_and_update();

        drop(flow);
        tokio::time::sleep(Duration::from_millis(6000)).await;

        assert!(updates.has_changed().is_err());
        assert!(updates.borrow().notification_visible);
    }
}
