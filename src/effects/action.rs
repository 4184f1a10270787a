//! The processing action run by a submission.
//!
//! Processing is expressed as a Stillwater effect over the flow's
//! environment. The controller stores a factory and creates a fresh
//! effect for every accepted submission, after the processing delay.

use std::sync::Arc;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use thiserror::Error;

/// Failure reported by a processing action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("Processing failed: {message}")]
    Failed { message: String },
}

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Message to display, falling back when the action gave none.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            Self::Failed { message } if !message.trim().is_empty() => message.clone(),
            Self::Failed { .. } => fallback.to_string(),
        }
    }
}

/// Factory producing a fresh processing effect per submission.
pub type ProcessingAction<Env> =
    Arc<dyn Fn() -> BoxedEffect<(), ProcessingError, Env> + Send + Sync>;

/// Action that always completes successfully.
///
/// This is the default: the processing delay stands in for real order
/// handling and nothing else happens.
pub fn always_succeeds<Env>() -> ProcessingAction<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    Arc::new(|| -> BoxedEffect<(), ProcessingError, Env> { pure(()).boxed() })
}

/// Action that always fails with `message`.
pub fn always_fails<Env>(message: impl Into<String>) -> ProcessingAction<Env>
where
    Env: Clone + Send + Sync + 'static,
{
    let message = message.into();
    Arc::new(move || -> BoxedEffect<(), ProcessingError, Env> {
        fail(ProcessingError::new(message.clone())).boxed()
    })
}

/// Action whose outcome is decided by the environment.
///
/// # Example
///
/// ```rust
/// use purchase_flow::effects::{from_env, ProcessingError};
///
/// #[derive(Clone)]
/// struct Inventory {
///     in_stock: bool,
/// }
///
/// let action = from_env(|inv: &Inventory| {
///     if inv.in_stock {
///         Ok(())
///     } else {
///         Err(ProcessingError::new("Out of stock"))
///     }
/// });
/// # let _ = action;
/// ```
pub fn from_env<Env, F>(decide: F) -> ProcessingAction<Env>
where
    Env: Clone + Send + Sync + 'static,
    F: Fn(&Env) -> Result<(), ProcessingError> + Send + Sync + 'static,
{
    let decide = Arc::new(decide);
    Arc::new(move || -> BoxedEffect<(), ProcessingError, Env> {
        let decide = Arc::clone(&decide);
        from_fn(move |env: &Env| decide(env)).boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestEnv {
        accept: bool,
    }

    #[tokio::test]
    async fn always_succeeds_runs_ok() {
        let action = always_succeeds::<()>();
        assert!(action().run(&()).await.is_ok());
    }

    #[tokio::test]
    async fn always_fails_carries_message() {
        let action = always_fails::<()>("Payment declined");
        let err = action().run(&()).await.unwrap_err();
        assert_eq!(err, ProcessingError::new("Payment declined"));
    }

    #[tokio::test]
    async fn from_env_reads_environment() {
        let action = from_env(|env: &TestEnv| {
            if env.accept {
                Ok(())
            } else {
                Err(ProcessingError::new("Rejected"))
            }
        });

        assert!(action().run(&TestEnv { accept: true }).await.is_ok());
        assert!(action().run(&TestEnv { accept: false }).await.is_err());
    }

    #[test]
    fn blank_message_falls_back() {
        let err = ProcessingError::new("  ");
        assert_eq!(err.display_message("Try again"), "Try again");
        assert_eq!(
            ProcessingError::new("Declined").display_message("Try again"),
            "Declined"
        );
    }
}
