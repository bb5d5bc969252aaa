use crate::error::SessionError;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Shared stop signal plus the first recorded outcome.
///
/// Whoever stops the scope first decides the outcome; later calls only
/// re-signal. Every loop of a session selects on [`stopped`](Self::stopped)
/// at each suspension point.
pub struct CancelScope {
    signal: watch::Sender<bool>,
    outcome: Mutex<Option<Result<(), SessionError>>>,
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelScope {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal,
            outcome: Mutex::new(None),
        }
    }

    /// Stops with success. Returns `true` if this call decided the outcome.
    pub fn stop(&self) -> bool {
        self.settle(Ok(()))
    }

    /// Stops with `error`. Returns `true` if this call decided the outcome.
    pub fn cancel(&self, error: SessionError) -> bool {
        self.settle(Err(error))
    }

    pub fn is_stopped(&self) -> bool {
        *self.signal.borrow()
    }

    /// Resolves once the scope has been stopped.
    pub async fn stopped(&self) {
        let mut receiver = self.signal.subscribe();
        // The sender lives in `self`, so this only returns once signalled.
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }

    /// Removes the recorded outcome.
    pub fn take_outcome(&self) -> Option<Result<(), SessionError>> {
        self.outcome
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn settle(&self, outcome: Result<(), SessionError>) -> bool {
        let first = {
            let mut slot = self
                .outcome
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.is_none() && !self.is_stopped() {
                if let Err(err) = &outcome {
                    tracing::warn!(%err, "session cancelled");
                }
                *slot = Some(outcome);
                true
            } else {
                false
            }
        };

        self.signal.send_replace(true);
        first
    }
}

/// Caller-side handle that cancels a running session.
#[derive(Clone)]
pub struct CancelHandle {
    scope: Arc<CancelScope>,
}

impl CancelHandle {
    pub(crate) fn new(scope: Arc<CancelScope>) -> Self {
        Self { scope }
    }

    /// Ends the session with [`SessionError::Cancelled`] unless it already
    /// has an outcome.
    pub fn cancel(&self) {
        self.scope.cancel(SessionError::Cancelled);
    }

    pub fn is_cancelled(&self) -> bool {
        self.scope.is_stopped()
    }
}
