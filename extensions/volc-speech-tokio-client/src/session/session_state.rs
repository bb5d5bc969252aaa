use std::sync::Mutex;

/// Lifecycle of a [`StreamSession`](crate::session::StreamSession).
///
/// `Finished` and `Failed` are terminal and never left once entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    /// Start message sent, waiting for the first acknowledgement.
    AwaitingStart,
    Streaming,
    /// Input exhausted and finish message sent; still receiving.
    Draining,
    Finished,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            SessionState::Idle => 0,
            SessionState::AwaitingStart => 1,
            SessionState::Streaming => 2,
            SessionState::Draining => 3,
            SessionState::Finished | SessionState::Failed => 4,
        }
    }
}

pub type StateChangeHandler = Box<dyn Fn(SessionState) + Send + Sync>;

/// Current state plus the optional observer.
pub(crate) struct StateTracker {
    state: Mutex<SessionState>,
    handler: Mutex<Option<StateChangeHandler>>,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Idle),
            handler: Mutex::new(None),
        }
    }

    pub(crate) fn get(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_handler(&self, handler: StateChangeHandler) {
        *self.handler.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(handler);
    }

    /// Moves forward to `next`. Returns `false` (and changes nothing) when
    /// the current state is terminal or not behind `next`.
    pub(crate) fn transition(&self, next: SessionState) -> bool {
        {
            let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.is_terminal() || next.rank() <= state.rank() {
                return false;
            }
            *state = next;
        }

        tracing::debug!(state = ?next, "session state changed");

        if let Some(handler) = self
            .handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            handler(next);
        }

        true
    }
}
