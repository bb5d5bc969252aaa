mod cancel_scope;
mod session_event;
mod session_state;
mod session_writer;
mod stream_session;

pub use cancel_scope::{CancelHandle, CancelScope};
pub use session_event::SessionEvent;
pub use session_state::{SessionState, StateChangeHandler};
pub use session_writer::SessionWriter;
pub use stream_session::StreamSession;

pub(crate) use session_state::StateTracker;
