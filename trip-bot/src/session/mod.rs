//! Conversation sessions.

mod state;
mod store;

pub use state::{ConvState, MAX_RECENT, Session};
pub use store::{SessionConfig, SessionHandle, SessionStore};
