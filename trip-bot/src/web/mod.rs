//! HTTP transport for the booking conversation.
//!
//! Each endpoint feeds one event to the controller, pushes the resulting
//! reply through the delivery channel and echoes it back as JSON.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
