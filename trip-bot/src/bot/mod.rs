//! Conversation controller for trip booking.
//!
//! A per-user state machine walks the user through station selection,
//! schedule browsing and train confirmation:
//!
//! ```text
//! Idle -> SelectingFrom -> SelectingTo -> ShowingSchedule -> (confirmed)
//!              |               |                ^
//!              v               v                |
//!         WaitingFrom  ->  WaitingTo -----------+
//! ```
//!
//! Cancel is valid everywhere and Back undoes one step.

mod command;
mod controller;
mod deliver;
mod render;
mod reply;

pub use command::{Command, CommandError, StationRef};
pub use controller::Controller;
pub use deliver::deliver;
pub use render::{Leg, POPULAR_SHOWN, RECENT_SHOWN, human_duration};
pub use reply::{Button, Keyboard, Reply, ReplyMode};
