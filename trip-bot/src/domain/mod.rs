//! Domain types for trip booking and reminders.
//!
//! All types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod error;
mod ids;
mod reminder;
mod schedule;
mod station;
mod trip;
mod user;

pub use error::{ErrorKind, ValidationError};
pub use ids::{ExternalId, MessageId, ReminderId, TripId, UserId};
pub use reminder::{InvalidStatus, NewReminder, REMINDER_LEAD_MINS, Reminder, ReminderStatus};
pub use schedule::ScheduleOption;
pub use station::{Station, StationCode};
pub use trip::{NewTrip, Trip};
pub use user::{NewUser, User};
