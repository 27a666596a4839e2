//! Persistence boundary.
//!
//! Trips, reminders and users live behind these repository traits. Each
//! call is atomic from the caller's point of view; implementations handle
//! their own internal locking.

mod error;
mod memory;
mod repository;

pub use error::{Entity, StoreError};
pub use memory::MemoryStore;
pub use repository::{ReminderRepository, TripRepository, UserRepository};
