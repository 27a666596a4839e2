//! Repository traits.
//!
//! These abstractions let the controller and the dispatcher be tested
//! against in-memory or failing implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ExternalId, NewReminder, NewTrip, NewUser, Reminder, ReminderId, Trip, User, UserId,
};

use super::StoreError;

/// Storage for trips.
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Insert a trip. Fails with `AlreadyExists` on a duplicate.
    async fn create_trip(&self, trip: NewTrip) -> Result<Trip, StoreError>;

    /// All trips of a user, earliest departure first.
    async fn trips_by_user(&self, user_id: UserId) -> Result<Vec<Trip>, StoreError>;
}

/// Storage for reminders.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Insert a pending reminder. Fails with `AlreadyExists` on a duplicate.
    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StoreError>;

    /// Mark a reminder sent. Marking an already-sent reminder is a no-op.
    async fn mark_reminder_sent(&self, id: ReminderId) -> Result<(), StoreError>;

    /// Pending reminders whose trigger time is at or before `as_of`.
    async fn pending_reminders(&self, as_of: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError>;
}

/// Storage for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a user. Fails with `AlreadyExists` if the external id is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn user_by_external_id(&self, external_id: ExternalId) -> Result<User, StoreError>;

    async fn user_by_id(&self, id: UserId) -> Result<User, StoreError>;
}
