//! In-memory repository implementation.
//!
//! Backs the binary and the tests. Uniqueness rules mirror the SQL schema
//! this boundary stands in for: one trip per (user, from, to, departure),
//! one reminder per trip, one user per external id.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    ExternalId, NewReminder, NewTrip, NewUser, Reminder, ReminderId, ReminderStatus, Trip,
    TripId, User, UserId,
};

use super::error::{Entity, StoreError};
use super::repository::{ReminderRepository, TripRepository, UserRepository};

/// A table with sequential ids starting at 1.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.entry(id).or_insert_with(|| build(id))
    }
}

/// Thread-safe in-memory store implementing every repository trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    trips: RwLock<Table<Trip>>,
    reminders: RwLock<Table<Reminder>>,
    users: RwLock<Table<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a reminder by id (for inspection; not part of the boundary).
    pub async fn reminder(&self, id: ReminderId) -> Option<Reminder> {
        self.reminders.read().await.rows.get(&id.0).cloned()
    }

    /// All reminders, in id order.
    pub async fn reminders(&self) -> Vec<Reminder> {
        self.reminders.read().await.rows.values().cloned().collect()
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create_trip(&self, trip: NewTrip) -> Result<Trip, StoreError> {
        let mut table = self.trips.write().await;

        let duplicate = table.rows.values().any(|t| {
            t.user_id == trip.user_id
                && t.from == trip.from
                && t.to == trip.to
                && t.departure == trip.departure
        });
        if duplicate {
            return Err(StoreError::AlreadyExists(Entity::Trip));
        }

        Ok(table.insert_with(|id| trip.into_trip(TripId(id))).clone())
    }

    async fn trips_by_user(&self, user_id: UserId) -> Result<Vec<Trip>, StoreError> {
        let table = self.trips.read().await;
        let mut trips: Vec<Trip> = table
            .rows
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        trips.sort_by_key(|t| (t.departure, t.id));
        Ok(trips)
    }
}

#[async_trait]
impl ReminderRepository for MemoryStore {
    async fn create_reminder(&self, reminder: NewReminder) -> Result<Reminder, StoreError> {
        let mut table = self.reminders.write().await;

        if table.rows.values().any(|r| r.trip_id == reminder.trip_id) {
            return Err(StoreError::AlreadyExists(Entity::Reminder));
        }

        Ok(table
            .insert_with(|id| reminder.into_reminder(ReminderId(id)))
            .clone())
    }

    async fn mark_reminder_sent(&self, id: ReminderId) -> Result<(), StoreError> {
        let mut table = self.reminders.write().await;
        let reminder = table
            .rows
            .get_mut(&id.0)
            .ok_or(StoreError::NotFound(Entity::Reminder))?;
        reminder.status = ReminderStatus::Sent;
        Ok(())
    }

    async fn pending_reminders(&self, as_of: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        let table = self.reminders.read().await;
        let mut due: Vec<Reminder> = table
            .rows
            .values()
            .filter(|r| r.is_due(as_of))
            .cloned()
            .collect();
        due.sort_by_key(|r| (r.trigger_at, r.id));
        Ok(due)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = self.users.write().await;

        if table
            .rows
            .values()
            .any(|u| u.external_id == user.external_id)
        {
            return Err(StoreError::AlreadyExists(Entity::User));
        }

        Ok(table.insert_with(|id| user.into_user(UserId(id))).clone())
    }

    async fn user_by_external_id(&self, external_id: ExternalId) -> Result<User, StoreError> {
        let table = self.users.read().await;
        table
            .rows
            .values()
            .find(|u| u.external_id == external_id)
            .cloned()
            .ok_or(StoreError::NotFound(Entity::User))
    }

    async fn user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let table = self.users.read().await;
        table
            .rows
            .get(&id.0)
            .cloned()
            .ok_or(StoreError::NotFound(Entity::User))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationCode;
    use chrono::{Duration, TimeZone};

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 23, 10, 0, 0).unwrap()
    }

    fn new_trip(user: i64) -> NewTrip {
        NewTrip::new(
            UserId(user),
            StationCode::parse("s9613483").unwrap(),
            StationCode::parse("s9612913").unwrap(),
            departure(),
        )
    }

    fn new_user(external: i64) -> NewUser {
        NewUser {
            external_id: ExternalId(external),
            name: "Anna".into(),
            username: Some("anna".into()),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user(100)).await.unwrap();
        let b = store.create_user(new_user(200)).await.unwrap();
        assert_eq!(a.id, UserId(1));
        assert_eq!(b.id, UserId(2));
    }

    #[tokio::test]
    async fn duplicate_external_id_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user(100)).await.unwrap();
        let err = store.create_user(new_user(100)).await.unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(Entity::User));
    }

    #[tokio::test]
    async fn user_lookups() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user(100)).await.unwrap();

        assert_eq!(
            store.user_by_external_id(ExternalId(100)).await.unwrap(),
            user
        );
        assert_eq!(store.user_by_id(user.id).await.unwrap(), user);
        assert_eq!(
            store.user_by_id(UserId(99)).await.unwrap_err(),
            StoreError::NotFound(Entity::User)
        );
    }

    #[tokio::test]
    async fn duplicate_trip_conflicts() {
        let store = MemoryStore::new();
        store.create_trip(new_trip(1)).await.unwrap();
        let err = store.create_trip(new_trip(1)).await.unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(Entity::Trip));

        // Another user may book the same train
        assert!(store.create_trip(new_trip(2)).await.is_ok());
    }

    #[tokio::test]
    async fn trips_by_user_filters_and_sorts() {
        let store = MemoryStore::new();
        let mut later = new_trip(1);
        later.departure = departure() + Duration::hours(2);
        store.create_trip(later).await.unwrap();
        store.create_trip(new_trip(1)).await.unwrap();
        store.create_trip(new_trip(2)).await.unwrap();

        let trips = store.trips_by_user(UserId(1)).await.unwrap();
        assert_eq!(trips.len(), 2);
        assert!(trips[0].departure < trips[1].departure);
    }

    #[tokio::test]
    async fn pending_respects_trigger_time_and_status() {
        let store = MemoryStore::new();
        let trip = store.create_trip(new_trip(1)).await.unwrap();
        let reminder = store
            .create_reminder(NewReminder::for_trip(&trip, "Taganrog"))
            .await
            .unwrap();

        let before = reminder.trigger_at - Duration::seconds(1);
        assert!(store.pending_reminders(before).await.unwrap().is_empty());

        let due = store.pending_reminders(reminder.trigger_at).await.unwrap();
        assert_eq!(due, vec![reminder.clone()]);

        store.mark_reminder_sent(reminder.id).await.unwrap();
        assert!(
            store
                .pending_reminders(reminder.trigger_at)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn mark_sent_is_idempotent() {
        let store = MemoryStore::new();
        let trip = store.create_trip(new_trip(1)).await.unwrap();
        let reminder = store
            .create_reminder(NewReminder::for_trip(&trip, "Taganrog"))
            .await
            .unwrap();

        store.mark_reminder_sent(reminder.id).await.unwrap();
        store.mark_reminder_sent(reminder.id).await.unwrap();

        let stored = store.reminder(reminder.id).await.unwrap();
        assert_eq!(stored.status, ReminderStatus::Sent);
        assert_eq!(store.reminders().await.len(), 1);
    }

    #[tokio::test]
    async fn one_reminder_per_trip() {
        let store = MemoryStore::new();
        let trip = store.create_trip(new_trip(1)).await.unwrap();
        store
            .create_reminder(NewReminder::for_trip(&trip, "a"))
            .await
            .unwrap();
        let err = store
            .create_reminder(NewReminder::for_trip(&trip, "b"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(Entity::Reminder));
    }

    #[tokio::test]
    async fn marking_unknown_reminder_fails() {
        let store = MemoryStore::new();
        assert_eq!(
            store.mark_reminder_sent(ReminderId(5)).await.unwrap_err(),
            StoreError::NotFound(Entity::Reminder)
        );
    }
}
