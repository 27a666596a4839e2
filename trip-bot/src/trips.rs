//! Trip booking service.
//!
//! Registers users, validates and commits trips, and schedules the
//! reminder for each committed trip.

use std::sync::Arc;

use crate::domain::{
    ErrorKind, ExternalId, NewReminder, NewTrip, NewUser, Reminder, Trip, TripId, User,
    ValidationError,
};
use crate::stations::StationDirectory;
use crate::store::{ReminderRepository, StoreError, TripRepository, UserRepository};

/// Errors from trip operations.
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The trip was committed but its reminder was not. The trip is kept.
    #[error("trip #{trip_id} was saved, but its reminder could not be scheduled: {source}")]
    ReminderFailed {
        trip_id: TripId,
        #[source]
        source: StoreError,
    },
}

impl TripError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TripError::Validation(_) => ErrorKind::Validation,
            TripError::Store(e) => e.kind(),
            TripError::ReminderFailed { source, .. } => source.kind(),
        }
    }
}

/// A trip together with its reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub trip: Trip,
    pub reminder: Reminder,
}

/// Who is talking to the bot, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub external_id: ExternalId,
    pub name: String,
    pub username: Option<String>,
}

impl Profile {
    pub fn new(external_id: ExternalId, name: impl Into<String>) -> Self {
        Self {
            external_id,
            name: name.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Facade over the repositories used by the conversation.
#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripRepository>,
    reminders: Arc<dyn ReminderRepository>,
    users: Arc<dyn UserRepository>,
    stations: Arc<StationDirectory>,
}

impl TripService {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        reminders: Arc<dyn ReminderRepository>,
        users: Arc<dyn UserRepository>,
        stations: Arc<StationDirectory>,
    ) -> Self {
        Self {
            trips,
            reminders,
            users,
            stations,
        }
    }

    /// Look the user up by chat id, registering them on first contact.
    pub async fn ensure_user(&self, profile: &Profile) -> Result<User, TripError> {
        match self.users.user_by_external_id(profile.external_id).await {
            Ok(user) => return Ok(user),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let new_user = NewUser {
            external_id: profile.external_id,
            name: profile.name.clone(),
            username: profile.username.clone(),
        };
        new_user.validate()?;

        match self.users.create_user(new_user).await {
            Ok(user) => {
                tracing::info!(user = %user.id, external_id = %user.external_id, "registered user");
                Ok(user)
            }
            // Another request registered the same user first
            Err(StoreError::AlreadyExists(_)) => Ok(self
                .users
                .user_by_external_id(profile.external_id)
                .await?),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn user_by_external_id(&self, external_id: ExternalId) -> Result<User, TripError> {
        Ok(self.users.user_by_external_id(external_id).await?)
    }

    /// Validate and persist a trip.
    pub async fn create_trip(&self, trip: NewTrip) -> Result<Trip, TripError> {
        trip.validate()?;
        Ok(self.trips.create_trip(trip).await?)
    }

    /// Commit a trip and schedule its reminder.
    ///
    /// A reminder failure is reported as `ReminderFailed`; the trip stays
    /// committed.
    pub async fn confirm_trip(&self, trip: NewTrip) -> Result<Confirmation, TripError> {
        let trip = self.create_trip(trip).await?;
        let origin = self.stations.label(&trip.from);

        let reminder = self
            .reminders
            .create_reminder(NewReminder::for_trip(&trip, &origin))
            .await
            .map_err(|source| {
                tracing::error!(trip = %trip.id, error = %source, "reminder not created for committed trip");
                TripError::ReminderFailed {
                    trip_id: trip.id,
                    source,
                }
            })?;

        tracing::info!(
            trip = %trip.id,
            reminder = %reminder.id,
            trigger_at = %reminder.trigger_at,
            "trip confirmed"
        );
        Ok(Confirmation { trip, reminder })
    }

    /// Trips of the user with this chat id, earliest first. Unknown users
    /// have no trips.
    pub async fn trips_for(&self, external_id: ExternalId) -> Result<Vec<Trip>, TripError> {
        let user = match self.users.user_by_external_id(external_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(self.trips.trips_by_user(user.id).await?)
    }

    pub fn stations(&self) -> &StationDirectory {
        &self.stations
    }
}
