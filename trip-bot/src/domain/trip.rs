//! Trips.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{StationCode, TripId, UserId, ValidationError};

/// A committed trip. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trip {
    pub id: TripId,
    pub user_id: UserId,
    pub from: StationCode,
    pub to: StationCode,
    /// Reading material linked to the trip, if any.
    pub book_id: Option<i64>,
    pub departure: DateTime<Utc>,
}

/// A trip not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub user_id: UserId,
    pub from: StationCode,
    pub to: StationCode,
    pub book_id: Option<i64>,
    pub departure: DateTime<Utc>,
}

impl NewTrip {
    pub fn new(
        user_id: UserId,
        from: StationCode,
        to: StationCode,
        departure: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            from,
            to,
            book_id: None,
            departure,
        }
    }

    /// Check the trip before handing it to persistence.
    ///
    /// Station codes are non-empty by construction; a departure at or before
    /// the Unix epoch counts as unset.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.departure.timestamp() <= 0 {
            return Err(ValidationError::MissingDeparture);
        }
        if self.from == self.to {
            return Err(ValidationError::SameStation);
        }
        Ok(())
    }

    /// Attach the persisted id.
    pub fn into_trip(self, id: TripId) -> Trip {
        Trip {
            id,
            user_id: self.user_id,
            from: self.from,
            to: self.to,
            book_id: self.book_id,
            departure: self.departure,
        }
    }
}
