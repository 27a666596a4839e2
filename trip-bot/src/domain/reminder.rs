//! Reminders.
//!
//! A reminder is created together with its trip, fires a fixed lead time
//! before departure and is only ever moved from pending to sent by the
//! dispatcher. The trigger time is never recomputed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{ReminderId, Trip, TripId, UserId};

/// How long before departure a reminder fires.
pub const REMINDER_LEAD_MINS: i64 = 30;

/// Delivery status of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Failed,
    Cancelled,
}

impl ReminderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Sent => "sent",
            ReminderStatus::Failed => "failed",
            ReminderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reminder status: {0}")]
pub struct InvalidStatus(String);

impl FromStr for ReminderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReminderStatus::Pending),
            "sent" => Ok(ReminderStatus::Sent),
            "failed" => Ok(ReminderStatus::Failed),
            "cancelled" => Ok(ReminderStatus::Cancelled),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// A persisted reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub trip_id: TripId,
    pub user_id: UserId,
    pub message: String,
    pub trigger_at: DateTime<Utc>,
    pub status: ReminderStatus,
}

impl Reminder {
    /// True if the dispatcher should pick this reminder up at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ReminderStatus::Pending && self.trigger_at <= now
    }
}

/// A reminder not yet persisted. Always created as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub trip_id: TripId,
    pub user_id: UserId,
    pub message: String,
    pub trigger_at: DateTime<Utc>,
}

impl NewReminder {
    /// Build the reminder for a committed trip.
    ///
    /// `origin` is the label of the departure station shown in the message.
    pub fn for_trip(trip: &Trip, origin: &str) -> Self {
        Self {
            trip_id: trip.id,
            user_id: trip.user_id,
            message: format!(
                "Your trip from {origin} departs in {REMINDER_LEAD_MINS} minutes! Don't be late."
            ),
            trigger_at: trip.departure - Duration::minutes(REMINDER_LEAD_MINS),
        }
    }

    /// Attach the persisted id.
    pub fn into_reminder(self, id: ReminderId) -> Reminder {
        Reminder {
            id,
            trip_id: self.trip_id,
            user_id: self.user_id,
            message: self.message,
            trigger_at: self.trigger_at,
            status: ReminderStatus::Pending,
        }
    }
}
