//! Schedule options returned by the schedule provider.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One candidate departure for a station pair.
///
/// Transient: lives in a session while the user picks a train and is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleOption {
    /// Train number as published by the provider (e.g. "6301").
    pub train_number: String,
    /// Route title (e.g. "Taganrog - Rostov").
    pub title: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl ScheduleOption {
    /// True if the train leaves at or after `instant`.
    pub fn departs_at_or_after(&self, instant: DateTime<Utc>) -> bool {
        self.departure >= instant
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}
