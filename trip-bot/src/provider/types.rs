//! Schedule search response DTOs.
//!
//! Only the fields the bot shows are mapped; everything else in the
//! response is ignored.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::Deserialize;

use crate::domain::ScheduleOption;

/// Response from `GET /v3.0/search/`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Departures between the two stations on the requested date.
    #[serde(default)]
    pub segments: Vec<Segment>,
}

/// One departure.
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    /// Departure time with the station's UTC offset.
    pub departure: DateTime<FixedOffset>,

    /// Arrival time with the station's UTC offset.
    pub arrival: DateTime<FixedOffset>,

    /// Travel time in seconds.
    pub duration: f64,

    pub thread: Thread,
}

/// The train running the segment.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    /// Train number, e.g. "6301".
    pub number: String,

    /// Route title, e.g. "Taganrog - Rostov".
    pub title: String,
}

impl From<Segment> for ScheduleOption {
    fn from(s: Segment) -> Self {
        ScheduleOption {
            train_number: s.thread.number,
            title: s.thread.title,
            departure: s.departure.with_timezone(&Utc),
            arrival: s.arrival.with_timezone(&Utc),
            duration: Duration::seconds(s.duration.round() as i64),
        }
    }
}

impl SearchResponse {
    /// Convert every segment, in response order.
    pub fn into_options(self) -> Vec<ScheduleOption> {
        self.segments.into_iter().map(ScheduleOption::from).collect()
    }
}
