//! External schedule data.
//!
//! The controller asks a `ScheduleProvider` for the trains between two
//! stations on a date. The real implementation talks to a rasp-style HTTP
//! API; the mock serves canned data for tests and offline development.

mod client;
mod error;
mod mock;
mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ScheduleOption, StationCode};

pub use client::{ProviderConfig, ScheduleClient};
pub use error::ProviderError;
pub use mock::{MockCall, MockScheduleProvider};
pub use types::{SearchResponse, Segment, Thread};

/// Source of schedule options.
///
/// Codes are already normalised; the provider returns every option it
/// knows for the date, unfiltered.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn get_options(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleOption>, ProviderError>;
}
