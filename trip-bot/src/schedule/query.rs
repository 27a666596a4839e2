//! Schedule lookup with the past-departure filter and next-day retry.

use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, TimeZone, Utc};

use crate::domain::{ScheduleOption, StationCode};
use crate::provider::{ProviderError, ScheduleProvider};

/// Result of a schedule search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSearch {
    /// Every option departing at or after `date`, in provider order.
    pub options: Vec<ScheduleOption>,
    /// The instant the search effectively started from. Moves to the next
    /// local midnight when the requested day had nothing left.
    pub date: DateTime<Utc>,
}

impl ScheduleSearch {
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Thin call-through to a schedule provider.
///
/// Options that already left are dropped. If nothing remains, the next
/// calendar day (from local midnight) is tried exactly once. Results are
/// never truncated; paging happens when rendering.
#[derive(Clone)]
pub struct ScheduleQuery {
    provider: Arc<dyn ScheduleProvider>,
    offset: FixedOffset,
}

impl ScheduleQuery {
    /// `offset` is the local time zone calendar days are counted in.
    pub fn new(provider: Arc<dyn ScheduleProvider>, offset: FixedOffset) -> Self {
        Self { provider, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub async fn search(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: DateTime<Utc>,
    ) -> Result<ScheduleSearch, ProviderError> {
        let options = self.fetch_from(from, to, date).await?;
        if !options.is_empty() {
            return Ok(ScheduleSearch { options, date });
        }

        let Some(next_day) = self.next_midnight(date) else {
            return Ok(ScheduleSearch { options, date });
        };

        tracing::debug!(%from, %to, %next_day, "no trains left today, trying next day");
        let options = self.fetch_from(from, to, next_day).await?;
        Ok(ScheduleSearch {
            options,
            date: next_day,
        })
    }

    /// Query the provider for the local day containing `start` and keep
    /// the options departing at or after it.
    async fn fetch_from(
        &self,
        from: &StationCode,
        to: &StationCode,
        start: DateTime<Utc>,
    ) -> Result<Vec<ScheduleOption>, ProviderError> {
        let day = start.with_timezone(&self.offset).date_naive();
        let all = self.provider.get_options(from, to, day).await?;
        let total = all.len();

        let kept: Vec<ScheduleOption> = all
            .into_iter()
            .filter(|o| o.departs_at_or_after(start))
            .collect();

        tracing::debug!(%from, %to, %day, total, kept = kept.len(), "schedule fetched");
        Ok(kept)
    }

    /// Midnight at the start of the local day after `instant`.
    fn next_midnight(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local_day = instant.with_timezone(&self.offset).date_naive();
        let next = local_day.checked_add_days(Days::new(1))?.and_hms_opt(0, 0, 0)?;
        self.offset
            .from_local_datetime(&next)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
