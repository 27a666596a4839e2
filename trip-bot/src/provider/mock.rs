//! Mock schedule provider for testing without API access.
//!
//! Serves canned options per route, optionally per date, and records every
//! call so tests can assert on what was queried.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::domain::{ScheduleOption, StationCode};

use super::ScheduleProvider;
use super::error::ProviderError;

type Route = (StationCode, StationCode);

/// What to answer for routes with no canned data.
#[derive(Debug, Clone, Copy)]
enum Fallback {
    Empty,
    /// One train every hour from 05:00 to 22:00 local time.
    Hourly(FixedOffset),
}

/// One recorded `get_options` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub from: StationCode,
    pub to: StationCode,
    pub date: NaiveDate,
}

/// Mock provider serving options from memory.
#[derive(Clone)]
pub struct MockScheduleProvider {
    by_route: Arc<RwLock<HashMap<Route, Vec<ScheduleOption>>>>,
    by_date: Arc<RwLock<HashMap<(Route, NaiveDate), Vec<ScheduleOption>>>>,
    failure: Arc<RwLock<Option<u16>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    fallback: Fallback,
}

impl MockScheduleProvider {
    /// A provider that knows no routes and answers with no trains.
    pub fn new() -> Self {
        Self::with_fallback(Fallback::Empty)
    }

    /// A provider that invents an hourly timetable for any route.
    ///
    /// Used when running the server without an API key.
    pub fn hourly(offset: FixedOffset) -> Self {
        Self::with_fallback(Fallback::Hourly(offset))
    }

    fn with_fallback(fallback: Fallback) -> Self {
        Self {
            by_route: Arc::new(RwLock::new(HashMap::new())),
            by_date: Arc::new(RwLock::new(HashMap::new())),
            failure: Arc::new(RwLock::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
            fallback,
        }
    }

    /// Serve `options` for a route on every date.
    pub async fn set_route(
        &self,
        from: StationCode,
        to: StationCode,
        options: Vec<ScheduleOption>,
    ) {
        self.by_route.write().await.insert((from, to), options);
    }

    /// Serve `options` for a route on one date. Takes precedence over
    /// `set_route`.
    pub async fn set_route_on(
        &self,
        from: StationCode,
        to: StationCode,
        date: NaiveDate,
        options: Vec<ScheduleOption>,
    ) {
        self.by_date
            .write()
            .await
            .insert(((from, to), date), options);
    }

    /// Make every following call fail with the given HTTP status, or clear
    /// the failure with `None`.
    pub async fn fail_with(&self, status: Option<u16>) {
        *self.failure.write().await = status;
    }

    /// Calls made so far, oldest first.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    fn hourly_options(offset: FixedOffset, date: NaiveDate) -> Vec<ScheduleOption> {
        (5..=22)
            .filter_map(|hour| {
                let local = date.and_hms_opt(hour, 0, 0)?;
                let departure = offset.from_local_datetime(&local).single()?;
                let departure = departure.with_timezone(&Utc);
                let duration = Duration::minutes(80);
                Some(ScheduleOption {
                    train_number: format!("{}", 6300 + hour),
                    title: "Suburban".to_string(),
                    departure,
                    arrival: departure + duration,
                    duration,
                })
            })
            .collect()
    }
}

impl Default for MockScheduleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleProvider for MockScheduleProvider {
    async fn get_options(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleOption>, ProviderError> {
        self.calls.lock().await.push(MockCall {
            from: from.clone(),
            to: to.clone(),
            date,
        });

        if let Some(status) = *self.failure.read().await {
            return Err(ProviderError::Api {
                status,
                message: "mock failure".to_string(),
            });
        }

        let route = (from.clone(), to.clone());
        if let Some(options) = self.by_date.read().await.get(&(route.clone(), date)) {
            return Ok(options.clone());
        }
        if let Some(options) = self.by_route.read().await.get(&route) {
            return Ok(options.clone());
        }

        Ok(match self.fallback {
            Fallback::Empty => Vec::new(),
            Fallback::Hourly(offset) => Self::hourly_options(offset, date),
        })
    }
}
