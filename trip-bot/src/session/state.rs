//! Conversation state and per-user session data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ScheduleOption, Station};
use crate::schedule;

/// Most recent stations remembered per user.
pub const MAX_RECENT: usize = 5;

/// Position in the booking conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvState {
    /// No booking in progress.
    Idle,
    /// Picking the departure station from buttons.
    SelectingFrom,
    /// Picking the destination station from buttons.
    SelectingTo,
    /// Browsing schedule results.
    ShowingSchedule,
    /// Typing the departure station.
    WaitingFrom,
    /// Typing the destination station.
    WaitingTo,
}

impl ConvState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::SelectingFrom => "selecting_from",
            ConvState::SelectingTo => "selecting_to",
            ConvState::ShowingSchedule => "showing_schedule",
            ConvState::WaitingFrom => "waiting_from",
            ConvState::WaitingTo => "waiting_to",
        }
    }

    /// States in which a destination is being chosen.
    pub fn is_choosing_destination(&self) -> bool {
        matches!(self, ConvState::SelectingTo | ConvState::WaitingTo)
    }
}

/// In-progress booking for one user.
///
/// `history` is never empty and its last entry is the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    history: Vec<ConvState>,
    pub from: Option<Station>,
    pub to: Option<Station>,
    /// Earliest departure to search for. Set when the booking starts and
    /// never moved by a search.
    pub date: DateTime<Utc>,
    results: Vec<ScheduleOption>,
    results_from: DateTime<Utc>,
    page: usize,
    recent: Vec<Station>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            history: vec![ConvState::Idle],
            from: None,
            to: None,
            date: now,
            results: Vec::new(),
            results_from: now,
            page: 0,
            recent: Vec::new(),
        }
    }

    /// Start a new booking. Recent stations survive; everything else is
    /// cleared and the history restarts at `SelectingFrom`.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        let recent = std::mem::take(&mut self.recent);
        *self = Self::new(now);
        self.recent = recent;
        self.history = vec![ConvState::SelectingFrom];
    }

    pub fn state(&self) -> ConvState {
        self.history.last().copied().unwrap_or(ConvState::Idle)
    }

    pub fn history(&self) -> &[ConvState] {
        &self.history
    }

    /// Move forward to `next`.
    pub fn transition(&mut self, next: ConvState) {
        self.history.push(next);
    }

    /// Go back to the latest `state` in the history, dropping every step
    /// after it. Pushes `state` when it is not in the history.
    pub fn rewind_to(&mut self, state: ConvState) {
        match self.history.iter().rposition(|s| *s == state) {
            Some(i) => self.history.truncate(i + 1),
            None => self.history.push(state),
        }
    }

    /// Undo the last transition. Returns the state now current, or `None`
    /// (leaving the session untouched) when there is no previous step.
    pub fn back(&mut self) -> Option<ConvState> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        Some(self.state())
    }

    /// Put `station` at the front of the recent list, removing any earlier
    /// entry with the same code and keeping at most `MAX_RECENT`.
    pub fn remember_station(&mut self, station: &Station) {
        self.recent.retain(|s| s.code != station.code);
        self.recent.insert(0, station.clone());
        self.recent.truncate(MAX_RECENT);
    }

    pub fn recent(&self) -> &[Station] {
        &self.recent
    }

    pub fn results(&self) -> &[ScheduleOption] {
        &self.results
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Store a new result set and go back to its first page.
    ///
    /// `from` is the instant the search effectively started at, which is
    /// later than `date` when the provider was asked about the next day.
    pub fn set_results(&mut self, results: Vec<ScheduleOption>, from: DateTime<Utc>) {
        self.results = results;
        self.results_from = from;
        self.page = 0;
    }

    /// Start of the day shown with the current results.
    pub fn results_from(&self) -> DateTime<Utc> {
        self.results_from
    }

    /// Switch to `page` if it has results. Returns whether it changed.
    pub fn set_page(&mut self, page: usize) -> bool {
        if !schedule::is_valid_page(self.results.len(), page) {
            return false;
        }
        self.page = page;
        true
    }

    /// Label of the chosen origin, if any.
    pub fn from_label(&self) -> &str {
        self.from.as_ref().map(|s| s.name.as_str()).unwrap_or("?")
    }

    /// Label of the chosen destination, if any.
    pub fn to_label(&self) -> &str {
        self.to.as_ref().map(|s| s.name.as_str()).unwrap_or("?")
    }
}
