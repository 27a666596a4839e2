//! Reminder dispatch loop.
//!
//! Each poller wakes on a fixed interval, fetches every due pending
//! reminder and delivers the batch with bounded concurrency. The next fetch
//! waits until the whole batch has finished. Failed deliveries stay pending
//! and are retried on a later tick, so delivery is at-least-once: two
//! pollers, or a failed mark-as-sent, can deliver the same reminder twice.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::channel::{MessageChannel, SharedChannel};
use crate::clock::{self, Clock};
use crate::domain::Reminder;
use crate::store::{ReminderRepository, StoreError, UserRepository};

use super::DispatchConfig;

/// What happened to one reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Delivered and marked sent.
    Sent,
    /// Delivery failed or timed out; still pending.
    Failed,
    /// Owner unknown; skipped without marking.
    Dropped,
    /// Delivered but could not be marked sent; will be delivered again.
    Unmarked,
}

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fetched: usize,
    pub sent: usize,
    pub failed: usize,
    pub dropped: usize,
    pub unmarked: usize,
}

impl TickReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Sent => self.sent += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Dropped => self.dropped += 1,
            Outcome::Unmarked => self.unmarked += 1,
        }
    }
}

/// Delivers due reminders.
pub struct Dispatcher {
    reminders: Arc<dyn ReminderRepository>,
    users: Arc<dyn UserRepository>,
    channel: SharedChannel,
    config: DispatchConfig,
    clock: Clock,
}

impl Dispatcher {
    pub fn new(
        reminders: Arc<dyn ReminderRepository>,
        users: Arc<dyn UserRepository>,
        channel: SharedChannel,
        config: DispatchConfig,
    ) -> Self {
        Self {
            reminders,
            users,
            channel,
            config,
            clock: clock::system(),
        }
    }

    /// Replace the clock (for tests).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Fetch and deliver every reminder due at `now`.
    ///
    /// Returns once every delivery of the batch has finished.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, StoreError> {
        let due = self.reminders.pending_reminders(now).await?;
        let mut report = TickReport {
            fetched: due.len(),
            ..TickReport::default()
        };
        if due.is_empty() {
            return Ok(report);
        }

        let outcomes: Vec<Outcome> = stream::iter(due)
            .map(|reminder| self.dispatch_one(reminder))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }
        Ok(report)
    }

    async fn dispatch_one(&self, reminder: Reminder) -> Outcome {
        let user = match self.users.user_by_id(reminder.user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(
                    reminder_id = %reminder.id,
                    user = %reminder.user_id,
                    error = %e,
                    "reminder owner not found, skipping"
                );
                return Outcome::Dropped;
            }
        };

        let send = self
            .channel
            .send_text(user.external_id, &reminder.message, &[]);
        match tokio::time::timeout(self.config.send_timeout, send).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::warn!(reminder_id = %reminder.id, error = %e, "reminder delivery failed");
                return Outcome::Failed;
            }
            Err(_) => {
                tracing::warn!(reminder_id = %reminder.id, "reminder delivery timed out");
                return Outcome::Failed;
            }
        }

        if let Err(e) = self.reminders.mark_reminder_sent(reminder.id).await {
            tracing::error!(reminder_id = %reminder.id, error = %e, "reminder sent but not marked");
            return Outcome::Unmarked;
        }

        tracing::info!(reminder_id = %reminder.id, chat = %user.external_id, "reminder sent");
        Outcome::Sent
    }

    /// Poll until `cancel` fires.
    ///
    /// The first poll happens one interval after start. Cancellation is
    /// observed while idle; a batch in progress is allowed to finish.
    pub async fn run(&self, poller: usize, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // An interval's first tick completes immediately
        ticker.tick().await;

        tracing::info!(poller, interval = ?self.config.interval, "reminder poller started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.tick((self.clock)()).await {
                Ok(report) if report.fetched > 0 => {
                    tracing::info!(
                        poller,
                        fetched = report.fetched,
                        sent = report.sent,
                        failed = report.failed,
                        dropped = report.dropped,
                        unmarked = report.unmarked,
                        "dispatch tick"
                    );
                }
                Ok(_) => tracing::debug!(poller, "nothing due"),
                Err(e) => tracing::error!(poller, error = %e, "could not fetch pending reminders"),
            }
        }
        tracing::info!(poller, "reminder poller stopped");
    }

    /// Start `pollers` poller tasks sharing one cancellation token.
    pub fn spawn(
        self: &Arc<Self>,
        pollers: usize,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        (0..pollers.max(1))
            .map(|poller| {
                let dispatcher = Arc::clone(self);
                let cancel = cancel.clone();
                tokio::spawn(async move { dispatcher.run(poller, cancel).await })
            })
            .collect()
    }
}
