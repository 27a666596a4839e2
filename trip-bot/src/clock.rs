//! Wall-clock source, replaceable in tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The system clock.
pub fn system() -> Clock {
    Arc::new(Utc::now)
}

/// A clock stuck at `at`.
pub fn fixed(at: DateTime<Utc>) -> Clock {
    Arc::new(move || at)
}
