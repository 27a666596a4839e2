//! Domain error types.
//!
//! Validation failures are rejected before any persistence call and are
//! shown to the user verbatim, so their messages are user-facing.

/// Input rejected before reaching persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A station code was empty.
    #[error("station must not be empty")]
    EmptyStation,

    /// A station code was not in the provider's format.
    #[error("invalid station code: {0}")]
    InvalidStation(String),

    /// Origin and destination are the same station.
    #[error("origin and destination must differ")]
    SameStation,

    /// Departure time missing (zero or before the epoch).
    #[error("departure time must be set")]
    MissingDeparture,

    /// The chat-platform id was zero.
    #[error("external user id must not be zero")]
    EmptyExternalId,
}

/// Coarse classification used to pick how an error is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; shown verbatim.
    Validation,
    /// Uniqueness violation; shown as "already exists", no retry.
    Conflict,
    /// Unknown reference; the user is asked to retry the step.
    NotFound,
    /// Provider, network or storage hiccup; retried by the user or next tick.
    Transient,
}
