//! Persistence error types.

use std::fmt;

use crate::domain::ErrorKind;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Trip,
    Reminder,
    User,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Trip => "trip",
            Entity::Reminder => "reminder",
            Entity::User => "user",
        })
    }
}

/// Errors from a repository call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert
    #[error("{0} already exists")]
    AlreadyExists(Entity),

    /// No record with the requested key
    #[error("{0} not found")]
    NotFound(Entity),

    /// The backend failed (connection, timeout, ...)
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::AlreadyExists(_) => ErrorKind::Conflict,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Backend(_) => ErrorKind::Transient,
        }
    }
}
