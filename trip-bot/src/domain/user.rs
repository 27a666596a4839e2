//! Users.

use serde::Serialize;

use super::{ExternalId, UserId, ValidationError};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalId,
    pub name: String,
    pub username: Option<String>,
}

/// A user not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub external_id: ExternalId,
    pub name: String,
    pub username: Option<String>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.external_id.0 == 0 {
            return Err(ValidationError::EmptyExternalId);
        }
        Ok(())
    }

    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            external_id: self.external_id,
            name: self.name,
            username: self.username,
        }
    }
}
