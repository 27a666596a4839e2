//! Identifier newtypes.
//!
//! Persistence assigns the numeric ids; the external id is the user's
//! identity on the chat platform and doubles as the delivery address.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Internal user id.
    UserId
);
id_type!(
    /// Trip id.
    TripId
);
id_type!(
    /// Reminder id.
    ReminderId
);
id_type!(
    /// Chat-platform user id. Also the chat to deliver messages to.
    ExternalId
);
id_type!(
    /// Id of a message already delivered to a chat, used for edits.
    MessageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_bare_number() {
        assert_eq!(TripId(42).to_string(), "42");
        assert_eq!(ExternalId(-100).to_string(), "-100");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&ReminderId(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str("9").unwrap();
        assert_eq!(back, UserId(9));
    }
}
