//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::bot::Reply;
use crate::domain::{MessageId, Station};

/// First contact from a user.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    /// Display name
    pub name: String,

    /// Chat-platform handle
    #[serde(default)]
    pub username: Option<String>,
}

/// Free text typed by the user.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// A button press.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// Encoded command token carried by the button
    pub token: String,

    /// Message the button was attached to, for in-place edits
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

/// The screen produced by a request.
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub reply: Reply,

    /// Message now showing the reply, if one was delivered
    pub message_id: Option<MessageId>,
}

/// Station search query.
#[derive(Debug, Deserialize)]
pub struct StationSearchRequest {
    /// Name fragment
    #[serde(default)]
    pub q: String,

    /// Maximum results (default 10, capped at 50)
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StationSearchResponse {
    pub stations: Vec<Station>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
