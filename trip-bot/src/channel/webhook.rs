//! Channel that posts messages to an HTTP webhook.
//!
//! The receiving side (a chat-platform bridge) gets `{chat_id, text,
//! keyboard}` as JSON and may answer with `{message_id}`. Edits go to
//! `{url}/edit`; a bridge without that route makes edits unsupported.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bot::Button;
use crate::domain::{ExternalId, MessageId};

use super::{ChannelError, MessageChannel};

/// Configuration for the webhook channel.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    chat_id: ExternalId,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<MessageId>,
    text: &'a str,
    keyboard: &'a [Vec<Button>],
}

#[derive(Debug, Default, Deserialize)]
struct Ack {
    message_id: Option<MessageId>,
}

/// Posts deliveries to a webhook with `reqwest`.
#[derive(Debug, Clone)]
pub struct WebhookChannel {
    http: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    pub fn new(config: WebhookConfig) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
        })
    }

    async fn post(
        &self,
        url: &str,
        body: &OutgoingMessage<'_>,
    ) -> Result<reqwest::Response, ChannelError> {
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();

        if matches!(
            status,
            reqwest::StatusCode::NOT_FOUND
                | reqwest::StatusCode::METHOD_NOT_ALLOWED
                | reqwest::StatusCode::NOT_IMPLEMENTED
        ) && body.message_id.is_some()
        {
            return Err(ChannelError::Unsupported);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChannelError::Delivery(format!(
                "status {}: {text}",
                status.as_u16()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl MessageChannel for WebhookChannel {
    async fn send_text(
        &self,
        chat: ExternalId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<MessageId, ChannelError> {
        let body = OutgoingMessage {
            chat_id: chat,
            message_id: None,
            text,
            keyboard,
        };
        let response = self.post(&self.url, &body).await?;

        // Bridges that do not track messages answer with an empty body
        let ack: Ack = response.json().await.unwrap_or_default();
        Ok(ack.message_id.unwrap_or(MessageId(0)))
    }

    async fn edit_text(
        &self,
        chat: ExternalId,
        message: MessageId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<(), ChannelError> {
        let body = OutgoingMessage {
            chat_id: chat,
            message_id: Some(message),
            text,
            keyboard,
        };
        self.post(&format!("{}/edit", self.url), &body).await?;
        Ok(())
    }
}
