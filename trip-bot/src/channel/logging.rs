//! Channel that writes deliveries to the log.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::bot::Button;
use crate::domain::{ExternalId, MessageId};

use super::{ChannelError, MessageChannel};

/// Development channel: every message is logged at `info`.
#[derive(Debug, Default)]
pub struct LogChannel {
    next_id: AtomicI64,
}

impl LogChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageChannel for LogChannel {
    async fn send_text(
        &self,
        chat: ExternalId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<MessageId, ChannelError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let buttons: usize = keyboard.iter().map(Vec::len).sum();
        tracing::info!(%chat, message_id = %id, buttons, "{text}");
        Ok(id)
    }

    async fn edit_text(
        &self,
        chat: ExternalId,
        message: MessageId,
        text: &str,
        _keyboard: &[Vec<Button>],
    ) -> Result<(), ChannelError> {
        tracing::info!(%chat, message_id = %message, edited = true, "{text}");
        Ok(())
    }
}
