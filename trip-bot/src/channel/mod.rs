//! Message delivery.
//!
//! The controller's replies and the dispatcher's reminders both leave the
//! process through a `MessageChannel`. Channels that are not safe for
//! concurrent use are wrapped in a `SerializedChannel`.

mod error;
mod logging;
mod serialized;
mod webhook;

use async_trait::async_trait;

use crate::bot::Button;
use crate::domain::{ExternalId, MessageId};

pub use error::ChannelError;
pub use logging::LogChannel;
pub use serialized::{SerializedChannel, SharedChannel};
pub use webhook::{WebhookChannel, WebhookConfig};

/// Outbound message transport.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Post a new message to `chat`, returning its id.
    async fn send_text(
        &self,
        chat: ExternalId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<MessageId, ChannelError>;

    /// Replace an earlier message in place.
    async fn edit_text(
        &self,
        _chat: ExternalId,
        _message: MessageId,
        _text: &str,
        _keyboard: &[Vec<Button>],
    ) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported)
    }
}

#[async_trait]
impl<C: MessageChannel + ?Sized> MessageChannel for std::sync::Arc<C> {
    async fn send_text(
        &self,
        chat: ExternalId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<MessageId, ChannelError> {
        (**self).send_text(chat, text, keyboard).await
    }

    async fn edit_text(
        &self,
        chat: ExternalId,
        message: MessageId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<(), ChannelError> {
        (**self).edit_text(chat, message, text, keyboard).await
    }
}
