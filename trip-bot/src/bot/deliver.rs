//! Pushing replies through a channel.

use crate::channel::{ChannelError, MessageChannel};
use crate::domain::{ExternalId, MessageId};

use super::reply::{Reply, ReplyMode};

/// Deliver `reply` to `chat`.
///
/// `Edit` replies replace `pressed` (the message holding the button) when
/// the channel can edit, and are sent as a new message otherwise. `Answer`
/// replies are inline acknowledgements and post nothing. Returns the id of
/// the message now showing the reply, if any.
pub async fn deliver<C: MessageChannel + ?Sized>(
    channel: &C,
    chat: ExternalId,
    pressed: Option<MessageId>,
    reply: &Reply,
) -> Result<Option<MessageId>, ChannelError> {
    match (reply.mode, pressed) {
        (ReplyMode::Answer, _) => Ok(None),
        (ReplyMode::Edit, Some(message)) => {
            match channel
                .edit_text(chat, message, &reply.text, &reply.keyboard)
                .await
            {
                Ok(()) => Ok(Some(message)),
                Err(e) => {
                    tracing::debug!(%chat, message_id = %message, error = %e, "edit failed, sending instead");
                    channel
                        .send_text(chat, &reply.text, &reply.keyboard)
                        .await
                        .map(Some)
                }
            }
        }
        (ReplyMode::Edit, None) | (ReplyMode::Send, _) => channel
            .send_text(chat, &reply.text, &reply.keyboard)
            .await
            .map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::Button;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Channel that records calls and can refuse edits.
    #[derive(Default)]
    struct Recorder {
        can_edit: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageChannel for Recorder {
        async fn send_text(
            &self,
            _: ExternalId,
            text: &str,
            _: &[Vec<Button>],
        ) -> Result<MessageId, ChannelError> {
            self.calls.lock().await.push(format!("send {text}"));
            Ok(MessageId(99))
        }

        async fn edit_text(
            &self,
            _: ExternalId,
            message: MessageId,
            text: &str,
            _: &[Vec<Button>],
        ) -> Result<(), ChannelError> {
            if !self.can_edit {
                return Err(ChannelError::Unsupported);
            }
            self.calls.lock().await.push(format!("edit {message} {text}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn edit_in_place_when_supported() {
        let channel = Recorder {
            can_edit: true,
            ..Default::default()
        };
        let id = deliver(&channel, ExternalId(1), Some(MessageId(5)), &Reply::edit("page 2"))
            .await
            .unwrap();

        assert_eq!(id, Some(MessageId(5)));
        assert_eq!(*channel.calls.lock().await, vec!["edit 5 page 2"]);
    }

    #[tokio::test]
    async fn edit_falls_back_to_send() {
        let channel = Recorder::default();
        let id = deliver(&channel, ExternalId(1), Some(MessageId(5)), &Reply::edit("page 2"))
            .await
            .unwrap();

        assert_eq!(id, Some(MessageId(99)));
        assert_eq!(*channel.calls.lock().await, vec!["send page 2"]);
    }

    #[tokio::test]
    async fn answers_post_nothing() {
        let channel = Recorder::default();
        let id = deliver(&channel, ExternalId(1), None, &Reply::answer("ok"))
            .await
            .unwrap();

        assert_eq!(id, None);
        assert!(channel.calls.lock().await.is_empty());
    }
}
