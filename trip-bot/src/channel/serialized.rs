//! Mutual exclusion around a channel.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::bot::Button;
use crate::domain::{ExternalId, MessageId};

use super::{ChannelError, MessageChannel};

/// Channel handle shared by the controller and every dispatcher task.
pub type SharedChannel = Arc<SerializedChannel<Arc<dyn MessageChannel>>>;

/// Wraps a channel so at most one call runs at a time.
///
/// The lock is held for exactly one send or edit. Callers bound the wait
/// with their own timeout.
pub struct SerializedChannel<C> {
    inner: C,
    lock: Mutex<()>,
}

impl<C: MessageChannel> SerializedChannel<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl SerializedChannel<Arc<dyn MessageChannel>> {
    /// Wrap a shared channel for use across tasks.
    pub fn shared(inner: Arc<dyn MessageChannel>) -> SharedChannel {
        Arc::new(Self::new(inner))
    }
}

#[async_trait]
impl<C: MessageChannel> MessageChannel for SerializedChannel<C> {
    async fn send_text(
        &self,
        chat: ExternalId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<MessageId, ChannelError> {
        let _guard = self.lock.lock().await;
        self.inner.send_text(chat, text, keyboard).await
    }

    async fn edit_text(
        &self,
        chat: ExternalId,
        message: MessageId,
        text: &str,
        keyboard: &[Vec<Button>],
    ) -> Result<(), ChannelError> {
        let _guard = self.lock.lock().await;
        self.inner.edit_text(chat, message, text, keyboard).await
    }
}
