//! Delivery error types.

/// Errors from a message channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The channel did not answer in time
    #[error("delivery timed out")]
    Timeout,

    /// The channel cannot perform this operation (e.g. editing)
    #[error("operation not supported by channel")]
    Unsupported,

    /// The channel rejected or failed the delivery
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChannelError::Timeout
        } else {
            ChannelError::Delivery(err.to_string())
        }
    }
}
