//! Schedule provider error types.

use std::fmt;

use crate::domain::ErrorKind;

/// Errors from a schedule provider.
#[derive(Debug)]
pub enum ProviderError {
    /// HTTP request failed (connection refused, reset, ...)
    Http(reqwest::Error),

    /// Response body was not the expected JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an error status code
    Api { status: u16, message: String },

    /// Invalid API key
    Unauthorized,

    /// Rate limited by the API
    RateLimited,

    /// No response within the request timeout
    Timeout,
}

impl ProviderError {
    /// Every provider failure is worth retrying from the user's side.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transient
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Http(e) => write!(f, "HTTP error: {e}"),
            ProviderError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            ProviderError::Api { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            ProviderError::Unauthorized => write!(f, "unauthorized (invalid API key)"),
            ProviderError::RateLimited => write!(f, "rate limited by schedule API"),
            ProviderError::Timeout => write!(f, "schedule request timed out"),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = ProviderError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert_eq!(
            err.to_string(),
            "JSON parse error: expected value (body: <html>)"
        );

        assert_eq!(
            ProviderError::Timeout.to_string(),
            "schedule request timed out"
        );
    }

    #[test]
    fn all_errors_are_transient() {
        assert_eq!(ProviderError::RateLimited.kind(), ErrorKind::Transient);
        assert_eq!(ProviderError::Unauthorized.kind(), ErrorKind::Transient);
    }
}
