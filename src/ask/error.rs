use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single ask operation. Cancellation is not an error
/// and never shows up here.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("authentication failed (401)")]
    Unauthorized,
    #[error("ask request failed with status: {0}")]
    Status(StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("stream error: {0}")]
    Stream(String),
}

pub const AUTH_ERROR_MESSAGE: &str = "Authentication failed, please log in again";
pub const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, an error occurred while processing your question. Please try again later.";

impl AskError {
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized
        } else {
            Self::Status(status)
        }
    }

    /// The text shown to the user in place of an answer.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => AUTH_ERROR_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            AskError::from_status(StatusCode::UNAUTHORIZED),
            AskError::Unauthorized
        ));
        assert!(matches!(
            AskError::from_status(StatusCode::BAD_GATEWAY),
            AskError::Status(StatusCode::BAD_GATEWAY)
        ));
    }

    #[test]
    fn test_user_message() {
        assert_eq!(AskError::Unauthorized.user_message(), AUTH_ERROR_MESSAGE);
        assert_eq!(
            AskError::Status(StatusCode::INTERNAL_SERVER_ERROR).user_message(),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(
            AskError::Stream("boom".to_string()).user_message(),
            GENERIC_ERROR_MESSAGE
        );
    }
}
