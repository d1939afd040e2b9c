//! Error types for the Letterboxd provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LetterboxdError {
    #[error("Letterboxd user not found: {0}")]
    UserNotFound(String),

    /// Page request returned an unexpected status
    #[error("Letterboxd returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Letterboxd page is not valid UTF-8: {0}")]
    InvalidPage(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, LetterboxdError>;

impl From<LetterboxdError> for BridgeError {
    fn from(error: LetterboxdError) -> Self {
        match error {
            LetterboxdError::UserNotFound(username) => BridgeError::UserNotFound(username),
            LetterboxdError::BridgeError(BridgeError::UserNotFound(username)) => {
                BridgeError::UserNotFound(username)
            }
            LetterboxdError::BridgeError(BridgeError::SourceUnavailable(message)) => {
                BridgeError::SourceUnavailable(message)
            }
            other => BridgeError::SourceUnavailable(other.to_string()),
        }
    }
}
