use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    /// Sync is disabled or its credentials are incomplete.
    #[error("{0}")]
    SyncUnavailable(String),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("{0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Source tracker error: {0}")]
    Source(#[source] BridgeError),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl CoreError {
    /// True when the source tracker does not know the requested user.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Source(BridgeError::UserNotFound(_)))
    }

    /// True for caller mistakes: malformed usernames or query values.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CoreError::Library(_) | CoreError::Sync(core_sync::SyncError::InvalidUsername { .. })
        )
    }

    /// True when the service cannot take sync work right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CoreError::SyncUnavailable(_) | CoreError::Sync(core_sync::SyncError::QueueClosed)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::LibraryError;
    use core_sync::SyncError;

    #[test]
    fn test_classification() {
        assert!(CoreError::Source(BridgeError::UserNotFound("ghost".into())).is_not_found());
        assert!(!CoreError::Source(BridgeError::SourceUnavailable("down".into())).is_not_found());

        assert!(CoreError::from(LibraryError::invalid("limit", "too big")).is_invalid_input());
        assert!(CoreError::SyncUnavailable("disabled".into()).is_unavailable());
        assert!(CoreError::from(SyncError::QueueClosed).is_unavailable());
        assert!(!CoreError::Scheduler("bad".into()).is_unavailable());
    }

    #[test]
    fn test_unavailable_message_is_passed_through() {
        let err = CoreError::SyncUnavailable("TMDB_API_KEY is required".into());
        assert_eq!(err.to_string(), "TMDB_API_KEY is required");
    }
}
