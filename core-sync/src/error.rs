use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Source tracker error: {0}")]
    Source(#[source] BridgeError),

    #[error("Catalog error: {0}")]
    Catalog(#[source] BridgeError),

    #[error("Sync is not configured: {0}")]
    Configuration(String),

    #[error("Invalid username '{username}': {message}")]
    InvalidUsername { username: String, message: String },

    #[error("Sync queue is closed")]
    QueueClosed,
}

impl SyncError {
    /// True when the source tracker reported that the user does not exist.
    pub fn is_user_not_found(&self) -> bool {
        matches!(self, SyncError::Source(BridgeError::UserNotFound(_)))
    }

    /// True when the catalog rejected the configured credentials.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SyncError::Catalog(BridgeError::PermissionDenied(_)))
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
