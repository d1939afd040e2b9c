use thiserror::Error;

/// Failures reported by external-system adapters.
///
/// The first four variants form the taxonomy the sync engine reasons about;
/// the rest are plumbing failures that adapters surface when nothing more
/// specific applies.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Source tracker unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Catalog permission denied: {0}")]
    PermissionDenied(String),

    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns true for errors that point at the remote side being down or
    /// misbehaving rather than at the request itself.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BridgeError::SourceUnavailable(_)
                | BridgeError::CatalogUnavailable(_)
                | BridgeError::OperationFailed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
