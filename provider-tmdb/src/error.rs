//! Error types for the TMDb provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// TMDb provider errors
#[derive(Error, Debug)]
pub enum TmdbError {
    /// API request returned a non-success status
    #[error("TMDb API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse TMDb response: {0}")]
    ParseError(String),

    /// The v4 account object id is neither configured nor present in the token
    #[error("Cannot determine TMDb account: {0}")]
    MissingAccount(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for TMDb operations
pub type Result<T> = std::result::Result<T, TmdbError>;

impl From<TmdbError> for BridgeError {
    fn from(error: TmdbError) -> Self {
        match error {
            TmdbError::ApiError {
                status_code: status @ (401 | 403),
                message,
            } => BridgeError::PermissionDenied(format!("HTTP {}: {}", status, message)),
            TmdbError::ApiError {
                status_code,
                message,
            } => BridgeError::CatalogUnavailable(format!("HTTP {}: {}", status_code, message)),
            TmdbError::ParseError(message) => BridgeError::CatalogUnavailable(message),
            TmdbError::MissingAccount(message) => BridgeError::PermissionDenied(message),
            TmdbError::BridgeError(BridgeError::OperationFailed(message))
            | TmdbError::BridgeError(BridgeError::NotAvailable(message)) => {
                BridgeError::CatalogUnavailable(message)
            }
            TmdbError::BridgeError(other) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let denied: BridgeError = TmdbError::ApiError {
            status_code: 401,
            message: "Invalid token".into(),
        }
        .into();
        assert!(matches!(denied, BridgeError::PermissionDenied(_)));

        let unavailable: BridgeError = TmdbError::ApiError {
            status_code: 404,
            message: "missing".into(),
        }
        .into();
        assert!(matches!(unavailable, BridgeError::CatalogUnavailable(_)));
    }

    #[test]
    fn test_transport_failures_become_catalog_unavailable() {
        let mapped: BridgeError =
            TmdbError::BridgeError(BridgeError::OperationFailed("Request timed out".into())).into();
        assert!(matches!(mapped, BridgeError::CatalogUnavailable(ref m) if m == "Request timed out"));
    }
}
