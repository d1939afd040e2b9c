use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_service::CoreError;
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        if err.is_invalid_input() {
            return Self::unprocessable(err.to_string());
        }
        if err.is_not_found() {
            return Self::not_found(err.to_string());
        }
        if err.is_unavailable() {
            return Self::service_unavailable(err.to_string());
        }
        match err {
            CoreError::Source(_) => {
                tracing::warn!(error = %err, "source tracker request failed");
                Self::bad_gateway(err.to_string())
            }
            other => {
                tracing::error!(error = ?other, "request failed");
                Self::internal(other.to_string())
            }
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::BAD_REQUEST => Self::unprocessable(rejection.body_text()),
            status => Self::new(status, rejection.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::BridgeError;
    use core_library::LibraryError;

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (
                CoreError::from(LibraryError::invalid("username", "bad")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CoreError::Source(BridgeError::UserNotFound("ghost".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::Source(BridgeError::SourceUnavailable("HTTP 503".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CoreError::SyncUnavailable("TMDb sync is disabled".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::InitializationFailed("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }
}
