//! Error types for the priority service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Error type for offline data handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data at {location}: {reason}")]
    InvalidData { location: String, reason: String },
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Classifier artifact and inference errors.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model artifact not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Errors surfaced to HTTP callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or a message in the batch is malformed.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Model(#[from] ModelError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Model(ModelError::NotFound { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let err = ApiError::BadRequest("duplicate message id: m1".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "duplicate message id: m1");
    }

    #[test]
    fn missing_artifact_maps_to_503() {
        let err = ApiError::from(ModelError::NotFound {
            path: "training/model.json".into(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invalid_artifact_maps_to_500() {
        let err = ApiError::from(ModelError::InvalidArtifact("empty classes".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("empty classes"));
    }

    #[test]
    fn invalid_data_names_location() {
        let err = Error::InvalidData {
            location: "labeled.jsonl:3".into(),
            reason: "missing field `text`".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid data at labeled.jsonl:3: missing field `text`"
        );
    }
}
