use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Training corpus could not be read or parsed
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Persisted artifact is missing, corrupt, or incompatible
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Vectorizer or classifier used before fit
    #[error("Not fitted: {0}")]
    NotFitted(String),

    /// Feature width at predict time differs from fit time
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Fitting failed
    #[error("Training error: {0}")]
    Training(String),

    /// Input text has no token in the fitted vocabulary
    #[error("Unknown text: {0}")]
    UnknownText(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Dataset(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownText(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFitted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DimensionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Training(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Dataset(_) => "DATASET_ERROR",
            AppError::Artifact(_) => "ARTIFACT_ERROR",
            AppError::NotFitted(_) => "NOT_FITTED",
            AppError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            AppError::Training(_) => "TRAINING_ERROR",
            AppError::UnknownText(_) => "UNKNOWN_TEXT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = status.as_u16(),
            message = %message,
            "Request error"
        );

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from bincode::Error
impl From<bincode::Error> for AppError {
    fn from(err: bincode::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
