use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::label::LabelError;
use crate::registry::RegistryError;
use crate::services::ServiceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Label rendering failed: {0}")]
    RenderFailed(String),
    #[error("Registry error: {0}")]
    RegistryError(String),
    #[error("Configuration required: {0}")]
    ConfigurationRequired(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::RenderFailed(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Label rendering failed: {msg}"),
            ),
            AppError::RegistryError(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::ConfigurationRequired(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::RegistryError(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => AppError::InvalidInput(msg),
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::Registry(err) => err.into(),
        }
    }
}

impl From<LabelError> for AppError {
    fn from(err: LabelError) -> Self {
        AppError::RenderFailed(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidInput(format!("Malformed form data: {err}"))
    }
}
