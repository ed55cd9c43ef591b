//! Error types and HTTP error codes

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use filegate_store::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Gateway error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    Conflict,
    NotFound,
    PayloadTooLarge,
    InternalError,
}

impl ErrorCode {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::Conflict => "Conflict",
            Self::NotFound => "NotFound",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::InternalError => "InternalError",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Gateway error type
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("File with the same name already exists: {0}")]
    Conflict(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File exceeds the upload limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Upload staging failed: {0}")]
    Staging(#[from] std::io::Error),
}

impl GatewayError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Get the error code
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            Self::Storage(_) | Self::Staging(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            Self::Conflict(_) => "File with the same name already exists!".to_string(),
            Self::NotFound(_) => "File not found".to_string(),
            Self::PayloadTooLarge { .. } => self.to_string(),
            Self::Storage(_) | Self::Staging(_) => "Internal Server Error".to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let code = self.error_code();

        if code == ErrorCode::InternalError {
            match &self {
                Self::Storage(e) => tracing::error!(
                    error = %e,
                    cause = ?std::error::Error::source(e),
                    operation = ?e.operation(),
                    key = ?e.key(),
                    "Storage request failed"
                ),
                other => tracing::error!(error = %other, "Request failed"),
            }
        }

        let body = ErrorBody {
            code: code.as_str(),
            message: self.public_message(),
        };

        (code.status_code(), Json(body)).into_response()
    }
}
