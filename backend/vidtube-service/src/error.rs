/// Error types for vidtube-service
///
/// Every failure a handler can produce is an `AppError`. Errors render as the
/// uniform error envelope: `{statusCode, success, message, errors, stack}`.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

use crate::services::media::MediaError;

/// Result type for vidtube-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing identifier or field
    #[error("{0}")]
    InvalidArgument(String),

    /// Request body failed field validation
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Referenced entity is absent
    #[error("{0}")]
    NotFound(String),

    /// Acting user is not the owner
    #[error("{0}")]
    PermissionDenied(String),

    /// Missing or invalid bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Media gateway did not return a result
    #[error("{0}")]
    UploadFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error envelope sent to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl AppError {
    /// Message safe to show to API clients
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn field_errors(&self) -> Vec<String> {
        match self {
            AppError::Validation(errors) => errors.clone(),
            _ => Vec::new(),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            status_code: self.status_code().as_u16(),
            success: false,
            message: self.public_message(),
            errors: self.field_errors(),
            stack: if cfg!(debug_assertions) {
                Some(format!("{:?}", self))
            } else {
                None
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(self.envelope())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: invalid value ({})", field, err.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages)
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        AppError::UploadFailed(format!("Media upload failed: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
