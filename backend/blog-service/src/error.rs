/// Error types for Blog Service
///
/// This module defines all error types that can occur in the blog-service.
/// Errors are converted to appropriate HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::store::StoreError;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Message surfaced for every connection or timeout failure against the store.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Which side of the comment protocol failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Add,
    Delete,
}

impl CommentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentAction::Add => "add",
            CommentAction::Delete => "delete",
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Form constraint violation, never reaches the store
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Connection or timeout failure against the record store
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network(String),

    /// Record store answered with a non-success status
    #[error("Request failed: {0}")]
    Upstream(String),

    /// Unauthorized access (missing session, bad credentials)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden access (not the owner of the record)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict (duplicate email, etc.)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A comment read-modify-write aborted
    #[error("Failed to {} comment: {source}", .action.as_str())]
    CommentMutation {
        action: CommentAction,
        #[source]
        source: Box<AppError>,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn comment_failed(action: CommentAction, source: AppError) -> Self {
        AppError::CommentMutation {
            action,
            source: Box::new(source),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::CommentMutation { source, .. } => source.status_code(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Transport(msg) => AppError::Network(msg),
            StoreError::Status { status, message } => {
                AppError::Upstream(format!("{} ({})", message, status))
            }
            StoreError::Decode(msg) => AppError::Internal(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
