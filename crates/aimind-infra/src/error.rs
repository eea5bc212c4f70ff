//! HTTP error response bodies
//!
//! Handlers convert an [`AppError`] into an [`ErrorResponse`] and use
//! [`ErrorMetadata::http_status_code`] for the status line. Sensitive errors
//! never expose their internal message.

use aimind_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub recoverable: bool,
}

impl ErrorResponse {
    /// Build the body and log the error at its configured level.
    pub fn from_app_error(err: &AppError) -> Self {
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code = err.error_code(), "Request failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code = err.error_code(), "Request failed"),
            LogLevel::Error => tracing::error!(error = %err, code = err.error_code(), "Request failed"),
        }

        let details = match err {
            AppError::PayloadTooLarge { size, max } => {
                Some(format!("{} bytes exceeds the {} byte limit", size, max))
            }
            _ => None,
        };

        Self {
            error: err.client_message(),
            details,
            error_type: Some(err.error_code().to_string()),
            recoverable: err.is_recoverable(),
        }
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self::from_app_error(err)
    }
}
