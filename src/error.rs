//! Error types for the Selective Extraction server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::document::DocumentError;
use crate::session::SessionError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Document(e) => {
                let (status, error_type) = match e {
                    DocumentError::UnsupportedFormat(_) => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_format")
                    }
                    DocumentError::TooLarge { .. } => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large")
                    }
                    DocumentError::ParseError(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "parse_error")
                    }
                    DocumentError::Sanitize(_) | DocumentError::IoError(_) => {
                        tracing::error!("Document error: {}", e);
                        (StatusCode::INTERNAL_SERVER_ERROR, "document_error")
                    }
                };
                (status, error_type, e.to_string())
            }
            AppError::Session(e) => {
                let status = e.status_code();
                let error_type = match e {
                    SessionError::NotFound(_) => "not_found",
                    SessionError::HighlightingUnsupported(_) => "highlighting_unsupported",
                    SessionError::NoHtmlRendering(_) => "no_html_rendering",
                    SessionError::NoRules => "no_rules",
                    SessionError::StaleRules => "stale_rules",
                    SessionError::Rule(_) => "invalid_rule",
                    SessionError::Highlight(_) => "highlight_error",
                    SessionError::Matcher(_) => "matcher_error",
                };
                if status.is_server_error() {
                    tracing::error!("Session error: {}", e);
                }
                (status, error_type, e.to_string())
            }
            AppError::Multipart(e) => {
                tracing::warn!("Multipart error: {}", e);
                (e.status(), "bad_upload", "Failed to read upload".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
