//! Matcher wire types

use serde::{Deserialize, Serialize};

use crate::rules::HighlightRule;

/// Body posted to the matcher's highlight endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Plain-text rendering of the document
    pub content: String,
    /// Rules, in display order
    pub highlights: Vec<HighlightRule>,
}

/// Matcher reply; `content[i]` holds the words for `highlights[i]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub content: Vec<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Health endpoint reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMessage {
    #[serde(default)]
    pub message: String,
}

/// Matcher error types
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Matcher unavailable: {0}")]
    Unavailable(String),

    #[error("Matcher returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid matcher response: {0}")]
    InvalidResponse(String),

    #[error("Matcher returned {received} word lists for {expected} rules")]
    MisalignedResponse { expected: usize, received: usize },
}

impl MatcherError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for MatcherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MatcherError::InvalidResponse(err.to_string())
        } else {
            MatcherError::Unavailable(err.to_string())
        }
    }
}
