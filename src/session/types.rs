//! Viewer session types
//!
//! A session is one uploaded document plus its rule list and the current
//! (possibly highlighted) rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::document::{DocumentFormat, LoadedDocument};
use crate::html::{apply_highlights, HighlightConfig, HighlightOutcome, InjectError, RuleMatches};
use crate::matcher::MatcherError;
use crate::rules::{HighlightRule, RuleError, RuleStore};

/// Shown alongside documents that cannot be highlighted
pub const PDF_NOTICE: &str =
    "Automatic highlighting is currently only supported for .docx and .txt files.";

/// Session error types
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    #[error("Highlighting is not supported for {0} documents")]
    HighlightingUnsupported(DocumentFormat),

    #[error("No HTML rendering available for {0} documents")]
    NoHtmlRendering(DocumentFormat),

    #[error("Add at least one rule before extracting highlights")]
    NoRules,

    #[error("Rules changed while the matcher was running; retry")]
    StaleRules,

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Highlight(#[from] InjectError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

impl SessionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::HighlightingUnsupported(_) | Self::NoHtmlRendering(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::NoRules => StatusCode::BAD_REQUEST,
            Self::StaleRules => StatusCode::CONFLICT,
            Self::Rule(RuleError::IndexOutOfRange { .. }) => StatusCode::NOT_FOUND,
            Self::Rule(_) => StatusCode::BAD_REQUEST,
            Self::Highlight(InjectError::MisalignedMatches { .. }) => StatusCode::BAD_GATEWAY,
            Self::Highlight(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Matcher(e) => e.status_code(),
        }
    }
}

/// Snapshot of what a matcher call needs, taken under the store lock
#[derive(Debug, Clone)]
pub struct MatchJob {
    pub content: String,
    pub rules: Vec<HighlightRule>,
    pub generation: u64,
}

/// One uploaded document and its viewer state
#[derive(Debug, Clone)]
pub struct DocumentSession {
    pub document: LoadedDocument,
    pub rules: RuleStore,
    /// Latest highlight result; `None` means the pristine rendering is shown
    pub highlighted: Option<HighlightOutcome>,
    /// Bumped on every rule list change
    generation: u64,
}

impl DocumentSession {
    pub fn new(document: LoadedDocument) -> Self {
        Self {
            document,
            rules: RuleStore::new(),
            highlighted: None,
            generation: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.document.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Highlighted rendering if there is one, else the pristine rendering
    pub fn current_html(&self) -> Option<&str> {
        match &self.highlighted {
            Some(outcome) => Some(&outcome.html),
            None => self.document.original_html(),
        }
    }

    pub fn add_rule(&mut self, description: &str, color: Option<&str>) -> Result<HighlightRule, RuleError> {
        let rule = self.rules.add(description, color)?.clone();
        self.generation += 1;
        Ok(rule)
    }

    pub fn remove_rule(&mut self, index: usize) -> Result<HighlightRule, RuleError> {
        let rule = self.rules.remove(index)?;
        self.generation += 1;
        Ok(rule)
    }

    pub fn reset(&mut self) {
        self.highlighted = None;
    }

    /// Snapshot the content and rules for a matcher call
    pub fn prepare_match(&self) -> Result<MatchJob, SessionError> {
        if !self.document.format.supports_highlighting() {
            return Err(SessionError::HighlightingUnsupported(self.document.format));
        }
        if self.rules.is_empty() {
            return Err(SessionError::NoRules);
        }

        Ok(MatchJob {
            content: self.document.plain_text().unwrap_or_default().to_string(),
            rules: self.rules.rules().to_vec(),
            generation: self.generation,
        })
    }

    /// Apply matcher output to the pristine rendering
    pub fn apply_matches(
        &mut self,
        job: &MatchJob,
        matches: &RuleMatches,
        config: &HighlightConfig,
    ) -> Result<HighlightOutcome, SessionError> {
        if job.generation != self.generation {
            return Err(SessionError::StaleRules);
        }

        let original = self
            .document
            .original_html()
            .ok_or(SessionError::HighlightingUnsupported(self.document.format))?;

        let outcome = apply_highlights(original, &job.rules, matches, config)?;
        self.highlighted = Some(outcome.clone());
        Ok(outcome)
    }

    pub fn summary(&self) -> SessionSummary {
        let supported = self.document.format.supports_highlighting();
        SessionSummary {
            id: self.document.id,
            file_name: self.document.file_name.clone(),
            format: self.document.format,
            size_bytes: self.document.size_bytes,
            loaded_at: self.document.loaded_at,
            highlighting_supported: supported,
            notice: if supported { None } else { Some(PDF_NOTICE) },
            rules: self.rules.rules().to_vec(),
            selected_color: self.rules.selected_color().to_string(),
            palette: self.rules.palette().colors().to_vec(),
            highlighted: self.highlighted.is_some(),
            last_outcome: self.highlighted.clone(),
        }
    }
}

/// Session state as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub file_name: String,
    pub format: DocumentFormat,
    pub size_bytes: usize,
    pub loaded_at: DateTime<Utc>,
    pub highlighting_supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    pub rules: Vec<HighlightRule>,
    pub selected_color: String,
    pub palette: Vec<String>,
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<HighlightOutcome>,
}

/// What happened to the rendering after a rule was removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Rehighlight {
    /// Remaining rules were re-matched and re-applied
    Applied { applied: usize },
    /// No rules left; pristine rendering restored
    Reset,
    /// Document format is never highlighted
    Skipped,
    /// Rules changed again before the matcher answered
    Superseded,
    /// Matcher failed; pristine rendering restored
    Failed { reason: String },
}

/// A rule as stored, with its position and the colour preselected next
#[derive(Debug, Clone, Serialize)]
pub struct AddedRule {
    pub index: usize,
    pub rule: HighlightRule,
    pub selected_color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveOutcome {
    pub removed: HighlightRule,
    pub rehighlight: Rehighlight,
}
