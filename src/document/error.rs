//! Document error types
//!
//! Errors raised while detecting and converting uploaded documents.

use thiserror::Error;

/// Document loading error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Extension not one of pdf, docx, doc, txt
    #[error("Unsupported file type: {0}. Please upload PDF, DOCX, or TXT.")]
    UnsupportedFormat(String),

    /// Failed to parse the document container or its XML
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Upload exceeds the configured limit
    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    /// Converted HTML could not be sanitized
    #[error("Sanitize error: {0}")]
    Sanitize(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for DocumentError {
    fn from(err: zip::result::ZipError) -> Self {
        DocumentError::ParseError(format!("not a valid DOCX (zip) archive: {}", err))
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(err: quick_xml::Error) -> Self {
        DocumentError::ParseError(format!("malformed word/document.xml: {}", err))
    }
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;
