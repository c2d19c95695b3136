//! Document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{DocumentError, Result};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detect the format from a file name's extension (case-insensitive)
    ///
    /// Legacy `.doc` names are routed to the DOCX converter.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_lowercase();
        let extension = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

        match extension {
            "pdf" => Ok(Self::Pdf),
            "docx" | "doc" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(DocumentError::UnsupportedFormat(name.to_string())),
        }
    }

    /// PDFs are rendered natively by the browser and never highlighted
    pub fn supports_highlighting(&self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// MIME type of the original upload
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Txt => "text/plain; charset=utf-8",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Txt => write!(f, "txt"),
        }
    }
}

/// HTML and plain-text renderings produced by a converter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub html: String,
    pub plain_text: String,
}

/// How a loaded document is displayed
#[derive(Debug, Clone)]
pub enum Rendering {
    /// Served back unchanged for the browser's own viewer
    Native,
    /// Converted to HTML, with the plain text sent to the matcher
    Html(ConvertedDocument),
}

/// A document after format detection and conversion
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub format: DocumentFormat,
    pub size_bytes: usize,
    pub loaded_at: DateTime<Utc>,
    /// Original upload bytes
    pub source: Vec<u8>,
    pub rendering: Rendering,
}

impl LoadedDocument {
    /// Pristine HTML rendering, if the format has one
    pub fn original_html(&self) -> Option<&str> {
        match &self.rendering {
            Rendering::Html(converted) => Some(&converted.html),
            Rendering::Native => None,
        }
    }

    pub fn plain_text(&self) -> Option<&str> {
        match &self.rendering {
            Rendering::Html(converted) => Some(&converted.plain_text),
            Rendering::Native => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_file_name("a.pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_file_name("Report.DOCX").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_file_name("old.doc").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_file_name("notes.txt").unwrap(), DocumentFormat::Txt);
    }

    #[test]
    fn test_format_detection_rejects_unknown() {
        assert!(matches!(
            DocumentFormat::from_file_name("image.png"),
            Err(DocumentError::UnsupportedFormat(_))
        ));
        assert!(DocumentFormat::from_file_name("README").is_err());
        assert!(DocumentFormat::from_file_name("archive.pdf.zip").is_err());
    }

    #[test]
    fn test_pdf_not_highlightable() {
        assert!(!DocumentFormat::Pdf.supports_highlighting());
        assert!(DocumentFormat::Docx.supports_highlighting());
        assert!(DocumentFormat::Txt.supports_highlighting());
    }
}
