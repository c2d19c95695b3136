//! Document loading
//!
//! Detects the format of an upload and runs the matching conversion path.

use chrono::Utc;
use uuid::Uuid;

use super::error::{DocumentError, Result};
use super::types::{DocumentFormat, LoadedDocument, Rendering};
use super::{docx, txt};
use crate::html::sanitize_html;

/// Load an uploaded document, producing its HTML and plain-text renderings
///
/// PDFs are kept as-is for native display; DOCX and TXT are converted and the
/// resulting HTML is sanitized before it becomes the pristine rendering.
pub fn load_document(file_name: &str, bytes: Vec<u8>) -> Result<LoadedDocument> {
    load_document_with_limit(file_name, bytes, docx::DEFAULT_MAX_EXPANDED_BYTES)
}

/// Like [`load_document`], with an explicit cap on decompressed DOCX content
pub fn load_document_with_limit(
    file_name: &str,
    bytes: Vec<u8>,
    max_expanded: usize,
) -> Result<LoadedDocument> {
    let format = DocumentFormat::from_file_name(file_name)?;

    let rendering = match format {
        DocumentFormat::Pdf => Rendering::Native,
        DocumentFormat::Docx | DocumentFormat::Txt => {
            let mut converted = if format == DocumentFormat::Docx {
                docx::convert_with_limit(&bytes, max_expanded)?
            } else {
                txt::convert(&bytes)
            };
            converted.html = sanitize_html(&converted.html)
                .map_err(|e| DocumentError::Sanitize(e.to_string()))?;
            Rendering::Html(converted)
        }
    };

    tracing::debug!(
        file_name = %file_name,
        format = %format,
        size = bytes.len(),
        "Document converted"
    );

    Ok(LoadedDocument {
        id: Uuid::new_v4(),
        file_name: file_name.to_string(),
        format,
        size_bytes: bytes.len(),
        loaded_at: Utc::now(),
        source: bytes,
        rendering,
    })
}
