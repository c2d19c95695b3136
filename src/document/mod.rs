//! Document loading and conversion
//!
//! Uploads are dispatched by file extension:
//!
//! ```text
//!   .pdf          -> native rendering (served back unchanged)
//!   .docx / .doc  -> docx::convert  (zip + word/document.xml -> HTML)
//!   .txt          -> txt::convert   (one <p> per line)
//! ```
//!
//! Every converted document carries both an HTML rendering, which is what
//! highlights are applied to, and a plain-text rendering, which is what the
//! remote matcher reads.

pub mod docx;
mod error;
mod loader;
pub mod txt;
mod types;

pub use error::{DocumentError, Result};
pub use loader::{load_document, load_document_with_limit};
pub use types::{ConvertedDocument, DocumentFormat, LoadedDocument, Rendering};
