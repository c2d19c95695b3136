//! Selective Extraction Server Library
//!
//! Document viewer backend: uploads PDF, DOCX and TXT files, keeps a list of
//! colour-coded highlight rules per document, asks a remote matcher which
//! words each rule selects, and serves the highlighted HTML.
//!
//! # Modules
//!
//! - `document`: Upload format detection and HTML/plain-text conversion
//! - `rules`: Highlight rules and the colour palette
//! - `html`: Highlight injection and sanitizing
//! - `matcher`: Remote word matcher client
//! - `session`: Per-document state (rules, renderings)
//! - `routes`: HTTP API

pub mod config;
pub mod connectivity;
pub mod document;
pub mod error;
pub mod html;
pub mod matcher;
pub mod routes;
pub mod rules;
pub mod session;
pub mod state;

pub use config::Config;
pub use routes::app;
pub use state::AppState;
