//! HTML processing
//!
//! Highlight span injection and sanitizing of converted documents.

mod highlight_injector;

pub use highlight_injector::{
    apply_highlights, sanitize_html, HighlightConfig, HighlightOutcome, InjectError, RuleMatches,
};
