//! Highlight rules
//!
//! An ordered list of (colour, description) pairs per document. The order is
//! significant: the matcher answers with one word list per rule, in the same
//! order the rules were sent.

mod store;
mod types;

pub use store::RuleStore;
pub use types::{normalize_color, ColorPalette, HighlightRule, RuleError, DEFAULT_PALETTE};
