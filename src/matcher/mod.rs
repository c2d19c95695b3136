//! Remote matcher client
//!
//! The word matcher is an external HTTP service. Given the plain text of a
//! document and the rule list, it answers with one list of matched words per
//! rule, in the order the rules were sent.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use selective_extraction_server::matcher::{HttpMatcher, WordMatcher};
//!
//! let matcher = HttpMatcher::new(&config.matcher)?;
//! let matches = matcher.match_rules(&plain_text, &rules).await?;
//! assert_eq!(matches.len(), rules.len());
//! ```

mod client;
mod types;

pub use client::{HttpMatcher, WordMatcher};
pub use types::{HealthMessage, MatchRequest, MatchResponse, MatcherError};

#[cfg(test)]
pub(crate) use client::MockMatcher;
