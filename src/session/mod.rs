//! Document viewer sessions
//!
//! Each uploaded document gets a session holding its pristine rendering,
//! its rule list and the current highlighted rendering.

mod store;
mod types;

pub use store::{SessionStore, SourceFile};
pub use types::{
    AddedRule, DocumentSession, MatchJob, Rehighlight, RemoveOutcome, SessionError, SessionSummary,
    PDF_NOTICE,
};
