//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::connectivity::ConnectivityMonitor;
use crate::matcher::{HttpMatcher, MatcherError, WordMatcher};
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    sessions: SessionStore,
    matcher: Arc<dyn WordMatcher>,
    connectivity: ConnectivityMonitor,
}

impl AppState {
    /// Create state backed by the HTTP matcher from the configuration
    pub fn new(config: Config) -> Result<Self, MatcherError> {
        let matcher = HttpMatcher::new(&config.matcher)?;
        tracing::info!("Matcher endpoint: {}", matcher.highlight_url());
        Ok(Self::with_matcher(config, Arc::new(matcher)))
    }

    /// Create state with an explicit matcher implementation
    pub fn with_matcher(config: Config, matcher: Arc<dyn WordMatcher>) -> Self {
        let sessions = SessionStore::new(config.documents.max_documents);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                matcher,
                connectivity: ConnectivityMonitor::new(),
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document session store
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get the matcher
    pub fn matcher(&self) -> &dyn WordMatcher {
        self.inner.matcher.as_ref()
    }

    pub fn matcher_handle(&self) -> Arc<dyn WordMatcher> {
        Arc::clone(&self.inner.matcher)
    }

    /// Get the matcher connectivity monitor
    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.inner.connectivity
    }
}
