//! Matcher connectivity monitor
//!
//! Polls the matcher's health endpoint in the background and keeps the last
//! observed status for the health route. Document processing never waits on it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::matcher::WordMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    Connecting,
    Online,
    Offline,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityStatus {
    pub state: ConnectivityState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_at: Option<DateTime<Utc>>,
}

impl Default for ConnectivityStatus {
    fn default() -> Self {
        Self {
            state: ConnectivityState::Connecting,
            message: "Connecting...".to_string(),
            checked_at: None,
        }
    }
}

#[derive(Clone, Default)]
pub struct ConnectivityMonitor {
    status: Arc<RwLock<ConnectivityStatus>>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn status(&self) -> ConnectivityStatus {
        self.status.read().await.clone()
    }

    /// Probe once and record the result
    pub async fn check_once(&self, matcher: &dyn WordMatcher) -> ConnectivityStatus {
        let status = match matcher.check_health().await {
            Ok(health) => ConnectivityStatus {
                state: ConnectivityState::Online,
                message: health.message,
                checked_at: Some(Utc::now()),
            },
            Err(e) => ConnectivityStatus {
                state: ConnectivityState::Offline,
                message: e.to_string(),
                checked_at: Some(Utc::now()),
            },
        };

        let mut current = self.status.write().await;
        if current.state != status.state {
            tracing::info!(state = ?status.state, "Matcher connectivity changed: {}", status.message);
        }
        *current = status.clone();
        status
    }

    /// Poll on a fixed interval until the task is aborted
    pub fn spawn(&self, matcher: Arc<dyn WordMatcher>, interval: Duration) -> JoinHandle<()> {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.check_once(matcher.as_ref()).await;
            }
        })
    }
}
