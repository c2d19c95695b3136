//! Matcher client
//!
//! Defines the matcher trait and the HTTP implementation used in production.

use async_trait::async_trait;

use super::types::{HealthMessage, MatchRequest, MatchResponse, MatcherError};
use crate::config::MatcherConfig;
use crate::html::RuleMatches;
use crate::rules::HighlightRule;

/// Word matcher trait
#[async_trait]
pub trait WordMatcher: Send + Sync {
    /// Return one list of matched words per rule, aligned with `rules`
    async fn match_rules(
        &self,
        content: &str,
        rules: &[HighlightRule],
    ) -> Result<RuleMatches, MatcherError>;

    /// Probe the matcher's health endpoint
    async fn check_health(&self) -> Result<HealthMessage, MatcherError>;
}

/// Matcher reached over HTTP
#[derive(Clone)]
pub struct HttpMatcher {
    client: reqwest::Client,
    highlight_url: String,
    health_url: String,
}

impl HttpMatcher {
    pub fn new(config: &MatcherConfig) -> Result<Self, MatcherError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MatcherError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            highlight_url: config.highlight_url(),
            health_url: config.health_url(),
        })
    }

    pub fn highlight_url(&self) -> &str {
        &self.highlight_url
    }
}

#[async_trait]
impl WordMatcher for HttpMatcher {
    async fn match_rules(
        &self,
        content: &str,
        rules: &[HighlightRule],
    ) -> Result<RuleMatches, MatcherError> {
        if rules.is_empty() {
            return Ok(Vec::new());
        }

        let request = MatchRequest {
            content: content.to_string(),
            highlights: rules.to_vec(),
        };

        tracing::debug!(
            url = %self.highlight_url,
            rules = rules.len(),
            content_len = content.len(),
            "Requesting matches"
        );

        let response = self
            .client
            .post(&self.highlight_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MatcherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MatchResponse = serde_json::from_str(&body)
            .map_err(|e| MatcherError::InvalidResponse(e.to_string()))?;

        if parsed.content.len() != rules.len() {
            return Err(MatcherError::MisalignedResponse {
                expected: rules.len(),
                received: parsed.content.len(),
            });
        }

        if let Some(message) = &parsed.message {
            tracing::debug!(message = %message, "Matcher replied");
        }

        Ok(parsed.content)
    }

    async fn check_health(&self) -> Result<HealthMessage, MatcherError> {
        let response = self.client.get(&self.health_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatcherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| MatcherError::InvalidResponse(e.to_string()))
    }
}

/// Mock matcher for testing
#[cfg(test)]
pub(crate) struct MockMatcher {
    pub matches: std::sync::Mutex<Vec<RuleMatches>>,
    pub requests: std::sync::Mutex<Vec<Vec<HighlightRule>>>,
    pub available: bool,
}

#[cfg(test)]
impl MockMatcher {
    /// Replies are handed out in order, one per call
    pub fn with_replies(replies: Vec<RuleMatches>) -> Self {
        Self {
            matches: std::sync::Mutex::new(replies),
            requests: std::sync::Mutex::new(Vec::new()),
            available: true,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl WordMatcher for MockMatcher {
    async fn match_rules(
        &self,
        _content: &str,
        rules: &[HighlightRule],
    ) -> Result<RuleMatches, MatcherError> {
        self.requests.lock().unwrap().push(rules.to_vec());
        let mut replies = self.matches.lock().unwrap();
        if replies.is_empty() {
            return Err(MatcherError::Unavailable("no reply queued".to_string()));
        }
        Ok(replies.remove(0))
    }

    async fn check_health(&self) -> Result<HealthMessage, MatcherError> {
        if self.available {
            Ok(HealthMessage {
                message: "Hello from mock matcher".to_string(),
            })
        } else {
            Err(MatcherError::Unavailable("offline".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve `router` on an ephemeral port and return a matcher pointed at it
    async fn spawn_matcher(router: Router) -> HttpMatcher {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = MatcherConfig {
            base_url: format!("http://{}", addr),
            highlight_path: "/api/highlight".to_string(),
            health_path: "/api/hello".to_string(),
            timeout_secs: 5,
            health_interval_secs: 10,
        };
        HttpMatcher::new(&config).unwrap()
    }

    fn rules() -> Vec<HighlightRule> {
        vec![
            HighlightRule::new("#4285F4", "Dates"),
            HighlightRule::new("#34A853", "Names"),
        ]
    }

    #[tokio::test]
    async fn test_match_rules_round_trip() {
        let router = Router::new().route(
            "/api/highlight",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["highlights"][0]["description"], "Dates");
                assert_eq!(body["content"], "Sam was born on 11-05-2005");
                Json(json!({
                    "content": [["11-05-2005"], ["Sam"]],
                    "message": "Highlights parsed successfully"
                }))
            }),
        );
        let matcher = spawn_matcher(router).await;

        let matches = matcher
            .match_rules("Sam was born on 11-05-2005", &rules())
            .await
            .unwrap();

        assert_eq!(matches, vec![vec!["11-05-2005".to_string()], vec!["Sam".to_string()]]);
    }

    #[tokio::test]
    async fn test_misaligned_response() {
        let router = Router::new().route(
            "/api/highlight",
            post(|| async { Json(json!({ "content": [["only one"]] })) }),
        );
        let matcher = spawn_matcher(router).await;

        let err = matcher.match_rules("text", &rules()).await.unwrap_err();
        assert!(matches!(
            err,
            MatcherError::MisalignedResponse { expected: 2, received: 1 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_response_shape() {
        let router = Router::new().route(
            "/api/highlight",
            post(|| async { Json(json!({ "content": "not a list" })) }),
        );
        let matcher = spawn_matcher(router).await;

        let err = matcher.match_rules("text", &rules()).await.unwrap_err();
        assert!(matches!(err, MatcherError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_error_status() {
        let router = Router::new().route(
            "/api/highlight",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let matcher = spawn_matcher(router).await;

        let err = matcher.match_rules("text", &rules()).await.unwrap_err();
        match err {
            MatcherError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_rules_skips_request() {
        // Nothing is listening on this router's highlight path
        let matcher = spawn_matcher(Router::new()).await;
        let matches = matcher.match_rules("text", &[]).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let router = Router::new().route(
            "/api/hello",
            get(|| async { Json(json!({ "message": "Hello from Flask backend!" })) }),
        );
        let matcher = spawn_matcher(router).await;

        let health = matcher.check_health().await.unwrap();
        assert_eq!(health.message, "Hello from Flask backend!");
    }

    #[tokio::test]
    async fn test_unreachable_matcher() {
        let config = MatcherConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            highlight_path: "/api/highlight".to_string(),
            health_path: "/api/hello".to_string(),
            timeout_secs: 2,
            health_interval_secs: 10,
        };
        let matcher = HttpMatcher::new(&config).unwrap();

        let err = matcher.check_health().await.unwrap_err();
        assert!(matches!(err, MatcherError::Unavailable(_)));
    }
}
