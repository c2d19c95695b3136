//! Route modules for the Selective Extraction server

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod documents;
pub mod extract;
pub mod health;
pub mod rules;

/// Multipart framing on top of the file itself
const UPLOAD_OVERHEAD: usize = 64 * 1024;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config().documents.max_upload_bytes + UPLOAD_OVERHEAD;

    let documents = documents::router()
        .merge(rules::router())
        .merge(extract::router());

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/health", health::router())
        .nest("/api/documents", documents)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::matcher::MockMatcher;

    fn test_app() -> Router {
        let state = AppState::with_matcher(
            Config::default(),
            Arc::new(MockMatcher::with_replies(vec![])),
        );
        app(state)
    }

    #[tokio::test]
    async fn test_health_routes() {
        for uri in ["/health", "/api/health"] {
            let response = test_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/documents")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_invalid_document_id() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/documents/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
