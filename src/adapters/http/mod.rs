//! HTTP adapters - REST and WebSocket API.
//!
//! `/health` is always open. Everything under `/api` sits behind the access
//! password when one is configured.

pub mod interview;
pub mod middleware;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use secrecy::Secret;

pub use interview::{interview_routes, InterviewHandlers};
pub use middleware::{basic_auth_middleware, AccessPassword};

use interview::HealthResponse;

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Builds the application router.
pub fn app_router(handlers: InterviewHandlers, access_password: Option<Secret<String>>) -> Router {
    let mut api = Router::new().nest("/api/interviews", interview_routes(handlers));

    if let Some(password) = access_password {
        let password: AccessPassword = Arc::new(password);
        api = api.layer(from_fn_with_state(password, basic_auth_middleware));
    }

    Router::new().route("/health", get(health)).merge(api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::archive::InMemoryArchive;
    use crate::adapters::http::interview::handlers::test_support::handlers_with;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use tower::ServiceExt;

    fn handlers() -> InterviewHandlers {
        handlers_with(MockAIProvider::new(), Arc::new(InMemoryArchive::new()))
    }

    fn gated() -> Router {
        app_router(handlers(), Some(Secret::new("hunter2".to_string())))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app_router(handlers(), None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn health_is_open_behind_password() {
        let response = gated()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_requires_password_when_configured() {
        let response = gated()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/interviews")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn api_accepts_configured_password() {
        let response = gated()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/interviews")
                    .header(
                        header::AUTHORIZATION,
                        format!("Basic {}", STANDARD.encode("participant:hunter2")),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn api_is_open_without_password() {
        let response = app_router(handlers(), None)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/interviews")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
