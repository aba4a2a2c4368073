//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (applied in order)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Sets X-Request-Id if absent, echoes it back
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Cross-origin headers
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Body Limit     │ ← 413 if exceeded
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  Authentication  │ ← 401 if missing/invalid (webhook routes only)
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Route Groups
//!
//! - `/`, `/health` - Status endpoints (no auth)
//! - `/webhook/{opens,clicks,replies,bounces,unsubscribes,sends}` - Event ingestion

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Extension};
use axum::http::HeaderMap;
use axum::routing::{MethodRouter, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::{ApiKeyAuth, AuthorizedKey, request_id_layers};
use crate::models::EventType;
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// # Arguments
///
/// * `state` - Application state containing config and the API key set
///
/// # Returns
///
/// Fully configured Axum router ready to be served.
pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    // =========================================================================
    // Webhook Routes (authenticated)
    // =========================================================================
    let mut webhooks: Router<AppState> = Router::new();
    for event_type in EventType::ALL {
        webhooks = webhooks.route(event_type.path(), webhook_route(event_type));
    }
    // route_layer: auth runs only for matched webhook routes
    let webhooks = webhooks.route_layer(ApiKeyAuth::new(state.api_keys().clone()));
    info!(
        keys = config.api_keys.len(),
        routes = EventType::ALL.len(),
        "API key authentication enabled for webhook routes"
    );

    // =========================================================================
    // Build Router with Routes
    // =========================================================================
    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(webhooks);

    // =========================================================================
    // Apply Middleware Stack (order matters - applied bottom to top)
    // =========================================================================

    // 1. Request body size limit
    info!(
        max_size_kb = config.max_request_body_size / 1024,
        "Request body size limit configured"
    );
    router = router.layer(DefaultBodyLimit::max(config.max_request_body_size));

    // 2. CORS
    router = router.layer(build_cors_layer(&config.cors_allowed_origins));

    // 3. Tracing
    router = router.layer(TraceLayer::new_for_http());

    // 4. Request ID (propagate inside, set outermost)
    let (set_request_id, propagate_request_id) = request_id_layers();
    router = router.layer(propagate_request_id).layer(set_request_id);

    router.with_state(state)
}

/// POST handler for one event type.
///
/// All six routes share [`handlers::receive_event`]; only the captured
/// event type differs.
fn webhook_route(event_type: EventType) -> MethodRouter<AppState> {
    post(
        move |Extension(key): Extension<AuthorizedKey>, headers: HeaderMap, body: Bytes| async move {
            handlers::receive_event(event_type, key, headers, body).await
        },
    )
}

/// Build CORS layer from configuration.
///
/// # Arguments
///
/// * `allowed_origins` - List of allowed origins, or `["*"]` for any origin
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    if allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::keys::KeyStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config {
            api_keys: KeyStore::load("abc123,def456"),
            ..Config::default()
        };
        build_router(AppState::new(config))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn webhook(path: &str, key: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header("X-apikey", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_root_status() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "active");
        assert_eq!(body["message"], "GMass Webhook Server is running");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_health_ignores_api_key_header() {
        let request = Request::builder()
            .uri("/health")
            .header("X-apikey", "wrong")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn test_every_webhook_accepts_valid_key() {
        for event_type in EventType::ALL {
            let request = webhook(event_type.path(), Some("def456"), r#"{"email":"a@b.com"}"#);
            let response = app().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{event_type}");
            assert_eq!(body_json(response).await, json!({"status": "success"}));
        }
    }

    #[tokio::test]
    async fn test_every_webhook_requires_key() {
        for event_type in EventType::ALL {
            let response = app()
                .oneshot(webhook(event_type.path(), None, "{}"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{event_type}");
            assert_eq!(
                body_json(response).await,
                json!({"error": "No API key provided"})
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let response = app()
            .oneshot(webhook("/webhook/clicks", Some("wrong"), "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({"error": "Invalid API key"}));
    }

    #[tokio::test]
    async fn test_auth_checked_before_body() {
        // Bad key and bad body: auth wins
        let response = app()
            .oneshot(webhook("/webhook/replies", Some("wrong"), "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request_on_every_route() {
        for event_type in EventType::ALL {
            let response = app()
                .oneshot(webhook(event_type.path(), Some("abc123"), "not json"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{event_type}");
            let body = body_json(response).await;
            assert_eq!(body["error"], "Malformed request body");
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let response = app()
            .oneshot(webhook("/webhook/sends", Some("abc123"), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_without_content_type_is_accepted() {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook/bounces")
            .header("X-apikey", "abc123")
            .body(Body::from(r#"{"email":"a@b.com"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_webhook_is_not_found() {
        let response = app()
            .oneshot(webhook("/webhook/deliveries", Some("abc123"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_on_webhook_is_method_not_allowed() {
        let request = Request::builder()
            .uri("/webhook/opens")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_request_id_generated_and_propagated() {
        let response = app()
            .oneshot(webhook("/webhook/opens", Some("abc123"), "{}"))
            .await
            .unwrap();
        let id = response.headers().get("x-request-id").unwrap();
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());

        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "caller-chosen-id")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("x-request-id").unwrap(),
            "caller-chosen-id"
        );
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let config = Config {
            api_keys: KeyStore::load("abc123"),
            max_request_body_size: 16,
            ..Config::default()
        };
        let app = build_router(AppState::new(config));
        let body = json!({"email": "someone-with-a-long-address@example.com"}).to_string();

        let response = app
            .oneshot(webhook("/webhook/opens", Some("abc123"), &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_accepted_event_is_logged_with_key_suffix() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = app()
            .oneshot(webhook(
                "/webhook/opens",
                Some("abc123"),
                r#"{"email":"a@b.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let output = logs.contents();
        assert!(output.contains("New OPENS Event"), "{output}");
        assert!(output.contains("API Key: ...c123"), "{output}");
        assert!(output.contains(r#"Data: {"email":"a@b.com"}"#), "{output}");
        assert!(!output.contains("abc123"), "{output}");
    }

    #[tokio::test]
    async fn test_rejected_key_is_logged_as_prefix_only() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = app()
            .oneshot(webhook("/webhook/opens", Some("wrong-secret"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let output = logs.contents();
        assert!(output.contains("Invalid API key attempted"), "{output}");
        assert!(output.contains("wron"), "{output}");
        assert!(!output.contains("wrong-secret"), "{output}");
        assert!(!output.contains("New OPENS Event"), "{output}");
    }

    #[test]
    fn test_build_cors_layer_any() {
        let origins = vec!["*".to_string()];
        let _layer = build_cors_layer(&origins);
    }

    #[test]
    fn test_build_cors_layer_specific() {
        let origins = vec![
            "https://example.com".to_string(),
            "https://app.example.com".to_string(),
        ];
        let _layer = build_cors_layer(&origins);
    }
}
