//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod analyze;
mod rules;

use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    let cors = build_cors_layer(settings);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        .route("/health", get(health_check))
        .route("/api/rules", get(rules::list_rules))
        .route("/api/analyze", post(analyze::analyze))
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    layer
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::meta::ActionKind;
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(AppState::new(AnalysisConfig {
            default_database: "shop".into(),
            ..Default::default()
        }));
        create_router(state, &Settings::default())
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_analyze(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_list_rules_covers_every_kind() {
        let (status, body) = send(Request::get("/api/rules").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);

        let rules = body["rules"].as_array().cloned().unwrap_or_default();
        assert_eq!(body["count"], rules.len());
        for kind in ActionKind::ALL {
            assert!(
                rules.iter().any(|r| r["actionType"] == kind.as_str()),
                "missing {}",
                kind
            );
        }
    }

    #[tokio::test]
    async fn test_analyze_offline() {
        let (status, body) = send(post_analyze(json!({
            "sql": "ALTER TABLE orders ADD COLUMN note TEXT, ENGINE=MyISAM",
            "format": "json"
        })))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["worstRiskLevel"], "CRITICAL");
        assert_eq!(body["report"]["analyses"][0]["table"], "shop.orders");
        assert!(body["rendered"].as_str().is_some_and(|r| r.contains("\"analyses\"")));
    }

    #[tokio::test]
    async fn test_analyze_with_inline_metadata() {
        let (status, body) = send(post_analyze(json!({
            "sql": "ALTER TABLE orders DROP FOREIGN KEY fk_orders_user",
            "metadata": [
                {"schema": "shop", "table": "orders", "engine": "InnoDB", "row_count": 42},
            ]
        })))
        .await;

        assert_eq!(status, StatusCode::OK);
        let prediction = &body["report"]["analyses"][0]["predictions"][0];
        assert_eq!(prediction["table_info"]["row_count"], 42);
        assert!(body.get("rendered").is_none());
    }

    #[tokio::test]
    async fn test_analyze_rejects_unnamed_metadata() {
        let (status, body) = send(post_analyze(json!({
            "sql": "ALTER TABLE orders FORCE",
            "metadata": [
                {"schema": "shop", "table": "orders", "engine": "InnoDB"},
                {"schema": "shop", "engine": "InnoDB"},
            ]
        })))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["message"], "metadata[1] has no table name");
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_requests() {
        let (status, body) = send(post_analyze(json!({"sql": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(post_analyze(json!({"sql": "ALTER TABLE t FORCE", "fkDepth": 50}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(post_analyze(json!({"sql": "SELECT 1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PARSE_ERROR");
        assert_eq!(body["message"], "no ALTER TABLE statements found");
    }
}
