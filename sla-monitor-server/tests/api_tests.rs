//! Router-wiring tests for the endpoints that don't require a live
//! database. The uptime/monthly/sla/trend handlers all go straight
//! through `sla-monitor-reader` against a real Postgres pool, so their
//! behavior is covered by that crate's own tests; what's exercised here
//! is that the router is wired correctly and that error responses take
//! the shape API consumers expect.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use sla_monitor_server::{health_handler, ApiError, ErrorResponse};
use tower::ServiceExt;

async fn make_request<T: serde::de::DeserializeOwned>(
    app: Router,
    request: Request<Body>,
) -> (StatusCode, T) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: T = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn health_endpoint_returns_version_and_status() {
    let app = Router::new().route("/api/v1/health", get(health_handler));

    let request = Request::builder()
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let (status, body): (_, serde_json::Value) = make_request(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn bad_request_error_serializes_with_bad_request_type_and_status() {
    async fn handler() -> ApiError {
        ApiError::BadRequest("days must be positive".to_string())
    }
    let app = Router::new().route("/boom", get(handler));

    let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
    let (status, body): (_, ErrorResponse) = make_request(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.error, "bad_request");
    assert!(body.message.contains("days must be positive"));
}

#[tokio::test]
async fn service_not_found_maps_to_404() {
    async fn handler() -> ApiError {
        ApiError::Reader(sla_monitor_reader::Error::ServiceNotFound)
    }
    let app = Router::new().route("/boom", get(handler));

    let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
    let (status, body): (_, ErrorResponse) = make_request(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.error, "not_found");
}
