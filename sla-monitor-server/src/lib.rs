//! SLA Monitor HTTP API
//!
//! A small read-only axum surface over the Derived-View Readers, plus a
//! health check. This is the concrete surface the (out-of-scope) Status
//! Read API would proxy — handlers here are thin, they deserialize
//! path/query params and call straight into `sla_monitor_reader`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Application state shared across handlers. `Core` itself is driven
/// directly by `main` (its `run`/`shutdown` aren't handler-reachable
/// operations) and so is kept out of this struct.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sla_target: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("reader error: {0}")]
    Reader(#[from] sla_monitor_reader::Error),

    #[error("invalid request: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Reader(sla_monitor_reader::Error::ServiceNotFound) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Reader(_) => (StatusCode::INTERNAL_SERVER_ERROR, "reader_error"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /api/v1/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/v1/status
pub async fn status_handler(
    State(state): State<AppState>,
) -> Result<Json<sla_monitor_core::SystemStatus>, ApiError> {
    let status = sla_monitor_reader::system_status_snapshot(&state.pool).await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

#[derive(Debug, Serialize)]
pub struct UptimeResponse {
    pub service_id: String,
    pub days: i64,
    pub uptime_percentage: f64,
}

/// GET /api/v1/services/{id}/uptime?days=30
pub async fn uptime_handler(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<UptimeResponse>, ApiError> {
    let uptime_percentage =
        sla_monitor_reader::service_uptime_percentage(&state.pool, &service_id, query.days).await?;

    Ok(Json(UptimeResponse {
        service_id,
        days: query.days,
        uptime_percentage,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    #[serde(default = "default_months")]
    pub months: u32,
    pub anchor: Option<NaiveDate>,
}

fn default_months() -> u32 {
    3
}

/// GET /api/v1/services/{id}/monthly?months=3&anchor=2026-07-01
pub async fn monthly_handler(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<Vec<sla_monitor_reader::MonthlyGridEntry>>, ApiError> {
    let grid = sla_monitor_reader::monthly_grid(&state.pool, &service_id, query.months, query.anchor).await?;
    Ok(Json(grid))
}

#[derive(Debug, Deserialize)]
pub struct SlaQuery {
    pub target: Option<f64>,
    #[serde(default = "default_days")]
    pub days: i64,
}

/// GET /api/v1/services/{id}/sla?target=99.9&days=30
pub async fn sla_handler(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    Query(query): Query<SlaQuery>,
) -> Result<Json<sla_monitor_reader::SlaCompliance>, ApiError> {
    let target = query.target.unwrap_or(state.sla_target);
    let compliance = sla_monitor_reader::sla_compliance(&state.pool, &service_id, target, query.days).await?;
    Ok(Json(compliance))
}

/// GET /api/v1/services/{id}/trend?days=30
pub async fn trend_handler(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<sla_monitor_reader::Trend>, ApiError> {
    let trend = sla_monitor_reader::trend(&state.pool, &service_id, query.days).await?;
    Ok(Json(trend))
}

/// Builds the API router with all read endpoints plus health/status.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(status_handler))
        .route("/api/v1/services/{id}/uptime", get(uptime_handler))
        .route("/api/v1/services/{id}/monthly", get(monthly_handler))
        .route("/api/v1/services/{id}/sla", get(sla_handler))
        .route("/api/v1/services/{id}/trend", get(trend_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn health_endpoint_reports_healthy() {
        // The health handler touches no state, so exercising it through the
        // router directly (without a database) is enough to catch routing
        // regressions.
        let router = Router::new().route("/api/v1/health", get(health_handler));

        let response = router
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
