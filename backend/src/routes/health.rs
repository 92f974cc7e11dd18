//! Liveness and readiness probes
//!
//! /health and /health/live answer as long as the process runs;
//! /health/ready also pings the database and returns 503 when it is
//! unreachable, so load balancers stop routing traffic here.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl ProbeResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: None,
        }
    }
}

/// GET /health
pub async fn health_check() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("healthy"))
}

/// GET /health/live
pub async fn liveness_check() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("alive"))
}

/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ProbeResponse>, (StatusCode, Json<ProbeResponse>)> {
    match db::health_check(state.db()).await {
        Ok(()) => {
            let mut response = ProbeResponse::new("ready");
            response.database = Some("healthy".to_string());
            Ok(Json(response))
        }
        Err(e) => {
            let mut response = ProbeResponse::new("not_ready");
            response.database = Some(e.to_string());
            Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_reports_healthy() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_check_reports_alive() {
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
        assert!(response.database.is_none());
    }
}
