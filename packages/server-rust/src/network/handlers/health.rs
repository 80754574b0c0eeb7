//! Root, health, liveness, and readiness endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::network::HealthState;

/// Version reported by the informational endpoints.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of `GET /` and `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    fn healthy(message: String) -> Self {
        Self {
            message,
            status: "healthy",
            version: API_VERSION,
            timestamp: Utc::now(),
        }
    }
}

/// `GET /` -- basic service information.
pub async fn root_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(format!(
        "{} is running!",
        state.config.app_name
    )))
}

/// `GET /health` -- constant success payload for liveness monitoring.
///
/// Reads no application state, so it succeeds whenever the process can
/// answer HTTP at all.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("Service is healthy".to_string()))
}

/// `GET /health/live` -- Kubernetes liveness probe, always 200 OK.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// `GET /health/ready` -- 200 while serving, 503 while starting or draining.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state() == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::AppConfig;
    use crate::storage::Repository;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState::new(Repository::in_memory())
    }

    #[tokio::test]
    async fn health_handler_returns_constant_payload() {
        let response = health_handler().await.0;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.message, "Service is healthy");
        assert_eq!(response.version, API_VERSION);
    }

    #[tokio::test]
    async fn root_handler_uses_app_name() {
        let mut state = test_state();
        state.config = Arc::new(AppConfig {
            app_name: "Shelter API".to_string(),
            ..AppConfig::default()
        });
        let response = root_handler(State(state)).await.0;
        assert_eq!(response.message, "Shelter API is running!");
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn liveness_handler_always_returns_200() {
        assert_eq!(liveness_handler().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_handler_returns_200_when_ready() {
        let state = test_state();
        state.shutdown.set_ready();
        assert_eq!(readiness_handler(State(state)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_handler_returns_503_when_starting() {
        let state = test_state();
        assert_eq!(
            readiness_handler(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn readiness_handler_returns_503_when_draining() {
        let state = test_state();
        state.shutdown.set_ready();
        state.shutdown.trigger_shutdown();
        assert_eq!(
            readiness_handler(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
