//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Unavailable,
}

/// Service health response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: ComponentHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// Round trip of the ping, absent when it failed
    pub latency_ms: Option<u64>,
}

async fn ping(db: &DatabaseConnection) -> ComponentHealth {
    let started = Instant::now();
    match db.ping().await {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Ok,
            latency_ms: Some(started.elapsed().as_millis() as u64),
        },
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            ComponentHealth {
                status: HealthStatus::Unavailable,
                latency_ms: None,
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ping(&state.db).await;
    let status = database.status;
    let code = match status {
        HealthStatus::Ok => StatusCode::OK,
        HealthStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnected_database_is_unavailable() {
        let state = HealthState {
            db: DatabaseConnection::Disconnected,
            started_at: Arc::new(Instant::now()),
        };

        let (code, Json(body)) = health_check(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, HealthStatus::Unavailable);
        assert_eq!(body.database.latency_ms, None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(HealthStatus::Ok).unwrap(), "ok");
        assert_eq!(
            serde_json::to_value(HealthStatus::Unavailable).unwrap(),
            "unavailable"
        );
    }
}
