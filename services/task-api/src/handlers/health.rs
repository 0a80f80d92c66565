//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub database: DatabaseCheck,
    pub pool: PoolStats,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub status: &'static str,
    /// Round trip of the schema probe
    pub latency_ms: u64,
}

/// Connection pool occupancy at probe time
#[derive(Debug, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: usize,
}

/// GET /health - the process is up; touches no dependencies
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "task-api",
    })
}

/// GET /ready - the task schema is reachable through the pool.
///
/// Probes the tasks table rather than a bare SELECT 1, so an
/// unmigrated database reports not-ready, not just an unreachable one.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let start = Instant::now();
    let probe = sqlx::query("SELECT 1 FROM tasks LIMIT 1")
        .fetch_optional(&*state.pool)
        .await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let pool = PoolStats {
        size: state.pool.size(),
        idle: state.pool.num_idle(),
    };

    match probe {
        Ok(_) => (
            StatusCode::OK,
            Json(ReadyResponse {
                status: "ready",
                service: "task-api",
                database: DatabaseCheck {
                    status: "ok",
                    latency_ms,
                },
                pool,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "not_ready",
                    service: "task-api",
                    database: DatabaseCheck {
                        status: "error",
                        latency_ms,
                    },
                    pool,
                }),
            )
        }
    }
}
