//! Liveness endpoint with a database round trip.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health: 200 when PostgreSQL answers, 503 otherwise.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let status = if database_ok {
        StatusCode::OK
    } else {
        tracing::warn!("Health check: database unreachable");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database_ok { "ok" } else { "degraded" },
            "database": database_ok,
            "service": "omnilink-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
