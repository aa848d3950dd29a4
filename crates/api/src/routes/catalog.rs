use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use omnilink_common::error::AppError;
use omnilink_engine::catalog::CatalogService;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/services", get(list_services))
}

/// GET /api/services: Service categories, alphabetical.
async fn list_services(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let services = CatalogService::list_services(&state.pool).await?;
    Ok(Json(json!({ "ok": true, "services": services })))
}
