//! Read access to the bounded event logs.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use omnilink_common::error::AppError;
use omnilink_engine::event_log::LogName;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/logs/{name}", get(read_log))
}

/// GET /api/logs/:name: Entries newest first. Unknown names are 404.
async fn read_log(
    State(mut state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Path(name) = name?;
    let name: LogName = name.parse()?;
    let log = state.event_log().clone();
    let entries = log.read(&mut state.redis, name).await?;
    Ok(Json(entries))
}
