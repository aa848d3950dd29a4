//! Contractor → admin messages.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use omnilink_common::error::AppError;

use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/message", post(message_admin))
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(rename = "contractorId", alias = "contractor_id")]
    pub contractor_id: Option<String>,
    pub message: Option<String>,
}

/// POST /api/message: Store a contractor's message and alert the admin.
async fn message_admin(
    State(mut state): State<AppState>,
    AppJson(req): AppJson<MessageRequest>,
) -> Result<Json<Value>, AppError> {
    let message = state
        .intake
        .message_admin(
            &state.pool,
            &mut state.redis,
            req.contractor_id.as_deref(),
            req.message.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true, "message": message })))
}
