//! Contractor signup, login and dashboard routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use omnilink_common::error::AppError;
use omnilink_engine::contractors::{ContractorService, UpsertContractorParams};
use omnilink_engine::messages::MessageService;

use crate::middleware::auth::{AuthContractor, MaybeContractor, encode_jwt};
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contractor", post(upsert_contractor))
        .route("/api/contractor/login", post(login))
        .route("/api/contractor/me", get(me))
        .route("/api/contractor/messages", get(inbox))
        .route("/api/contractors", get(list_contractors))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/contractor: Signup or profile save, keyed by id then phone.
///
/// Updating a password-protected profile needs that contractor's bearer token.
async fn upsert_contractor(
    State(mut state): State<AppState>,
    MaybeContractor(auth): MaybeContractor,
    AppJson(params): AppJson<UpsertContractorParams>,
) -> Result<Json<Value>, AppError> {
    let actor = auth.as_ref().map(|a| a.contractor_id.as_str());
    let contractor = state
        .intake
        .upsert_contractor(&state.pool, &mut state.redis, &params, actor)
        .await?;
    Ok(Json(json!({ "ok": true, "contractor": contractor })))
}

/// POST /api/contractor/login: Phone + password, returns the profile and a session token.
async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let contractor = ContractorService::login(&state.pool, &req.phone, &req.password).await?;
    let token = encode_jwt(
        &contractor.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;
    Ok(Json(json!({ "ok": true, "contractor": contractor, "token": token })))
}

/// GET /api/contractor/me
async fn me(State(state): State<AppState>, auth: AuthContractor) -> Result<Json<Value>, AppError> {
    let contractor = ContractorService::get(&state.pool, &auth.contractor_id).await?;
    Ok(Json(json!({ "ok": true, "contractor": contractor })))
}

/// GET /api/contractor/messages: Both directions, newest first.
async fn inbox(State(state): State<AppState>, auth: AuthContractor) -> Result<Json<Value>, AppError> {
    let messages = MessageService::inbox(&state.pool, &auth.contractor_id).await?;
    Ok(Json(json!({ "ok": true, "messages": messages })))
}

/// GET /api/contractors: Public directory, newest first.
async fn list_contractors(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let contractors = ContractorService::list(&state.pool).await?;
    Ok(Json(json!({ "ok": true, "contractors": contractors })))
}
