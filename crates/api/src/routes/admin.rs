//! Admin-only routes, gated by the shared secret in the request body.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use omnilink_common::error::AppError;
use omnilink_common::types::SubscriptionPlan;
use omnilink_engine::contractors::{ContractorService, NewContractorParams};
use omnilink_engine::event_log::LogName;

use crate::middleware::auth::require_admin;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/message", post(message_contractor))
        .route("/api/admin/create-contractor", post(create_contractor))
        .route("/api/apply-badge", post(apply_badge))
        .route("/api/subscription", post(set_subscription))
        .route("/api/set-override", post(set_override))
        .route("/api/admin-secret", get(secret_configured))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageRequest {
    #[serde(alias = "admin_secret", alias = "key")]
    pub admin_secret: Option<String>,
    #[serde(alias = "contractor_id")]
    pub contractor_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractorRequest {
    #[serde(alias = "admin_secret", alias = "key")]
    pub admin_secret: Option<String>,
    #[serde(flatten)]
    pub contractor: NewContractorParams,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRequest {
    #[serde(alias = "admin_secret", alias = "key")]
    pub admin_secret: Option<String>,
    #[serde(alias = "contractor_id")]
    pub contractor_id: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    #[serde(alias = "admin_secret", alias = "key")]
    pub admin_secret: Option<String>,
    #[serde(alias = "contractor_id")]
    pub contractor_id: Option<String>,
    pub plan: Option<String>,
    #[serde(alias = "period_months")]
    pub period_months: Option<u32>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    #[serde(alias = "admin_secret", alias = "key")]
    pub admin_secret: Option<String>,
    #[serde(alias = "override_token")]
    pub override_token: Option<String>,
    #[serde(alias = "override_chat_id")]
    pub override_chat_id: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// POST /api/admin/message: Store a message for a contractor and send it to their chat.
async fn message_contractor(
    State(mut state): State<AppState>,
    AppJson(req): AppJson<AdminMessageRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, req.admin_secret.as_deref())?;

    let message = state
        .intake
        .message_contractor(
            &state.pool,
            &mut state.redis,
            req.contractor_id.as_deref(),
            req.message.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true, "message": message })))
}

/// POST /api/admin/create-contractor: Account with an initial password.
async fn create_contractor(
    State(mut state): State<AppState>,
    AppJson(req): AppJson<CreateContractorRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, req.admin_secret.as_deref())?;

    let contractor = state
        .intake
        .create_contractor(&state.pool, &mut state.redis, &req.contractor)
        .await?;
    Ok(Json(json!({ "ok": true, "contractor": contractor })))
}

/// POST /api/apply-badge: Set or clear a badge. `deleted` hides the contractor.
async fn apply_badge(
    State(mut state): State<AppState>,
    AppJson(req): AppJson<BadgeRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, req.admin_secret.as_deref())?;
    let reference = required(&req.contractor_id, "contractorId")?;

    let contractor =
        ContractorService::apply_badge(&state.pool, reference, req.badge.as_deref()).await?;

    let log = state.event_log().clone();
    log.record(
        &mut state.redis,
        LogName::Badges,
        json!({ "contractor_id": &contractor.id, "badge": &contractor.badge }),
    )
    .await;

    Ok(Json(json!({ "ok": true, "contractor": contractor })))
}

/// POST /api/subscription: Start a plan now for `periodMonths` months.
async fn set_subscription(
    State(mut state): State<AppState>,
    AppJson(req): AppJson<SubscriptionRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, req.admin_secret.as_deref())?;
    let reference = required(&req.contractor_id, "contractorId")?;
    let plan_name = required(&req.plan, "plan")?;

    let period_months = req.period_months.unwrap_or(1);
    if period_months == 0 {
        return Err(AppError::Validation(
            "periodMonths must be at least 1".to_string(),
        ));
    }
    let price = req.price.unwrap_or(0.0);
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "price must be a non-negative number".to_string(),
        ));
    }

    let plan = SubscriptionPlan::starting_at(plan_name.to_string(), period_months, price, Utc::now());
    let contractor = ContractorService::set_subscription(&state.pool, reference, &plan).await?;

    let log = state.event_log().clone();
    log.record(
        &mut state.redis,
        LogName::Subscriptions,
        json!({ "contractor_id": &contractor.id, "subscription": &plan }),
    )
    .await;

    Ok(Json(json!({ "ok": true, "contractor": contractor })))
}

/// POST /api/set-override: Record the request; the override destination
/// only changes through `ADMIN_OVERRIDE_*` and a restart.
async fn set_override(
    State(mut state): State<AppState>,
    AppJson(req): AppJson<OverrideRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&state.config, req.admin_secret.as_deref())?;

    let token_supplied = req.override_token.as_deref().is_some_and(|t| !t.trim().is_empty());
    let chat_supplied = req.override_chat_id.as_deref().is_some_and(|c| !c.trim().is_empty());

    let log = state.event_log().clone();
    log.record(
        &mut state.redis,
        LogName::OverrideChanges,
        json!({
            "override_token_supplied": token_supplied,
            "override_chat_id_supplied": chat_supplied,
        }),
    )
    .await;

    tracing::warn!(
        token_supplied,
        chat_supplied,
        "Override change requested; runtime configuration left unchanged"
    );

    Ok(Json(json!({
        "ok": true,
        "warning": "Override recorded. Set ADMIN_OVERRIDE_TOKEN and ADMIN_OVERRIDE_CHAT_ID and restart to apply it.",
    })))
}

/// GET /api/admin-secret: Whether admin operations are enabled. Never returns the secret.
async fn secret_configured(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "ok": true, "secret": state.config.admin_enabled() }))
}
