//! Lead intake and the contractor's own lead list.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use omnilink_common::error::AppError;
use omnilink_engine::leads::{CreateLeadParams, LeadService};

use crate::middleware::auth::AuthContractor;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/lead", post(create_lead))
        .route("/api/leads", get(list_own_leads))
}

/// POST /api/lead: Store a lead and notify admin (and the contractor, if matched).
///
/// Public. Notification failures never change the response.
async fn create_lead(
    State(mut state): State<AppState>,
    AppJson(params): AppJson<CreateLeadParams>,
) -> Result<Json<Value>, AppError> {
    let lead = state
        .intake
        .submit_lead(&state.pool, &mut state.redis, &params)
        .await?;
    Ok(Json(json!({ "ok": true, "lead": lead })))
}

/// GET /api/leads: Leads routed to the signed-in contractor.
async fn list_own_leads(
    State(state): State<AppState>,
    auth: AuthContractor,
) -> Result<Json<Value>, AppError> {
    let leads = LeadService::list_for_contractor(&state.pool, &auth.contractor_id).await?;
    Ok(Json(json!({ "ok": true, "leads": leads })))
}
