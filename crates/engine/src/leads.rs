//! Lead service: validation, persistence and per-contractor listing.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use omnilink_common::error::AppError;
use omnilink_common::types::{Contractor, Lead};

use crate::clean;
use crate::resolver::ContractorResolver;

const DEFAULT_SOURCE: &str = "website";
const LIST_LIMIT: i64 = 500;

/// Body of `POST /api/lead`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLeadParams {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
    #[serde(alias = "contractorId")]
    pub contractor_id: Option<String>,
    pub source: Option<String>,
}

/// A lead that passed validation, with blanks normalised away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidLead {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub service: String,
    pub message: Option<String>,
    pub contractor_ref: Option<String>,
    pub source: String,
}

impl CreateLeadParams {
    /// Name, phone and service are required; everything else is optional.
    pub fn validate(&self) -> Result<ValidLead, AppError> {
        let required = |value: &Option<String>, field: &str| {
            clean(value.as_deref())
                .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
        };

        Ok(ValidLead {
            name: required(&self.name, "name")?,
            phone: required(&self.phone, "phone")?,
            service: required(&self.service, "service")?,
            email: clean(self.email.as_deref()),
            message: clean(self.message.as_deref()),
            contractor_ref: clean(self.contractor_id.as_deref()),
            source: clean(self.source.as_deref()).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        })
    }
}

/// Service layer for leads.
pub struct LeadService;

impl LeadService {
    /// Validate, resolve the contractor reference and insert the lead.
    ///
    /// An unknown contractor reference is kept verbatim in `contractor_ref` and
    /// leaves `contractor_id` empty; the lead is still stored.
    pub async fn create(
        pool: &PgPool,
        params: &CreateLeadParams,
    ) -> Result<(Lead, Option<Contractor>), AppError> {
        let valid = params.validate()?;

        let contractor = match &valid.contractor_ref {
            Some(reference) => ContractorResolver::resolve(pool, reference).await?,
            None => None,
        };

        let lead: Lead = sqlx::query_as(
            r#"
            INSERT INTO leads (id, name, phone, email, service, message, contractor_ref, contractor_id, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&valid.name)
        .bind(&valid.phone)
        .bind(&valid.email)
        .bind(&valid.service)
        .bind(&valid.message)
        .bind(&valid.contractor_ref)
        .bind(contractor.as_ref().map(|c| c.id.as_str()))
        .bind(&valid.source)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            lead_id = %lead.id,
            service = %lead.service,
            contractor_id = lead.contractor_id.as_deref().unwrap_or("-"),
            "Lead stored"
        );

        Ok((lead, contractor))
    }

    /// Leads routed to one contractor, newest first.
    pub async fn list_for_contractor(
        pool: &PgPool,
        contractor_id: &str,
    ) -> Result<Vec<Lead>, AppError> {
        let leads: Vec<Lead> = sqlx::query_as(
            "SELECT * FROM leads WHERE contractor_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(contractor_id)
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(leads)
    }
}
