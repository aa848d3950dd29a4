//! Recipient resolver: maps a free-form contractor reference to a contractor.
//!
//! Public forms carry whatever the visitor clicked on: an id, a phone number,
//! or a display name. Resolution runs once, when a lead/review/message is
//! created, and the canonical id is stored on the record.

use sqlx::PgPool;

use omnilink_common::error::AppError;
use omnilink_common::types::{Contractor, DELETED_BADGE};

pub struct ContractorResolver;

impl ContractorResolver {
    /// Find the contractor a reference points at, for notification routing.
    ///
    /// Matches id, phone, name or company; an id match wins over a phone match,
    /// which wins over a name match, then the oldest record wins. Soft-deleted
    /// contractors never match. A miss is `Ok(None)`.
    pub async fn resolve(pool: &PgPool, reference: &str) -> Result<Option<Contractor>, AppError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        let contractor: Option<Contractor> = sqlx::query_as(
            r#"
            SELECT *
            FROM contractors
            WHERE (id = $1 OR phone = $1 OR name = $1 OR company = $1)
              AND badge IS DISTINCT FROM $2
            ORDER BY (id = $1) DESC, (phone = $1) DESC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(reference)
        .bind(DELETED_BADGE)
        .fetch_optional(pool)
        .await?;

        match &contractor {
            Some(c) => tracing::debug!(reference, contractor_id = %c.id, "Contractor resolved"),
            None => tracing::debug!(reference, "No contractor matches reference"),
        }

        Ok(contractor)
    }

    /// Find an account by its canonical id or its phone, including soft-deleted ones.
    ///
    /// Used by account and admin operations where a name match would be ambiguous.
    pub async fn find_account(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<Contractor>, AppError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        let contractor: Option<Contractor> = sqlx::query_as(
            r#"
            SELECT *
            FROM contractors
            WHERE id = $1 OR phone = $1
            ORDER BY (id = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(reference)
        .fetch_optional(pool)
        .await?;

        Ok(contractor)
    }

    /// Like `find_account`, but a miss is a 404.
    pub async fn require_account(pool: &PgPool, reference: &str) -> Result<Contractor, AppError> {
        Self::find_account(pool, reference)
            .await?
            .ok_or_else(|| AppError::NotFound("contractor not found".to_string()))
    }
}
