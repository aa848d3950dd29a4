//! Contractor account service: upsert, login, listing and admin mutations.

use serde::Deserialize;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use omnilink_common::error::AppError;
use omnilink_common::types::{Contractor, DELETED_BADGE, SubscriptionPlan};

use crate::clean;
use crate::resolver::ContractorResolver;

/// bcrypt work factor for contractor passwords.
const BCRYPT_COST: u32 = 10;

/// Public listing cap.
const LIST_LIMIT: i64 = 1000;

/// Same message for unknown phone and wrong password.
const LOGIN_FAILED: &str = "Invalid phone or password";

/// Parameters for a contractor signup or profile save.
///
/// Every field is optional; only provided, non-blank fields are written.
/// Older dashboards send camelCase keys, so both spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertContractorParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "telegramToken")]
    pub telegram_token: Option<String>,
    #[serde(alias = "telegramChatId", alias = "telegram")]
    pub telegram_chat_id: Option<String>,
    #[serde(alias = "logoUrl")]
    pub logo_url: Option<String>,
    #[serde(alias = "themeColor")]
    pub theme_color: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

/// Result of an upsert: the stored record and whether it was newly created.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub contractor: Contractor,
    pub created: bool,
}

/// Parameters for the admin "create contractor" action.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContractorParams {
    pub company: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "telegram")]
    pub telegram_chat_id: Option<String>,
}

/// Service layer for contractor accounts.
pub struct ContractorService;

impl ContractorService {
    /// Generate an opaque contractor id.
    pub fn new_id() -> String {
        format!("ct-{}", Uuid::new_v4().simple())
    }

    /// Create or update a contractor, keyed by id, then by phone.
    ///
    /// Repeating the call with the same phone updates the same record. A record
    /// that has a password can only be updated by that contractor's own session
    /// (`actor` is the authenticated contractor id, if any).
    pub async fn upsert(
        pool: &PgPool,
        params: &UpsertContractorParams,
        actor: Option<&str>,
    ) -> Result<UpsertOutcome, AppError> {
        let id = clean(params.id.as_deref());
        let phone = clean(params.phone.as_deref());
        if id.is_none() && phone.is_none() {
            return Err(AppError::Validation("id or phone is required".to_string()));
        }

        let password_hash = match usable_password(params.password.as_deref()) {
            Some(pw) => Some(hash_password(pw.to_string()).await?),
            None => None,
        };

        let mut existing = None;
        if let Some(id) = &id {
            existing = ContractorResolver::find_account(pool, id).await?;
        }
        if existing.is_none()
            && let Some(phone) = &phone
        {
            existing = ContractorResolver::find_account(pool, phone).await?;
        }

        let outcome = match existing {
            Some(current) => {
                if current.password_hash.is_some() && actor != Some(current.id.as_str()) {
                    return Err(AppError::Auth(
                        "sign in to update this contractor profile".to_string(),
                    ));
                }

                let contractor: Contractor = sqlx::query_as(
                    r#"
                    UPDATE contractors
                    SET name = COALESCE($2, name),
                        company = COALESCE($3, company),
                        phone = COALESCE($4, phone),
                        service = COALESCE($5, service),
                        email = COALESCE($6, email),
                        telegram_token = COALESCE($7, telegram_token),
                        telegram_chat_id = COALESCE($8, telegram_chat_id),
                        logo_url = COALESCE($9, logo_url),
                        theme_color = COALESCE($10, theme_color),
                        bio = COALESCE($11, bio),
                        password_hash = COALESCE($12, password_hash),
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(&current.id)
                .bind(clean(params.name.as_deref()))
                .bind(clean(params.company.as_deref()))
                .bind(&phone)
                .bind(clean(params.service.as_deref()))
                .bind(clean(params.email.as_deref()))
                .bind(clean(params.telegram_token.as_deref()))
                .bind(clean(params.telegram_chat_id.as_deref()))
                .bind(clean(params.logo_url.as_deref()))
                .bind(clean(params.theme_color.as_deref()))
                .bind(clean(params.bio.as_deref()))
                .bind(&password_hash)
                .fetch_one(pool)
                .await
                .map_err(phone_conflict)?;

                UpsertOutcome {
                    contractor,
                    created: false,
                }
            }
            None => {
                let phone = phone.ok_or_else(|| {
                    AppError::Validation("phone is required for a new contractor".to_string())
                })?;
                let id = id.unwrap_or_else(Self::new_id);

                let contractor: Contractor = sqlx::query_as(
                    r#"
                    INSERT INTO contractors (
                        id, name, company, phone, service, email, telegram_token,
                        telegram_chat_id, logo_url, theme_color, bio, password_hash
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                    RETURNING *
                    "#,
                )
                .bind(&id)
                .bind(clean(params.name.as_deref()))
                .bind(clean(params.company.as_deref()))
                .bind(&phone)
                .bind(clean(params.service.as_deref()))
                .bind(clean(params.email.as_deref()))
                .bind(clean(params.telegram_token.as_deref()))
                .bind(clean(params.telegram_chat_id.as_deref()))
                .bind(clean(params.logo_url.as_deref()))
                .bind(clean(params.theme_color.as_deref()))
                .bind(clean(params.bio.as_deref()))
                .bind(&password_hash)
                .fetch_one(pool)
                .await
                .map_err(phone_conflict)?;

                UpsertOutcome {
                    contractor,
                    created: true,
                }
            }
        };

        tracing::info!(
            contractor_id = %outcome.contractor.id,
            created = outcome.created,
            "Contractor upserted"
        );

        Ok(outcome)
    }

    /// Admin-side creation with an initial password.
    pub async fn create_with_password(
        pool: &PgPool,
        params: &NewContractorParams,
    ) -> Result<Contractor, AppError> {
        let company = clean(params.company.as_deref());
        let phone = clean(params.phone.as_deref());
        let password = usable_password(params.password.as_deref());
        let (Some(company), Some(phone), Some(password)) = (company, phone, password) else {
            return Err(AppError::Validation(
                "company, phone and password are required".to_string(),
            ));
        };

        let password_hash = hash_password(password.to_string()).await?;

        let contractor: Contractor = sqlx::query_as(
            r#"
            INSERT INTO contractors (id, company, phone, password_hash, telegram_chat_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Self::new_id())
        .bind(&company)
        .bind(&phone)
        .bind(&password_hash)
        .bind(clean(params.telegram_chat_id.as_deref()))
        .fetch_one(pool)
        .await
        .map_err(phone_conflict)?;

        tracing::info!(contractor_id = %contractor.id, "Contractor created by admin");
        Ok(contractor)
    }

    /// Verify a phone + password pair.
    pub async fn login(pool: &PgPool, phone: &str, password: &str) -> Result<Contractor, AppError> {
        let phone = phone.trim();
        if phone.is_empty() || usable_password(Some(password)).is_none() {
            return Err(AppError::Validation(
                "phone and password are required".to_string(),
            ));
        }

        let contractor: Option<Contractor> =
            sqlx::query_as("SELECT * FROM contractors WHERE phone = $1")
                .bind(phone)
                .fetch_optional(pool)
                .await?;

        let Some(contractor) = contractor.filter(|c| !c.is_deleted()) else {
            tracing::debug!("Login rejected: unknown phone");
            return Err(AppError::Auth(LOGIN_FAILED.to_string()));
        };
        let Some(hash) = contractor.password_hash.clone() else {
            tracing::debug!(contractor_id = %contractor.id, "Login rejected: no password set");
            return Err(AppError::Auth(LOGIN_FAILED.to_string()));
        };

        if !verify_password(password.to_string(), hash).await? {
            tracing::debug!(contractor_id = %contractor.id, "Login rejected: wrong password");
            return Err(AppError::Auth(LOGIN_FAILED.to_string()));
        }

        tracing::info!(contractor_id = %contractor.id, "Contractor logged in");
        Ok(contractor)
    }

    pub async fn get(pool: &PgPool, contractor_id: &str) -> Result<Contractor, AppError> {
        sqlx::query_as("SELECT * FROM contractors WHERE id = $1")
            .bind(contractor_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contractor {} not found", contractor_id)))
    }

    /// Public listing, newest first, soft-deleted contractors hidden.
    pub async fn list(pool: &PgPool) -> Result<Vec<Contractor>, AppError> {
        let contractors: Vec<Contractor> = sqlx::query_as(
            r#"
            SELECT * FROM contractors
            WHERE badge IS DISTINCT FROM $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(DELETED_BADGE)
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(contractors)
    }

    /// Set (or clear, with an empty badge) a contractor's badge.
    pub async fn apply_badge(
        pool: &PgPool,
        reference: &str,
        badge: Option<&str>,
    ) -> Result<Contractor, AppError> {
        let current = ContractorResolver::require_account(pool, reference).await?;
        let badge = clean(badge);

        let contractor: Contractor = sqlx::query_as(
            "UPDATE contractors SET badge = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(&current.id)
        .bind(&badge)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            contractor_id = %contractor.id,
            badge = badge.as_deref().unwrap_or("-"),
            "Badge applied"
        );
        Ok(contractor)
    }

    pub async fn set_subscription(
        pool: &PgPool,
        reference: &str,
        plan: &SubscriptionPlan,
    ) -> Result<Contractor, AppError> {
        let current = ContractorResolver::require_account(pool, reference).await?;

        let contractor: Contractor = sqlx::query_as(
            "UPDATE contractors SET subscription = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(&current.id)
        .bind(Json(plan))
        .fetch_one(pool)
        .await?;

        tracing::info!(
            contractor_id = %contractor.id,
            plan = %plan.plan,
            expires_at = %plan.expires_at,
            "Subscription applied"
        );
        Ok(contractor)
    }
}

/// Map a unique-violation on `contractors.phone` to a validation error.
fn phone_conflict(err: sqlx::Error) -> AppError {
    let is_unique_violation = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505");
    if is_unique_violation {
        AppError::Validation("phone is already registered to another contractor".to_string())
    } else {
        AppError::Database(err)
    }
}

/// Passwords are kept exactly as typed; only blank ones are refused.
fn usable_password(raw: Option<&str>) -> Option<&str> {
    raw.filter(|pw| !pw.trim().is_empty())
}

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))?;

    // A malformed stored hash is a failed login, not a server error.
    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash is unreadable");
        false
    }))
}
