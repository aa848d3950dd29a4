//! Contractor session tokens and the admin secret gate.
//!
//! Contractors get an HS256 JWT on login; `AuthContractor` validates the
//! `Authorization: Bearer <token>` header on dashboard routes. Admin actions
//! carry the shared secret in the request body and go through `require_admin`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use omnilink_common::config::AppConfig;
use omnilink_common::error::AppError;

use crate::state::AppState;

/// JWT claims stored in the token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the contractor id
    pub sub: String,
    /// Expiration time (UNIX timestamp)
    pub exp: i64,
    /// Issued at (UNIX timestamp)
    pub iat: i64,
}

/// Authenticated contractor extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthContractor {
    pub contractor_id: String,
    pub claims: Claims,
}

/// Like `AuthContractor`, but a missing header is allowed.
///
/// A header that is present and invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeContractor(pub Option<AuthContractor>);

/// Encode a session token for a contractor.
pub fn encode_jwt(contractor_id: &str, secret: &str, expiry_hours: u64) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = i64::try_from(expiry_hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::Config(format!("JWT expiry of {} hours is out of range", expiry_hours))
        })?;

    let claims = Claims {
        sub: contractor_id.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
}

/// Decode and validate a session token.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Check the admin secret supplied with a request.
///
/// Exact string equality against `ADMIN_SECRET`; an empty configured secret
/// rejects everything.
pub fn require_admin(config: &AppConfig, supplied: Option<&str>) -> Result<(), AppError> {
    let authorized = config.admin_enabled()
        && supplied.is_some_and(|secret| secret == config.admin_secret);
    if !authorized {
        tracing::warn!("Rejected admin action with missing or wrong secret");
        return Err(AppError::Auth("unauthorized".to_string()));
    }
    Ok(())
}

fn bearer_token(parts: &Parts) -> Option<Result<String, AppError>> {
    let header = parts.headers.get("authorization")?;
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .ok_or_else(|| AppError::Auth("Authorization header must be 'Bearer <token>'".to_string()));
    Some(token)
}

fn authenticate(token: &str, secret: &str) -> Result<AuthContractor, AppError> {
    let claims = decode_jwt(token, secret)?;
    if claims.sub.is_empty() {
        return Err(AppError::Auth("Invalid contractor in token".to_string()));
    }
    Ok(AuthContractor {
        contractor_id: claims.sub.clone(),
        claims,
    })
}

impl FromRequestParts<AppState> for AuthContractor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) => authenticate(&token?, &state.config.jwt_secret),
            None => Err(AppError::Auth(
                "Missing Authorization header. Use 'Bearer <token>' from /api/contractor/login"
                    .to_string(),
            )),
        }
    }
}

impl FromRequestParts<AppState> for MaybeContractor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            Some(token) => Ok(MaybeContractor(Some(authenticate(
                &token?,
                &state.config.jwt_secret,
            )?))),
            None => Ok(MaybeContractor(None)),
        }
    }
}
