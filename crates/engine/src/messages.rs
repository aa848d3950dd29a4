//! Messages between the admin and contractors.

use sqlx::PgPool;
use uuid::Uuid;

use omnilink_common::error::AppError;
use omnilink_common::types::{Contractor, Message, MessageDirection};

use crate::clean;
use crate::resolver::ContractorResolver;

const INBOX_LIMIT: i64 = 200;

pub struct MessageService;

impl MessageService {
    /// Store a message for `contractor_ref` in the given direction.
    ///
    /// The contractor must exist (by id or phone); a miss is a 404.
    pub async fn create(
        pool: &PgPool,
        contractor_ref: Option<&str>,
        body: Option<&str>,
        direction: MessageDirection,
    ) -> Result<(Message, Contractor), AppError> {
        let contractor_ref = clean(contractor_ref)
            .ok_or_else(|| AppError::Validation("contractorId is required".to_string()))?;
        let body =
            clean(body).ok_or_else(|| AppError::Validation("message is required".to_string()))?;

        let contractor = ContractorResolver::require_account(pool, &contractor_ref).await?;

        let message: Message = sqlx::query_as(
            r#"
            INSERT INTO messages (id, contractor_id, body, direction)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&contractor.id)
        .bind(&body)
        .bind(direction.to_string())
        .fetch_one(pool)
        .await?;

        tracing::info!(
            message_id = %message.id,
            contractor_id = %contractor.id,
            direction = %direction,
            "Message stored"
        );

        Ok((message, contractor))
    }

    /// Both directions of a contractor's conversation, newest first.
    pub async fn inbox(pool: &PgPool, contractor_id: &str) -> Result<Vec<Message>, AppError> {
        let messages: Vec<Message> = sqlx::query_as(
            "SELECT * FROM messages WHERE contractor_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(contractor_id)
        .bind(INBOX_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }
}
