//! Event intake pipeline.
//!
//! For every submitted lead, review, profile save or message:
//! 1. Validate and persist (via the owning service; a failure stops here)
//! 2. Resolve the contractor the event concerns
//! 3. Fan the rendered notification out (best effort, never fails the request)
//! 4. Append the event to its log
//!
//! Persistence success is the only success criterion for the caller.

use redis::aio::ConnectionManager;
use serde_json::json;
use sqlx::PgPool;

use omnilink_common::error::AppError;
use omnilink_common::types::{Contractor, Lead, Message, MessageDirection, Review};
use omnilink_notifier::format;

use crate::contractors::{ContractorService, NewContractorParams, UpsertContractorParams};
use crate::dispatcher::Dispatcher;
use crate::event_log::LogName;
use crate::leads::{CreateLeadParams, LeadService};
use crate::messages::MessageService;
use crate::reviews::{CreateReviewParams, ReviewService};

#[derive(Clone)]
pub struct IntakeProcessor {
    dispatcher: Dispatcher,
}

impl IntakeProcessor {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn submit_lead(
        &self,
        pool: &PgPool,
        redis: &mut ConnectionManager,
        params: &CreateLeadParams,
    ) -> Result<Lead, AppError> {
        let (lead, contractor) = LeadService::create(pool, params).await?;

        let text = format::lead_alert(&lead, contractor.as_ref().map(Contractor::display_name));
        self.dispatcher
            .notify(redis, &text, contractor.as_ref())
            .await;

        self.dispatcher
            .log()
            .record(
                redis,
                LogName::Leads,
                json!({
                    "lead_id": lead.id,
                    "name": &lead.name,
                    "phone": &lead.phone,
                    "email": &lead.email,
                    "service": &lead.service,
                    "message": &lead.message,
                    "contractor_ref": &lead.contractor_ref,
                    "contractor_id": &lead.contractor_id,
                }),
            )
            .await;

        Ok(lead)
    }

    pub async fn submit_review(
        &self,
        pool: &PgPool,
        redis: &mut ConnectionManager,
        params: &CreateReviewParams,
    ) -> Result<Review, AppError> {
        let (review, contractor) = ReviewService::create(pool, params).await?;

        let label = contractor
            .as_ref()
            .map(Contractor::display_name)
            .or(review.contractor_ref.as_deref());
        let text = format::review_alert(&review, label);
        self.dispatcher
            .notify(redis, &text, contractor.as_ref())
            .await;

        self.dispatcher
            .log()
            .record(
                redis,
                LogName::Reviews,
                json!({
                    "review_id": review.id,
                    "contractor": &review.contractor_ref,
                    "contractor_id": &review.contractor_id,
                    "name": &review.reviewer_name,
                    "rating": review.rating,
                    "comment": &review.comment,
                    "images": &review.images,
                }),
            )
            .await;

        Ok(review)
    }

    /// Signup or profile save. The contractor's own chat is notified too.
    pub async fn upsert_contractor(
        &self,
        pool: &PgPool,
        redis: &mut ConnectionManager,
        params: &UpsertContractorParams,
        actor: Option<&str>,
    ) -> Result<Contractor, AppError> {
        let outcome = ContractorService::upsert(pool, params, actor).await?;
        let contractor = outcome.contractor;

        let text = format::contractor_alert(&contractor, outcome.created);
        self.dispatcher
            .notify(redis, &text, Some(&contractor))
            .await;

        self.dispatcher
            .log()
            .record(
                redis,
                LogName::Contractors,
                json!({
                    "action": if outcome.created { "create" } else { "update" },
                    "contractor_id": &contractor.id,
                    "company": &contractor.company,
                    "phone": &contractor.phone,
                }),
            )
            .await;

        Ok(contractor)
    }

    pub async fn create_contractor(
        &self,
        pool: &PgPool,
        redis: &mut ConnectionManager,
        params: &NewContractorParams,
    ) -> Result<Contractor, AppError> {
        let contractor = ContractorService::create_with_password(pool, params).await?;

        let text = format::contractor_alert(&contractor, true);
        self.dispatcher.notify(redis, &text, None).await;

        self.dispatcher
            .log()
            .record(
                redis,
                LogName::Contractors,
                json!({
                    "action": "admin_create",
                    "contractor_id": &contractor.id,
                    "company": &contractor.company,
                    "phone": &contractor.phone,
                }),
            )
            .await;

        Ok(contractor)
    }

    /// Contractor → admin. Only the admin and override chats are notified.
    pub async fn message_admin(
        &self,
        pool: &PgPool,
        redis: &mut ConnectionManager,
        contractor_ref: Option<&str>,
        body: Option<&str>,
    ) -> Result<Message, AppError> {
        let (message, contractor) =
            MessageService::create(pool, contractor_ref, body, MessageDirection::ToAdmin).await?;

        let text =
            format::contractor_message(contractor.display_name(), &message.body, message.created_at);
        self.dispatcher.notify(redis, &text, None).await;

        self.dispatcher
            .log()
            .record(
                redis,
                LogName::Messages,
                json!({
                    "message_id": message.id,
                    "contractor_id": &contractor.id,
                    "message": &message.body,
                }),
            )
            .await;

        Ok(message)
    }

    /// Admin → contractor. The contractor's chat is notified when configured.
    pub async fn message_contractor(
        &self,
        pool: &PgPool,
        redis: &mut ConnectionManager,
        contractor_ref: Option<&str>,
        body: Option<&str>,
    ) -> Result<Message, AppError> {
        let (message, contractor) =
            MessageService::create(pool, contractor_ref, body, MessageDirection::ToContractor)
                .await?;

        let text = format::admin_message(&message.body, message.created_at);
        let report = self
            .dispatcher
            .notify(redis, &text, Some(&contractor))
            .await;
        if contractor.destination().is_none() {
            tracing::info!(
                contractor_id = %contractor.id,
                "Contractor has no chat configured; message stored for the dashboard only"
            );
        }

        self.dispatcher
            .log()
            .record(
                redis,
                LogName::AdminMessages,
                json!({
                    "message_id": message.id,
                    "contractor_id": &contractor.id,
                    "message": &message.body,
                    "delivered": report.delivered_count(),
                }),
            )
            .await;

        Ok(message)
    }
}
