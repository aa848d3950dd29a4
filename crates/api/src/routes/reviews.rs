//! Review submission (multipart, with images) and listing.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use omnilink_common::error::AppError;
use omnilink_engine::reviews::{CreateReviewParams, ReviewService, parse_rating};
use omnilink_engine::uploads::{MAX_IMAGE_BYTES, MAX_IMAGES, PendingImage, too_many_images};

use crate::state::AppState;

/// Room for every image plus the text fields.
const REVIEW_BODY_LIMIT: usize = MAX_IMAGES * MAX_IMAGE_BYTES + 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/review",
            post(create_review).layer(DefaultBodyLimit::max(REVIEW_BODY_LIMIT)),
        )
        .route("/api/reviews", get(list_reviews))
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    #[serde(alias = "contractorId")]
    pub contractor_id: Option<String>,
}

/// POST /api/review: Store images, persist the review, notify.
///
/// Fields: `contractor` (or `contractor_id`/`contractorId`), `name`,
/// `rating`, `comment`, and up to six `images` files. The whole form is read
/// and checked before any image is written; stored images are removed again
/// when the review is rejected.
async fn create_review(
    State(mut state): State<AppState>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut form = form?;
    let mut params = CreateReviewParams::default();
    let mut pending: Vec<PendingImage> = Vec::new();

    while let Some(field) = form.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "images" | "images[]" => {
                let file_name = field.file_name().unwrap_or("image").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if bytes.is_empty() {
                    continue;
                }
                if pending.len() >= MAX_IMAGES {
                    return Err(too_many_images());
                }
                pending.push(PendingImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "contractor" | "contractor_id" | "contractorId" => {
                params.contractor = Some(field.text().await?);
            }
            "name" => params.name = Some(field.text().await?),
            "rating" => params.rating = Some(field.text().await?),
            "comment" => params.comment = Some(field.text().await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown review form field");
            }
        }
    }

    parse_rating(params.rating.as_deref())?;
    params.images = state.uploads.save_images(&pending).await?;

    match state
        .intake
        .submit_review(&state.pool, &mut state.redis, &params)
        .await
    {
        Ok(review) => Ok(Json(json!({ "ok": true, "review": review }))),
        Err(e) => {
            state.uploads.discard(&params.images).await;
            Err(e)
        }
    }
}

/// GET /api/reviews: Newest first, optionally for one contractor.
async fn list_reviews(
    State(state): State<AppState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let reviews = ReviewService::list(&state.pool, query.contractor_id.as_deref()).await?;
    Ok(Json(json!({ "ok": true, "reviews": reviews })))
}
