//! Review service.

use sqlx::PgPool;
use uuid::Uuid;

use omnilink_common::error::AppError;
use omnilink_common::types::{Contractor, Review};

use crate::clean;
use crate::resolver::ContractorResolver;

const DEFAULT_RATING: i32 = 5;
const DEFAULT_REVIEWER: &str = "Customer";
const LIST_LIMIT: i64 = 500;

/// Review fields collected from the multipart form; image URLs are already stored.
#[derive(Debug, Clone, Default)]
pub struct CreateReviewParams {
    pub contractor: Option<String>,
    pub name: Option<String>,
    pub rating: Option<String>,
    pub comment: Option<String>,
    pub images: Vec<String>,
}

/// Parse a submitted rating. Blank means the default of 5.
///
/// Only positivity is enforced; there is no upper bound.
pub fn parse_rating(raw: Option<&str>) -> Result<i32, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(DEFAULT_RATING);
    };
    let rating: i32 = raw
        .parse()
        .map_err(|_| AppError::Validation(format!("rating must be a whole number, got '{}'", raw)))?;
    if rating < 1 {
        return Err(AppError::Validation(
            "rating must be a positive number".to_string(),
        ));
    }
    Ok(rating)
}

pub struct ReviewService;

impl ReviewService {
    pub async fn create(
        pool: &PgPool,
        params: &CreateReviewParams,
    ) -> Result<(Review, Option<Contractor>), AppError> {
        let rating = parse_rating(params.rating.as_deref())?;
        let contractor_ref = clean(params.contractor.as_deref());

        let contractor = match &contractor_ref {
            Some(reference) => ContractorResolver::resolve(pool, reference).await?,
            None => None,
        };

        let review: Review = sqlx::query_as(
            r#"
            INSERT INTO reviews (id, contractor_id, contractor_ref, reviewer_name, rating, comment, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contractor.as_ref().map(|c| c.id.as_str()))
        .bind(&contractor_ref)
        .bind(clean(params.name.as_deref()).unwrap_or_else(|| DEFAULT_REVIEWER.to_string()))
        .bind(rating)
        .bind(clean(params.comment.as_deref()).unwrap_or_default())
        .bind(&params.images)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            review_id = %review.id,
            rating = review.rating,
            images = review.images.len(),
            contractor_id = review.contractor_id.as_deref().unwrap_or("-"),
            "Review stored"
        );

        Ok((review, contractor))
    }

    /// Newest reviews, optionally for one contractor.
    pub async fn list(pool: &PgPool, contractor_id: Option<&str>) -> Result<Vec<Review>, AppError> {
        let reviews: Vec<Review> = sqlx::query_as(
            r#"
            SELECT * FROM reviews
            WHERE ($1::text IS NULL OR contractor_id = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(contractor_id)
        .bind(LIST_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rating_defaults_to_five() {
        assert_eq!(parse_rating(None).unwrap(), 5);
        assert_eq!(parse_rating(Some("")).unwrap(), 5);
        assert_eq!(parse_rating(Some("  ")).unwrap(), 5);
    }

    #[test]
    fn test_rating_has_no_upper_bound() {
        assert_eq!(parse_rating(Some("4")).unwrap(), 4);
        assert_eq!(parse_rating(Some(" 10 ")).unwrap(), 10);
    }

    #[test]
    fn test_non_positive_or_garbage_rejected() {
        assert!(parse_rating(Some("0")).is_err());
        assert!(parse_rating(Some("-3")).is_err());
        assert!(parse_rating(Some("five")).is_err());
        assert!(parse_rating(Some("4.5")).is_err());
    }
}
