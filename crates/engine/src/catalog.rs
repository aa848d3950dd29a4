use sqlx::PgPool;

use omnilink_common::error::AppError;
use omnilink_common::types::Service;

const LIST_LIMIT: i64 = 2000;

/// Read-only access to the service catalog.
pub struct CatalogService;

impl CatalogService {
    /// All service categories, alphabetical.
    pub async fn list_services(pool: &PgPool) -> Result<Vec<Service>, AppError> {
        let services: Vec<Service> =
            sqlx::query_as("SELECT * FROM services ORDER BY name ASC LIMIT $1")
                .bind(LIST_LIMIT)
                .fetch_all(pool)
                .await?;

        Ok(services)
    }
}
