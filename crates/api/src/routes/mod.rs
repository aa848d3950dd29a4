pub mod admin;
pub mod catalog;
pub mod contractors;
pub mod health;
pub mod leads;
pub mod logs;
pub mod messages;
pub mod reviews;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Cap for JSON bodies.
pub const JSON_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .merge(health::router())
        .merge(leads::router())
        .merge(contractors::router())
        .merge(reviews::router())
        .merge(messages::router())
        .merge(catalog::router())
        .merge(admin::router())
        .merge(logs::router())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .with_state(state)
}
