pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use services::AppServices;

/// Assemble the full application router.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", routes::router())
        .layer(Extension(services))
}

async fn health() -> &'static str {
    "ok"
}
