use std::sync::Arc;

use axum::Router;

pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

use database::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub jwt_secret: String,
}

/// Assemble the full API router. Kept out of `main` so tests can drive the
/// same surface.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/events", routes::events::routes())
        .nest("/api/rivals", routes::rivals::routes())
        .nest("/api/fixtures", routes::rivals::fixture_routes())
        .nest("/api/results", routes::results::routes())
        .nest("/api/stats", routes::stats::routes())
        .nest("/api/users", routes::users::routes())
        .nest("/api/admin", routes::admin::routes())
        .with_state(state)
}
