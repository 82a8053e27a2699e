use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::handlers::rivals;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(rivals::get_rivals).post(rivals::create_rival))
        .route("/:id", delete(rivals::delete_rival))
}

pub fn fixture_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(rivals::get_fixtures).post(rivals::create_fixture))
        .route("/:id/result", put(rivals::link_fixture_result))
}
