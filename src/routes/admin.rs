use axum::{routing::post, Router};

use crate::handlers::admin;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/archive", post(admin::run_archival))
}
