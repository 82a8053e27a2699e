use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::stats;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stats::get_stats))
        .route("/reprocess", post(stats::reprocess))
        .route("/recalculate", post(stats::recalculate))
}
