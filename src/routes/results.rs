use axum::{routing::get, Router};

use crate::handlers::results;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/:event_id",
        get(results::get_result)
            .put(results::save_result)
            .delete(results::delete_match),
    )
}
