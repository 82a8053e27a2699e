use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::handlers::events;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::get_events).post(events::create_event))
        .route("/archive", get(events::get_archive))
        .route("/:id", delete(events::delete_event))
        .route("/:id/suspend", put(events::suspend_event))
        .route("/:id/reactivate", put(events::reactivate_event))
        .route(
            "/:id/attendance",
            get(events::get_event_attendance).put(events::vote),
        )
}
