use axum::{routing::get, Router};

use crate::handlers::users;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(users::get_players))
}
