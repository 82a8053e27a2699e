use axum::extract::State;
use axum::response::Json;

use crate::errors::Result;
use crate::models::user::{Session, User};
use crate::repository::users::UserRepository;
use crate::AppState;

pub async fn get_players(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<User>>> {
    let players = UserRepository::new(state.store.clone()).list_players().await?;
    Ok(Json(players))
}
