use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;

use crate::errors::{AppError, Result};
use crate::models::rival::{CreateFixture, CreateRival, Fixture, LinkFixtureResult, Rival};
use crate::models::user::Session;
use crate::repository::results::ResultRepository;
use crate::repository::rivals::RivalRepository;
use crate::AppState;

pub async fn get_rivals(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<Rival>>> {
    let rivals = RivalRepository::new(state.store.clone()).list().await?;
    Ok(Json(rivals))
}

pub async fn create_rival(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateRival>,
) -> Result<Json<Rival>> {
    session.require_admin()?;
    let rival = RivalRepository::new(state.store.clone())
        .create(payload, Utc::now())
        .await?;
    Ok(Json(rival))
}

pub async fn delete_rival(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;
    RivalRepository::new(state.store.clone()).delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

pub async fn get_fixtures(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<Fixture>>> {
    let fixtures = RivalRepository::new(state.store.clone()).list_fixtures().await?;
    Ok(Json(fixtures))
}

pub async fn create_fixture(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateFixture>,
) -> Result<Json<Fixture>> {
    session.require_admin()?;
    let fixture = RivalRepository::new(state.store.clone())
        .create_fixture(payload, Utc::now())
        .await?;
    Ok(Json(fixture))
}

// Attach a played match's result to a scheduled fixture. The score is
// copied as it stands at link time.
pub async fn link_fixture_result(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<LinkFixtureResult>,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;

    let result = ResultRepository::new(state.store.clone())
        .get(&payload.match_result_id)
        .await?
        .ok_or(AppError::NotFound("result"))?;
    RivalRepository::new(state.store.clone())
        .link_result(&id, &payload, &result)
        .await?;
    Ok(Json(serde_json::json!({
        "fixtureId": id,
        "furiaGoals": result.furia_goals,
        "rivalGoals": result.rival_goals,
    })))
}
