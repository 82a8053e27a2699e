use axum::extract::{Path, State};
use axum::response::Json;
use chrono::Utc;
use serde::Serialize;

use crate::errors::{AppError, Result};
use crate::models::attendance::{Attendance, AttendanceEntry, AttendanceStatus, VoteRequest};
use crate::models::event::{CreateEvent, Event};
use crate::models::user::Session;
use crate::repository::attendance::AttendanceRepository;
use crate::repository::events::EventRepository;
use crate::repository::users::UserRepository;
use crate::services::archival::ArchivalEngine;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithStatus {
    #[serde(flatten)]
    pub event: Event,
    pub my_status: AttendanceStatus,
}

// Upcoming events. Loading this view is also what sweeps past events into
// the archive, so the reconciliation runs first.
pub async fn get_events(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<EventWithStatus>>> {
    let now = Utc::now();
    let engine = ArchivalEngine::new(state.store.clone());
    engine.run(now).await;

    let events = engine.upcoming(now).await?;
    let attendance = AttendanceRepository::new(state.store.clone());

    let mut response = Vec::with_capacity(events.len());
    for event in events {
        let my_status = attendance
            .get(&session.user_id, &event.id)
            .await?
            .map(|a| a.effective_status())
            .unwrap_or(AttendanceStatus::NotVoted);
        response.push(EventWithStatus { event, my_status });
    }
    Ok(Json(response))
}

pub async fn get_archive(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<Event>>> {
    let events = EventRepository::new(state.store.clone()).list_archived().await?;
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateEvent>,
) -> Result<Json<Vec<Event>>> {
    session.require_admin()?;
    let created = EventRepository::new(state.store.clone())
        .create(&session, payload, Utc::now())
        .await?;
    tracing::info!("created {} event(s) by {}", created.len(), session.user_id);
    Ok(Json(created))
}

pub async fn suspend_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Event>> {
    session.require_admin()?;
    let event = EventRepository::new(state.store.clone())
        .set_suspended(&session, &id, true, Utc::now())
        .await?;
    Ok(Json(event))
}

pub async fn reactivate_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Event>> {
    session.require_admin()?;
    let event = EventRepository::new(state.store.clone())
        .set_suspended(&session, &id, false, Utc::now())
        .await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    session.require_admin()?;
    EventRepository::new(state.store.clone())
        .delete_with_votes(&id)
        .await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// Per-event roster: every player with their vote, or `not-voted` for those
// who have not reacted yet.
pub async fn get_event_attendance(
    State(state): State<AppState>,
    _session: Session,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceEntry>>> {
    let events = EventRepository::new(state.store.clone());
    let attendance = AttendanceRepository::new(state.store.clone());

    let (live, votes) = match events.get_live(&id).await? {
        Some(event) => (Some(event), attendance.list_for_event(&id).await?),
        None => match events.get_archived(&id).await? {
            Some(event) => (Some(event), attendance.list_archived_for_event(&id).await?),
            None => (None, Vec::new()),
        },
    };
    if live.is_none() {
        return Err(AppError::NotFound("event"));
    }

    let players = UserRepository::new(state.store.clone()).list_players().await?;
    let mut entries: Vec<AttendanceEntry> = Vec::with_capacity(players.len());
    for player in &players {
        let entry = match votes.iter().find(|v| v.user_id == player.email) {
            Some(vote) => AttendanceEntry {
                user_id: vote.user_id.clone(),
                user_display_name: vote.user_display_name.clone(),
                status: vote.effective_status(),
                comment: vote.comment.clone(),
                with_car: vote.with_car,
                can_give_ride: vote.can_give_ride,
            },
            None => AttendanceEntry {
                user_id: player.email.clone(),
                user_display_name: player.display_name.clone(),
                status: AttendanceStatus::NotVoted,
                comment: None,
                with_car: false,
                can_give_ride: false,
            },
        };
        entries.push(entry);
    }
    Ok(Json(entries))
}

pub async fn vote(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<Attendance>> {
    session.require_writer()?;

    let event = EventRepository::new(state.store.clone())
        .get_live(&id)
        .await?
        .ok_or(AppError::NotFound("event"))?;
    if event.suspended {
        return Err(AppError::Validation("event is suspended".into()));
    }

    let attendance = AttendanceRepository::new(state.store.clone())
        .vote(&session, &id, payload, Utc::now())
        .await?;
    Ok(Json(attendance))
}
