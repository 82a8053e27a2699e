use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::database::store::collections::{ATTENDANCES, ATTENDANCES_ARCHIVE};
use crate::database::store::DocumentStore;
use crate::errors::{AppError, Result};
use crate::models::attendance::{Attendance, AttendanceStatus, VoteRequest};
use crate::models::user::Session;
use crate::repository::{decode, decode_all, encode};

pub struct AttendanceRepository {
    store: Arc<dyn DocumentStore>,
}

impl AttendanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_live(&self) -> Result<Vec<Attendance>> {
        let docs = self.store.get_all(ATTENDANCES).await?;
        Ok(decode_all(ATTENDANCES, docs)?)
    }

    pub async fn list_for_event(&self, event_id: &str) -> Result<Vec<Attendance>> {
        let docs = self
            .store
            .find_eq(ATTENDANCES, "eventId", json!(event_id))
            .await?;
        Ok(decode_all(ATTENDANCES, docs)?)
    }

    pub async fn list_archived_for_event(&self, event_id: &str) -> Result<Vec<Attendance>> {
        let docs = self
            .store
            .find_eq(ATTENDANCES_ARCHIVE, "eventId", json!(event_id))
            .await?;
        Ok(decode_all(ATTENDANCES_ARCHIVE, docs)?)
    }

    pub async fn list_archived(&self) -> Result<Vec<Attendance>> {
        let docs = self.store.get_all(ATTENDANCES_ARCHIVE).await?;
        Ok(decode_all(ATTENDANCES_ARCHIVE, docs)?)
    }

    pub async fn get(&self, user_id: &str, event_id: &str) -> Result<Option<Attendance>> {
        let id = Attendance::doc_id(user_id, event_id);
        match self.store.get(ATTENDANCES, &id).await? {
            Some(doc) => Ok(Some(decode(ATTENDANCES, doc)?)),
            None => Ok(None),
        }
    }

    /// Upsert the caller's vote for an event. The deterministic document id
    /// enforces one record per (user, event) pair.
    pub async fn vote(
        &self,
        session: &Session,
        event_id: &str,
        payload: VoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Attendance> {
        if payload.status == AttendanceStatus::NotVoted {
            return Err(AppError::Validation(
                "not-voted is computed, it cannot be submitted".into(),
            ));
        }

        let existing = self.get(&session.user_id, event_id).await?;
        let attendance = Attendance {
            id: Attendance::doc_id(&session.user_id, event_id),
            event_id: event_id.to_string(),
            user_id: session.user_id.clone(),
            user_display_name: session.display_name.clone(),
            // Legacy flag kept in sync for old readers.
            attending: payload.status == AttendanceStatus::Attending,
            status: Some(payload.status),
            comment: payload.comment,
            with_car: payload.with_car,
            can_give_ride: payload.can_give_ride,
            created_at: existing.as_ref().map_or(now, |a| a.created_at),
            updated_at: now,
            archived_at: None,
        };
        self.store
            .set(ATTENDANCES, &attendance.id, encode(&attendance)?, false)
            .await?;
        Ok(attendance)
    }
}
