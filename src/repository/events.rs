use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::database::store::collections::{ATTENDANCES, EVENTS, EVENTS_ARCHIVE};
use crate::database::store::{DocumentStore, WriteBatch};
use crate::errors::{AppError, Result};
use crate::models::event::{CreateEvent, Event, RecurringType};
use crate::models::user::Session;
use crate::repository::{decode, decode_all, encode};

/// Upper bound on instances generated for one recurring event.
const MAX_RECURRING_INSTANCES: usize = 52;

pub struct EventRepository {
    store: Arc<dyn DocumentStore>,
}

impl EventRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_live(&self) -> Result<Vec<Event>> {
        let docs = self.store.get_all(EVENTS).await?;
        let mut events: Vec<Event> = decode_all(EVENTS, docs)?;
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    pub async fn list_archived(&self) -> Result<Vec<Event>> {
        let docs = self.store.get_all(EVENTS_ARCHIVE).await?;
        let mut events: Vec<Event> = decode_all(EVENTS_ARCHIVE, docs)?;
        events.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(events)
    }

    pub async fn get_live(&self, id: &str) -> Result<Option<Event>> {
        match self.store.get(EVENTS, id).await? {
            Some(doc) => Ok(Some(decode(EVENTS, doc)?)),
            None => Ok(None),
        }
    }

    pub async fn get_archived(&self, id: &str) -> Result<Option<Event>> {
        match self.store.get(EVENTS_ARCHIVE, id).await? {
            Some(doc) => Ok(Some(decode(EVENTS_ARCHIVE, doc)?)),
            None => Ok(None),
        }
    }

    /// Create an event; a recurring one is expanded into concrete instances
    /// up to its end date, each later instance pointing back at the first.
    pub async fn create(
        &self,
        session: &Session,
        payload: CreateEvent,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let dates = expand_dates(&payload)?;

        let mut created = Vec::with_capacity(dates.len());
        let mut original_id: Option<String> = None;
        for date in dates {
            let id = Uuid::new_v4().to_string();
            let event = Event {
                id: id.clone(),
                event_type: payload.event_type,
                date,
                title: payload.title.clone(),
                description: payload.description.clone(),
                location: payload.location.clone(),
                created_by: session.user_id.clone(),
                created_at: now,
                is_recurring: payload.is_recurring,
                recurring_type: payload.recurring_type,
                recurring_end_date: payload.recurring_end_date,
                original_event_id: original_id.clone(),
                rival_id: payload.rival_id.clone(),
                rival_name: payload.rival_name.clone(),
                is_friendly: None,
                suspended: false,
                suspended_by: None,
                suspended_at: None,
                archived_at: None,
            };
            self.store.set(EVENTS, &id, encode(&event)?, false).await?;
            if original_id.is_none() {
                original_id = Some(id);
            }
            created.push(event);
        }
        Ok(created)
    }

    pub async fn set_suspended(
        &self,
        session: &Session,
        id: &str,
        suspended: bool,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        let mut event = self.get_live(id).await?.ok_or(AppError::NotFound("event"))?;
        event.suspended = suspended;
        event.suspended_by = suspended.then(|| session.user_id.clone());
        event.suspended_at = suspended.then_some(now);

        let fields = json!({
            "suspended": event.suspended,
            "suspendedBy": event.suspended_by,
            "suspendedAt": event.suspended_at,
        });
        self.store.update(EVENTS, id, fields).await?;
        Ok(event)
    }

    /// Remove a live event together with its votes in one batch.
    pub async fn delete_with_votes(&self, id: &str) -> Result<()> {
        if self.get_live(id).await?.is_none() {
            return Err(AppError::NotFound("event"));
        }
        let votes = self.store.find_eq(ATTENDANCES, "eventId", json!(id)).await?;

        let mut batch = WriteBatch::new();
        batch.delete(EVENTS, id);
        for vote in votes {
            batch.delete(ATTENDANCES, vote.id);
        }
        self.store.commit(batch).await?;
        Ok(())
    }

    /// Mirror the saved result's opponent and friendliness onto the archived
    /// event so list views stay consistent without a join.
    pub async fn set_result_links(
        &self,
        id: &str,
        rival_id: &str,
        rival_name: &str,
        is_friendly: bool,
    ) -> Result<()> {
        let fields = json!({
            "rivalId": rival_id,
            "rivalName": rival_name,
            "isFriendly": is_friendly,
        });
        self.store.update(EVENTS_ARCHIVE, id, fields).await?;
        Ok(())
    }
}

fn expand_dates(payload: &CreateEvent) -> Result<Vec<DateTime<Utc>>> {
    if !payload.is_recurring {
        return Ok(vec![payload.date]);
    }

    let step = payload
        .recurring_type
        .ok_or_else(|| AppError::Validation("recurring events need a recurrence type".into()))?;
    let end = payload.recurring_end_date.ok_or_else(|| {
        AppError::Validation("recurring events need an end date".into())
    })?;
    if end < payload.date {
        return Err(AppError::Validation(
            "recurrence end date is before the first occurrence".into(),
        ));
    }

    let mut dates = Vec::new();
    let mut current = payload.date;
    while current <= end && dates.len() < MAX_RECURRING_INSTANCES {
        dates.push(current);
        current = match step {
            RecurringType::Weekly => current + Duration::weeks(1),
            RecurringType::Biweekly => current + Duration::weeks(2),
            RecurringType::Monthly => current
                .checked_add_months(Months::new(1))
                .ok_or_else(|| AppError::Validation("recurrence overflows calendar".into()))?,
        };
    }
    Ok(dates)
}
