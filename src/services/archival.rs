use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::database::store::collections::{
    ATTENDANCES, ATTENDANCES_ARCHIVE, EVENTS, EVENTS_ARCHIVE,
};
use crate::database::store::{DocumentStore, WriteBatch};
use crate::errors::Result;
use crate::models::attendance::Attendance;
use crate::models::event::Event;
use crate::repository::attendance::AttendanceRepository;
use crate::repository::encode;
use crate::repository::events::EventRepository;
use crate::services::aggregation::{AttendanceUpdate, StatsEngine};

/// Moves events past their relevance window (start + 1h) into the archive
/// collections, folding their attendances into player statistics on the way.
///
/// This is a reconciliation pass: it is invoked from the upcoming-events
/// read path, from an admin endpoint, and from the periodic scheduler, and
/// running it again after a successful pass finds nothing left to do.
pub struct ArchivalEngine {
    store: Arc<dyn DocumentStore>,
    events: EventRepository,
    attendance: AttendanceRepository,
    stats: StatsEngine,
}

impl ArchivalEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            events: EventRepository::new(store.clone()),
            attendance: AttendanceRepository::new(store.clone()),
            stats: StatsEngine::new(store.clone()),
            store,
        }
    }

    /// Run one pass. Archival is a best-effort side effect of viewing
    /// events: every error is logged and swallowed, and the stale events
    /// simply stay live until the next pass. Returns how many events were
    /// archived.
    pub async fn run(&self, now: DateTime<Utc>) -> usize {
        match self.reconcile(now).await {
            Ok(0) => 0,
            Ok(archived) => {
                tracing::info!("archived {} past event(s)", archived);
                archived
            }
            Err(e) => {
                tracing::error!("archival pass failed, will retry on next load: {}", e);
                0
            }
        }
    }

    async fn reconcile(&self, now: DateTime<Utc>) -> Result<usize> {
        let archivable_ids: Vec<String> = self
            .events
            .list_live()
            .await?
            .into_iter()
            .filter(|e| e.is_archivable(now))
            .map(|e| e.id)
            .collect();
        if archivable_ids.is_empty() {
            return Ok(0);
        }

        // Re-read the full documents so the archived copies carry current
        // field values, not what the first scan happened to see.
        let mut events: Vec<Event> = Vec::with_capacity(archivable_ids.len());
        for id in &archivable_ids {
            if let Some(event) = self.events.get_live(id).await? {
                events.push(event);
            }
        }

        let event_ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
        let attendances: Vec<Attendance> = self
            .attendance
            .list_live()
            .await?
            .into_iter()
            .filter(|a| event_ids.contains(a.event_id.as_str()))
            .collect();

        // Stats before archival: if the batch below fails these writes stay,
        // and the retry may count again. Accepted risk; the usual failure
        // mode (nothing written at all) retries cleanly because the events
        // are still live.
        self.update_stats(&events, &attendances, now).await?;

        let mut batch = WriteBatch::new();
        for event in &events {
            let mut archived = event.clone();
            archived.archived_at = Some(now);
            batch.set(EVENTS_ARCHIVE, archived.id.clone(), encode(&archived)?);
            batch.delete(EVENTS, event.id.clone());
        }
        for attendance in &attendances {
            let mut archived = attendance.clone();
            archived.archived_at = Some(now);
            batch.set(ATTENDANCES_ARCHIVE, archived.id.clone(), encode(&archived)?);
            batch.delete(ATTENDANCES, attendance.id.clone());
        }
        self.store.commit(batch).await?;

        Ok(events.len())
    }

    async fn update_stats(
        &self,
        events: &[Event],
        attendances: &[Attendance],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let type_by_event: HashMap<&str, _> = events
            .iter()
            .map(|e| (e.id.as_str(), e.event_type))
            .collect();

        struct UserBucket {
            display_name: String,
            updates: Vec<AttendanceUpdate>,
        }
        let mut per_user: HashMap<String, UserBucket> = HashMap::new();
        for attendance in attendances {
            let Some(event_type) = type_by_event.get(attendance.event_id.as_str()) else {
                continue;
            };
            if !event_type.counts_for_stats() {
                continue;
            }
            per_user
                .entry(attendance.user_id.clone())
                .or_insert_with(|| UserBucket {
                    display_name: attendance.user_display_name.clone(),
                    updates: Vec::new(),
                })
                .updates
                .push(AttendanceUpdate {
                    event_id: attendance.event_id.clone(),
                    attended: attendance.attended(),
                    event_type: *event_type,
                });
        }

        for (user_id, bucket) in &per_user {
            self.stats
                .apply_attendance(user_id, &bucket.display_name, &bucket.updates, now)
                .await?;
        }
        Ok(())
    }

    /// Upcoming view: live events inside the 10-day window, with events past
    /// their end filtered out (they are being archived by the pass that
    /// precedes this read).
    pub async fn upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        Ok(self
            .events
            .list_live()
            .await?
            .into_iter()
            .filter(|e| e.is_upcoming(now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::attendance::AttendanceStatus;
    use crate::models::event::EventType;
    use crate::repository::stats::StatsRepository;

    async fn seed_event(store: &Arc<MemoryStore>, id: &str, event_type: EventType, date: DateTime<Utc>) {
        let event = Event {
            id: id.to_string(),
            event_type,
            date,
            title: format!("event {}", id),
            description: None,
            location: None,
            created_by: "admin@furia.team".into(),
            created_at: date - Duration::days(7),
            is_recurring: false,
            recurring_type: None,
            recurring_end_date: None,
            original_event_id: None,
            rival_id: None,
            rival_name: None,
            is_friendly: None,
            suspended: false,
            suspended_by: None,
            suspended_at: None,
            archived_at: None,
        };
        store
            .set(EVENTS, id, serde_json::to_value(&event).unwrap(), false)
            .await
            .unwrap();
    }

    async fn seed_vote(store: &Arc<MemoryStore>, event_id: &str, user: &str, attending: bool) {
        let id = Attendance::doc_id(user, event_id);
        let now = Utc::now();
        let att = Attendance {
            id: id.clone(),
            event_id: event_id.to_string(),
            user_id: user.to_string(),
            user_display_name: user.split('@').next().unwrap_or(user).to_string(),
            attending,
            status: Some(if attending {
                AttendanceStatus::Attending
            } else {
                AttendanceStatus::NotAttending
            }),
            comment: None,
            with_car: false,
            can_give_ride: false,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        store
            .set(ATTENDANCES, &id, serde_json::to_value(&att).unwrap(), false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn training_three_hours_old_is_archived_and_counted() {
        let store = Arc::new(MemoryStore::new());
        let engine = ArchivalEngine::new(store.clone());
        let now = Utc::now();

        seed_event(&store, "e1", EventType::Training, now - Duration::hours(3)).await;
        seed_vote(&store, "e1", "u1@furia.team", true).await;

        assert_eq!(engine.run(now).await, 1);

        // Event moved to the archive with its stamp, original gone.
        assert!(store.get(EVENTS, "e1").await.unwrap().is_none());
        let archived = store.get(EVENTS_ARCHIVE, "e1").await.unwrap().unwrap();
        assert!(archived.data.get("archivedAt").is_some());

        // Attendance lives only in the archive now.
        let att_id = Attendance::doc_id("u1@furia.team", "e1");
        assert!(store.get(ATTENDANCES, &att_id).await.unwrap().is_none());
        assert!(store
            .get(ATTENDANCES_ARCHIVE, &att_id)
            .await
            .unwrap()
            .is_some());

        let stats = StatsRepository::new(store.clone())
            .get("u1@furia.team")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.trainings_attended, 1);
        assert_eq!(stats.matches_attended, 0);
        assert_eq!(stats.total_attended, 1);
    }

    #[tokio::test]
    async fn second_pass_leaves_stats_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let engine = ArchivalEngine::new(store.clone());
        let now = Utc::now();

        seed_event(&store, "e1", EventType::Match, now - Duration::hours(2)).await;
        seed_vote(&store, "e1", "u1@furia.team", true).await;

        assert_eq!(engine.run(now).await, 1);
        // The event is no longer live, so a re-run finds nothing.
        assert_eq!(engine.run(now).await, 0);

        let stats = StatsRepository::new(store.clone())
            .get("u1@furia.team")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.matches_attended, 1);
        assert_eq!(stats.total_attended, 1);
    }

    #[tokio::test]
    async fn events_inside_grace_stay_live() {
        let store = Arc::new(MemoryStore::new());
        let engine = ArchivalEngine::new(store.clone());
        let now = Utc::now();

        // Started 30 minutes ago: inside the one-hour grace.
        seed_event(&store, "recent", EventType::Match, now - Duration::minutes(30)).await;
        // Exactly at the boundary: now == date + 1h is still live.
        seed_event(&store, "boundary", EventType::Match, now - Duration::hours(1)).await;

        assert_eq!(engine.run(now).await, 0);
        assert!(store.get(EVENTS, "recent").await.unwrap().is_some());
        assert!(store.get(EVENTS, "boundary").await.unwrap().is_some());

        let upcoming = engine.upcoming(now).await.unwrap();
        assert_eq!(upcoming.len(), 2);
    }

    #[tokio::test]
    async fn birthdays_are_archived_but_never_counted() {
        let store = Arc::new(MemoryStore::new());
        let engine = ArchivalEngine::new(store.clone());
        let now = Utc::now();

        seed_event(&store, "bday", EventType::Birthday, now - Duration::hours(5)).await;
        seed_vote(&store, "bday", "u1@furia.team", true).await;

        assert_eq!(engine.run(now).await, 1);
        assert!(store.get(EVENTS_ARCHIVE, "bday").await.unwrap().is_some());
        // No stats document was created for a birthday.
        assert!(StatsRepository::new(store.clone())
            .get("u1@furia.team")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn votes_for_live_events_are_left_alone() {
        let store = Arc::new(MemoryStore::new());
        let engine = ArchivalEngine::new(store.clone());
        let now = Utc::now();

        seed_event(&store, "old", EventType::Training, now - Duration::hours(4)).await;
        seed_event(&store, "next", EventType::Training, now + Duration::days(2)).await;
        seed_vote(&store, "old", "u1@furia.team", true).await;
        seed_vote(&store, "next", "u1@furia.team", true).await;

        assert_eq!(engine.run(now).await, 1);

        let live_vote = Attendance::doc_id("u1@furia.team", "next");
        assert!(store.get(ATTENDANCES, &live_vote).await.unwrap().is_some());
        assert!(store
            .get(ATTENDANCES_ARCHIVE, &live_vote)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn malformed_event_document_aborts_the_pass() {
        let store = Arc::new(MemoryStore::new());
        let engine = ArchivalEngine::new(store.clone());
        let now = Utc::now();

        store
            .set(EVENTS, "broken", json!({"title": 42}), false)
            .await
            .unwrap();
        seed_event(&store, "ok", EventType::Training, now - Duration::hours(3)).await;

        // Fail closed: the pass reports nothing archived and leaves both
        // documents where they were.
        assert_eq!(engine.run(now).await, 0);
        assert!(store.get(EVENTS, "ok").await.unwrap().is_some());
        assert!(store.get(EVENTS, "broken").await.unwrap().is_some());
    }
}
