use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::store::collections::{ATTENDANCES_ARCHIVE, EVENTS_ARCHIVE, MATCH_RESULTS};
use crate::database::store::{DocumentStore, WriteBatch};
use crate::errors::{AppError, Result};
use crate::models::event::EventType;
use crate::models::match_result::{
    MatchCard, MatchGoal, MatchResult, SaveMatchResult, GUEST_PLAYER_ID, MAX_GOALS,
};
use crate::repository::attendance::AttendanceRepository;
use crate::repository::events::EventRepository;
use crate::repository::results::ResultRepository;
use crate::services::aggregation::StatsEngine;

/// Validates and persists results for archived matches, feeding the stats
/// engine with the delta between the previous and the new version.
pub struct MatchResultEditor {
    store: Arc<dyn DocumentStore>,
    events: EventRepository,
    results: ResultRepository,
    attendance: AttendanceRepository,
    stats: StatsEngine,
}

impl MatchResultEditor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            events: EventRepository::new(store.clone()),
            results: ResultRepository::new(store.clone()),
            attendance: AttendanceRepository::new(store.clone()),
            stats: StatsEngine::new(store.clone()),
            store,
        }
    }

    /// Upsert the result for one archived match: validate, persist, mirror
    /// the opponent onto the event, then apply the stats delta against the
    /// previous persisted version.
    pub async fn save(
        &self,
        event_id: &str,
        mut payload: SaveMatchResult,
        now: DateTime<Utc>,
    ) -> Result<MatchResult> {
        let event = self
            .events
            .get_archived(event_id)
            .await?
            .ok_or(AppError::NotFound("match"))?;
        if event.event_type != EventType::Match {
            return Err(AppError::Validation(
                "results can only be recorded for matches".into(),
            ));
        }

        payload.furia_goals = payload.furia_goals.min(MAX_GOALS);
        payload.rival_goals = payload.rival_goals.min(MAX_GOALS);
        validate(&payload)?;

        let previous = self.results.get(event_id).await?;
        let result = MatchResult {
            id: event_id.to_string(),
            rival_id: payload.rival_id,
            rival_name: payload.rival_name,
            furia_goals: payload.furia_goals,
            rival_goals: payload.rival_goals,
            goals: payload
                .goals
                .into_iter()
                .map(|g| MatchGoal {
                    id: Uuid::new_v4().to_string(),
                    player_id: g.player_id,
                    player_name: g.player_name,
                    assist_player_id: g.assist_player_id,
                    assist_player_name: g.assist_player_name,
                    created_at: now,
                })
                .collect(),
            cards: payload
                .cards
                .into_iter()
                .map(|c| MatchCard {
                    id: Uuid::new_v4().to_string(),
                    player_id: c.player_id,
                    player_name: c.player_name,
                    card_type: c.card_type,
                    created_at: now,
                })
                .collect(),
            figure_of_the_match_id: payload.figure_of_the_match_id,
            is_friendly: payload.is_friendly,
            date: event.date,
            location: event.location.clone(),
            created_at: previous.as_ref().map_or(now, |p| p.created_at),
            updated_at: now,
        };

        self.results.upsert(&result).await?;
        self.events
            .set_result_links(event_id, &result.rival_id, &result.rival_name, result.is_friendly)
            .await?;
        self.stats
            .apply_result_delta(previous.as_ref(), Some(&result), now)
            .await?;

        tracing::info!(
            "saved result {} {}-{} vs {}",
            event_id,
            result.furia_goals,
            result.rival_goals,
            result.rival_name
        );
        Ok(result)
    }

    /// Remove an archived match entirely: event, archived attendances and
    /// result go in one batch. The match's past stats contribution is not
    /// reversed; reprocessing is the repair path.
    pub async fn delete_match(&self, event_id: &str) -> Result<()> {
        if self.events.get_archived(event_id).await?.is_none() {
            return Err(AppError::NotFound("match"));
        }
        let attendances = self.attendance.list_archived_for_event(event_id).await?;

        let mut batch = WriteBatch::new();
        batch.delete(EVENTS_ARCHIVE, event_id);
        for attendance in attendances {
            batch.delete(ATTENDANCES_ARCHIVE, attendance.id);
        }
        batch.delete(MATCH_RESULTS, event_id);
        self.store.commit(batch).await?;

        tracing::info!("deleted archived match {} and its records", event_id);
        Ok(())
    }

    pub async fn get(&self, event_id: &str) -> Result<Option<MatchResult>> {
        self.results.get(event_id).await
    }
}

fn validate(payload: &SaveMatchResult) -> Result<()> {
    if payload.rival_id.trim().is_empty() {
        return Err(AppError::Validation("a rival must be selected".into()));
    }
    if payload.goals.len() as u32 != payload.furia_goals {
        return Err(AppError::Validation(format!(
            "must add exactly {} goals",
            payload.furia_goals
        )));
    }
    if !payload.is_friendly {
        let has_guest = payload.goals.iter().any(|g| {
            g.player_id == GUEST_PLAYER_ID
                || g.assist_player_id.as_deref() == Some(GUEST_PLAYER_ID)
        });
        if has_guest {
            return Err(AppError::Validation(
                "guest players are only allowed in friendly matches".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::models::event::Event;
    use crate::models::match_result::SaveGoal;
    use crate::repository::stats::StatsRepository;

    async fn seed_archived_match(store: &Arc<MemoryStore>, id: &str) {
        let date = Utc::now() - Duration::days(1);
        let event = Event {
            id: id.to_string(),
            event_type: EventType::Match,
            date,
            title: "League match".into(),
            description: None,
            location: Some("Campo Norte".into()),
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
            archived_at: Some(date + Duration::hours(2)),
        };
        store
            .set(EVENTS_ARCHIVE, id, serde_json::to_value(&event).unwrap(), false)
            .await
            .unwrap();
    }

    fn save_goal(player: &str) -> SaveGoal {
        SaveGoal {
            player_id: player.to_string(),
            player_name: player.to_string(),
            assist_player_id: None,
            assist_player_name: None,
        }
    }

    fn payload(goals: Vec<SaveGoal>) -> SaveMatchResult {
        SaveMatchResult {
            rival_id: "r1".into(),
            rival_name: "Deportivo".into(),
            furia_goals: goals.len() as u32,
            rival_goals: 1,
            goals,
            cards: Vec::new(),
            figure_of_the_match_id: None,
            is_friendly: false,
        }
    }

    #[tokio::test]
    async fn goal_count_must_match_score_exactly() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());
        seed_archived_match(&store, "m1").await;

        let mut bad = payload(vec![save_goal("A"), save_goal("A")]);
        bad.furia_goals = 3;
        let err = editor.save("m1", bad, Utc::now()).await.unwrap_err();
        assert!(err.to_string().contains("exactly 3 goals"));

        let ok = payload(vec![save_goal("A"), save_goal("A"), save_goal("B")]);
        assert!(editor.save("m1", ok, Utc::now()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_rival_is_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());
        seed_archived_match(&store, "m1").await;

        let mut bad = payload(vec![]);
        bad.rival_id = "  ".into();
        assert!(editor.save("m1", bad, Utc::now()).await.is_err());
        assert!(editor.get("m1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn guest_scorer_requires_friendly() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());
        seed_archived_match(&store, "m1").await;

        let official = payload(vec![save_goal(GUEST_PLAYER_ID)]);
        assert!(editor.save("m1", official, Utc::now()).await.is_err());

        let mut friendly = payload(vec![save_goal(GUEST_PLAYER_ID)]);
        friendly.is_friendly = true;
        assert!(editor.save("m1", friendly, Utc::now()).await.is_ok());
    }

    #[tokio::test]
    async fn scores_are_clamped_to_bounds() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());
        seed_archived_match(&store, "m1").await;

        let mut wild = payload(vec![]);
        wild.furia_goals = 0;
        wild.rival_goals = 500;
        let saved = editor.save("m1", wild, Utc::now()).await.unwrap();
        assert_eq!(saved.rival_goals, MAX_GOALS);
    }

    #[tokio::test]
    async fn save_mirrors_opponent_onto_archived_event() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());
        seed_archived_match(&store, "m1").await;

        editor
            .save("m1", payload(vec![save_goal("A")]), Utc::now())
            .await
            .unwrap();

        let event = store.get(EVENTS_ARCHIVE, "m1").await.unwrap().unwrap();
        assert_eq!(event.data["rivalName"], "Deportivo");
        assert_eq!(event.data["isFriendly"], false);
    }

    #[tokio::test]
    async fn results_only_attach_to_matches() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());

        let date = Utc::now() - Duration::days(1);
        let event = serde_json::to_value(&Event {
            id: "t1".to_string(),
            event_type: EventType::Training,
            date,
            title: "Training".into(),
            description: None,
            location: None,
            created_by: "admin@furia.team".into(),
            created_at: date,
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
            archived_at: Some(date),
        })
        .unwrap();
        store.set(EVENTS_ARCHIVE, "t1", event, false).await.unwrap();

        let err = editor
            .save("t1", payload(vec![]), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_match_removes_records_but_not_stats() {
        let store = Arc::new(MemoryStore::new());
        let editor = MatchResultEditor::new(store.clone());
        seed_archived_match(&store, "m1").await;

        editor
            .save("m1", payload(vec![save_goal("A")]), Utc::now())
            .await
            .unwrap();
        let before = StatsRepository::new(store.clone())
            .get("A")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.goals, 1);

        editor.delete_match("m1").await.unwrap();
        assert!(store.get(EVENTS_ARCHIVE, "m1").await.unwrap().is_none());
        assert!(store.get(MATCH_RESULTS, "m1").await.unwrap().is_none());

        // Deleting the match does not reverse its stats contribution.
        let after = StatsRepository::new(store.clone())
            .get("A")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.goals, 1);
    }
}
