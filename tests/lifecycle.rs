//! End-to-end flows over the in-memory store: an event is created, voted
//! on, swept into the archive, gets a result, the result is edited, and the
//! repair scans rebuild the same numbers.

use std::sync::Arc;

use chrono::{Duration, Utc};

use furia_api::database::memory::MemoryStore;
use furia_api::database::store::collections::{ATTENDANCES_ARCHIVE, EVENTS, EVENTS_ARCHIVE};
use furia_api::database::store::DocumentStore;
use furia_api::models::attendance::{AttendanceStatus, VoteRequest};
use furia_api::models::event::{CreateEvent, EventType};
use furia_api::models::match_result::{SaveGoal, SaveMatchResult};
use furia_api::models::user::{Role, Session};
use furia_api::repository::attendance::AttendanceRepository;
use furia_api::repository::events::EventRepository;
use furia_api::repository::stats::StatsRepository;
use furia_api::services::aggregation::StatsEngine;
use furia_api::services::archival::ArchivalEngine;
use furia_api::services::results::MatchResultEditor;

fn admin() -> Session {
    Session {
        user_id: "capi@furia.team".into(),
        display_name: "Capi".into(),
        role: Role::Admin,
    }
}

fn player(email: &str, name: &str) -> Session {
    Session {
        user_id: email.into(),
        display_name: name.into(),
        role: Role::Player,
    }
}

fn vote_yes() -> VoteRequest {
    VoteRequest {
        status: AttendanceStatus::Attending,
        comment: None,
        with_car: false,
        can_give_ride: false,
    }
}

fn create_match(date: chrono::DateTime<Utc>) -> CreateEvent {
    CreateEvent {
        event_type: EventType::Match,
        date,
        title: "League match".into(),
        description: None,
        location: Some("Campo Norte".into()),
        is_recurring: false,
        recurring_type: None,
        recurring_end_date: None,
        rival_id: None,
        rival_name: None,
    }
}

fn result_payload(goals: Vec<SaveGoal>, rival_goals: u32) -> SaveMatchResult {
    SaveMatchResult {
        rival_id: "r1".into(),
        rival_name: "Atletico Sur".into(),
        furia_goals: goals.len() as u32,
        rival_goals,
        goals,
        cards: Vec::new(),
        figure_of_the_match_id: None,
        is_friendly: false,
    }
}

fn goal(player: &str) -> SaveGoal {
    SaveGoal {
        player_id: player.into(),
        player_name: player.into(),
        assist_player_id: None,
        assist_player_name: None,
    }
}

#[tokio::test]
async fn match_lifecycle_from_creation_to_edited_result() {
    let store = Arc::new(MemoryStore::new());
    let events = EventRepository::new(store.clone());
    let attendance = AttendanceRepository::new(store.clone());
    let stats = StatsRepository::new(store.clone());
    let archival = ArchivalEngine::new(store.clone());
    let editor = MatchResultEditor::new(store.clone());

    // A match three hours in the past, with two votes.
    let now = Utc::now();
    let created = events
        .create(&admin(), create_match(now - Duration::hours(3)), now - Duration::days(3))
        .await
        .unwrap();
    let event_id = created[0].id.clone();

    let ana = player("ana@furia.team", "Ana");
    let leo = player("leo@furia.team", "Leo");
    attendance
        .vote(&ana, &event_id, vote_yes(), now - Duration::hours(5))
        .await
        .unwrap();
    attendance
        .vote(
            &leo,
            &event_id,
            VoteRequest {
                status: AttendanceStatus::NotAttending,
                comment: Some("injured".into()),
                with_car: false,
                can_give_ride: false,
            },
            now - Duration::hours(5),
        )
        .await
        .unwrap();

    // The sweep moves the match and both votes into the archive.
    assert_eq!(archival.run(now).await, 1);
    assert!(store.get(EVENTS, &event_id).await.unwrap().is_none());
    assert!(store.get(EVENTS_ARCHIVE, &event_id).await.unwrap().is_some());
    let archived_votes = store.get_all(ATTENDANCES_ARCHIVE).await.unwrap();
    assert_eq!(archived_votes.len(), 2);

    // Only the attending player is counted.
    let ana_stats = stats.get("ana@furia.team").await.unwrap().unwrap();
    assert_eq!(ana_stats.matches_attended, 1);
    assert_eq!(ana_stats.total_attended, 1);
    let leo_stats = stats.get("leo@furia.team").await.unwrap().unwrap();
    assert_eq!(leo_stats.matches_attended, 0);

    // Record a 2-1 with both goals by Ana.
    editor
        .save(
            &event_id,
            result_payload(vec![goal("ana@furia.team"), goal("ana@furia.team")], 1),
            now,
        )
        .await
        .unwrap();
    let ana_stats = stats.get("ana@furia.team").await.unwrap().unwrap();
    assert_eq!(ana_stats.goals, 2);

    // Edit: one of the goals was actually Leo's.
    editor
        .save(
            &event_id,
            result_payload(vec![goal("ana@furia.team"), goal("leo@furia.team")], 1),
            now,
        )
        .await
        .unwrap();
    let ana_stats = stats.get("ana@furia.team").await.unwrap().unwrap();
    let leo_stats = stats.get("leo@furia.team").await.unwrap().unwrap();
    assert_eq!(ana_stats.goals, 1);
    assert_eq!(leo_stats.goals, 1);

    // Attendance counters were untouched by the result edits.
    assert_eq!(ana_stats.matches_attended, 1);
}

#[tokio::test]
async fn repair_scans_rebuild_the_same_numbers() {
    let store = Arc::new(MemoryStore::new());
    let events = EventRepository::new(store.clone());
    let attendance = AttendanceRepository::new(store.clone());
    let stats = StatsRepository::new(store.clone());
    let archival = ArchivalEngine::new(store.clone());
    let editor = MatchResultEditor::new(store.clone());
    let engine = StatsEngine::new(store.clone());

    let now = Utc::now();
    let ana = player("ana@furia.team", "Ana");

    // Two archived events: a match and a training, both attended.
    for (kind, hours) in [(EventType::Match, 6), (EventType::Training, 4)] {
        let mut payload = create_match(now - Duration::hours(hours));
        payload.event_type = kind;
        let created = events.create(&admin(), payload, now - Duration::days(3)).await.unwrap();
        attendance
            .vote(&ana, &created[0].id, vote_yes(), now - Duration::hours(12))
            .await
            .unwrap();
    }
    assert_eq!(archival.run(now).await, 2);

    let match_id = events
        .list_archived()
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.event_type == EventType::Match)
        .unwrap()
        .id;
    editor
        .save(&match_id, result_payload(vec![goal("ana@furia.team")], 0), now)
        .await
        .unwrap();

    let before = stats.get("ana@furia.team").await.unwrap().unwrap();
    assert_eq!(
        (before.matches_attended, before.trainings_attended, before.goals),
        (1, 1, 1)
    );

    // Corrupt the counters, then let the repair scans put them back.
    stats
        .merge_fields(
            "ana@furia.team",
            serde_json::json!({"goals": 9, "matchesAttended": 9, "totalAttended": 99}),
        )
        .await
        .unwrap();

    engine.reprocess_results(now).await.unwrap();
    engine.recalculate_attendance(now).await.unwrap();

    let after = stats.get("ana@furia.team").await.unwrap().unwrap();
    assert_eq!(after.goals, 1);
    assert_eq!(after.matches_attended, 1);
    assert_eq!(after.trainings_attended, 1);
    assert_eq!(after.total_attended, 2);
}

#[tokio::test]
async fn viewer_cannot_vote() {
    let store = Arc::new(MemoryStore::new());
    let viewer = Session {
        user_id: "demo@furia.team".into(),
        display_name: "Demo".into(),
        role: Role::Viewer,
    };
    assert!(viewer.require_writer().is_err());
    assert!(viewer.require_admin().is_err());

    // And viewers never show up in the roster.
    store
        .set(
            furia_api::database::store::collections::USERS,
            "demo@furia.team",
            serde_json::json!({
                "id": "demo@furia.team",
                "email": "demo@furia.team",
                "displayName": "Demo",
                "role": "VIEWER",
            }),
            false,
        )
        .await
        .unwrap();
    let players = furia_api::repository::users::UserRepository::new(store.clone())
        .list_players()
        .await
        .unwrap();
    assert!(players.is_empty());
}
