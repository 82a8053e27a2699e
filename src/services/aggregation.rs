use std::collections::{BTreeSet, HashMap};
use std::ops::Sub;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::database::store::DocumentStore;
use crate::errors::Result;
use crate::models::event::EventType;
use crate::models::match_result::{CardType, MatchResult, GUEST_PLAYER_ID};
use crate::models::stats::PlayerStats;
use crate::repository::attendance::AttendanceRepository;
use crate::repository::events::EventRepository;
use crate::repository::results::ResultRepository;
use crate::repository::stats::StatsRepository;

/// One archived attendance as seen from a single player's perspective.
#[derive(Debug, Clone)]
pub struct AttendanceUpdate {
    pub event_id: String,
    pub attended: bool,
    pub event_type: EventType,
}

/// What one match result contributes to one player's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Contribution {
    goals: i64,
    assists: i64,
    yellow_cards: i64,
    red_cards: i64,
    figure_of_the_match: i64,
}

impl Contribution {
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Sub for Contribution {
    type Output = Contribution;

    fn sub(self, other: Contribution) -> Contribution {
        Contribution {
            goals: self.goals - other.goals,
            assists: self.assists - other.assists,
            yellow_cards: self.yellow_cards - other.yellow_cards,
            red_cards: self.red_cards - other.red_cards,
            figure_of_the_match: self.figure_of_the_match - other.figure_of_the_match,
        }
    }
}

/// Per-player tallies of one result, plus the display names it carries.
/// A friendly match contributes nothing at all, and the guest id never
/// appears in any tally.
fn tally(result: Option<&MatchResult>) -> (HashMap<String, Contribution>, HashMap<String, String>) {
    let mut counts: HashMap<String, Contribution> = HashMap::new();
    let mut names: HashMap<String, String> = HashMap::new();

    let Some(result) = result else {
        return (counts, names);
    };
    if result.is_friendly {
        return (counts, names);
    }

    for goal in &result.goals {
        if goal.player_id != GUEST_PLAYER_ID {
            counts.entry(goal.player_id.clone()).or_default().goals += 1;
            names.insert(goal.player_id.clone(), goal.player_name.clone());
        }
        if let Some(assist_id) = &goal.assist_player_id {
            if assist_id != GUEST_PLAYER_ID {
                counts.entry(assist_id.clone()).or_default().assists += 1;
                if let Some(assist_name) = &goal.assist_player_name {
                    names.insert(assist_id.clone(), assist_name.clone());
                }
            }
        }
    }

    for card in &result.cards {
        if card.player_id == GUEST_PLAYER_ID {
            continue;
        }
        let entry = counts.entry(card.player_id.clone()).or_default();
        match card.card_type {
            CardType::Yellow => entry.yellow_cards += 1,
            CardType::Red => entry.red_cards += 1,
        }
        names.insert(card.player_id.clone(), card.player_name.clone());
    }

    if let Some(figure_id) = &result.figure_of_the_match_id {
        if figure_id != GUEST_PLAYER_ID {
            counts
                .entry(figure_id.clone())
                .or_default()
                .figure_of_the_match += 1;
        }
    }

    (counts, names)
}

fn clamp_add(current: u32, diff: i64) -> u32 {
    (i64::from(current) + diff).max(0) as u32
}

/// Maintains the per-player `stats` documents. Counters only ever change
/// through this engine: incrementally on archival and result edits, or
/// wholesale through the two repair scans.
pub struct StatsEngine {
    stats: StatsRepository,
    results: ResultRepository,
    events: EventRepository,
    attendance: AttendanceRepository,
}

impl StatsEngine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            stats: StatsRepository::new(store.clone()),
            results: ResultRepository::new(store.clone()),
            events: EventRepository::new(store.clone()),
            attendance: AttendanceRepository::new(store),
        }
    }

    /// Fold a batch of freshly archived attendances into one player's
    /// counters. Archival is one-directional, so this only ever increments.
    pub async fn apply_attendance(
        &self,
        user_id: &str,
        display_name: &str,
        updates: &[AttendanceUpdate],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let matches = updates
            .iter()
            .filter(|u| u.attended && u.event_type == EventType::Match)
            .count() as u32;
        let trainings = updates
            .iter()
            .filter(|u| u.attended && u.event_type == EventType::Training)
            .count() as u32;

        let mut stats = self.stats.get_or_empty(user_id, display_name, now).await?;
        stats.matches_attended += matches;
        stats.trainings_attended += trainings;
        stats.recompute_total();

        self.stats
            .merge_fields(
                user_id,
                json!({
                    "userId": user_id,
                    "displayName": display_name,
                    "matchesAttended": stats.matches_attended,
                    "trainingsAttended": stats.trainings_attended,
                    "totalAttended": stats.total_attended,
                    "lastUpdated": now,
                }),
            )
            .await
    }

    /// Apply the difference between a result's previous and new version to
    /// every affected player. A zero delta for a player writes nothing.
    pub async fn apply_result_delta(
        &self,
        old: Option<&MatchResult>,
        new: Option<&MatchResult>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let (old_counts, old_names) = tally(old);
        let (new_counts, new_names) = tally(new);

        let players: BTreeSet<&String> = old_counts.keys().chain(new_counts.keys()).collect();
        for player_id in players {
            let before = old_counts.get(player_id).copied().unwrap_or_default();
            let after = new_counts.get(player_id).copied().unwrap_or_default();
            let diff = after - before;
            if diff.is_zero() {
                continue;
            }

            let display_name = new_names
                .get(player_id)
                .or_else(|| old_names.get(player_id))
                .map_or(player_id.as_str(), String::as_str);
            let mut stats = self
                .stats
                .get_or_empty(player_id, display_name, now)
                .await?;
            stats.goals = clamp_add(stats.goals, diff.goals);
            stats.assists = clamp_add(stats.assists, diff.assists);
            stats.yellow_cards = clamp_add(stats.yellow_cards, diff.yellow_cards);
            stats.red_cards = clamp_add(stats.red_cards, diff.red_cards);
            stats.figure_of_the_match =
                clamp_add(stats.figure_of_the_match, diff.figure_of_the_match);

            self.stats
                .merge_fields(
                    player_id,
                    json!({
                        "userId": player_id,
                        "displayName": stats.display_name,
                        "goals": stats.goals,
                        "assists": stats.assists,
                        "yellowCards": stats.yellow_cards,
                        "redCards": stats.red_cards,
                        "figureOfTheMatch": stats.figure_of_the_match,
                        "lastUpdated": now,
                    }),
                )
                .await?;
        }
        Ok(())
    }

    /// Repair tool: rebuild the five result-derived counters for every
    /// player with recorded activity by scanning all match results.
    /// Attendance counters are untouched. Safe to run repeatedly.
    pub async fn reprocess_results(&self, now: DateTime<Utc>) -> Result<usize> {
        let results = self.results.list().await?;

        let mut totals: HashMap<String, Contribution> = HashMap::new();
        let mut names: HashMap<String, String> = HashMap::new();
        for result in &results {
            let (counts, result_names) = tally(Some(result));
            for (player_id, contribution) in counts {
                let entry = totals.entry(player_id).or_default();
                entry.goals += contribution.goals;
                entry.assists += contribution.assists;
                entry.yellow_cards += contribution.yellow_cards;
                entry.red_cards += contribution.red_cards;
                entry.figure_of_the_match += contribution.figure_of_the_match;
            }
            names.extend(result_names);
        }

        for (player_id, total) in &totals {
            let display_name = names
                .get(player_id)
                .map_or(player_id.as_str(), String::as_str);
            self.stats
                .merge_fields(
                    player_id,
                    json!({
                        "userId": player_id,
                        "displayName": display_name,
                        "goals": total.goals,
                        "assists": total.assists,
                        "yellowCards": total.yellow_cards,
                        "redCards": total.red_cards,
                        "figureOfTheMatch": total.figure_of_the_match,
                        "lastUpdated": now,
                    }),
                )
                .await?;
        }
        Ok(totals.len())
    }

    /// Repair tool: rebuild the three attendance counters from the archive.
    /// Joins archived attendances with their archived event's type; records
    /// whose event is gone, or whose event type never counts, are skipped.
    pub async fn recalculate_attendance(&self, now: DateTime<Utc>) -> Result<usize> {
        let events = self.events.list_archived().await?;
        let type_by_event: HashMap<&str, EventType> = events
            .iter()
            .map(|e| (e.id.as_str(), e.event_type))
            .collect();

        #[derive(Default)]
        struct Counts {
            matches: u32,
            trainings: u32,
            display_name: String,
        }

        let mut per_user: HashMap<String, Counts> = HashMap::new();
        for attendance in self.attendance.list_archived().await? {
            let Some(event_type) = type_by_event.get(attendance.event_id.as_str()) else {
                continue;
            };
            if !event_type.counts_for_stats() {
                continue;
            }
            let entry = per_user.entry(attendance.user_id.clone()).or_default();
            entry.display_name = attendance.user_display_name.clone();
            if attendance.attended() {
                match event_type {
                    EventType::Match => entry.matches += 1,
                    EventType::Training => entry.trainings += 1,
                    _ => {}
                }
            }
        }

        for (user_id, counts) in &per_user {
            self.stats
                .merge_fields(
                    user_id,
                    json!({
                        "userId": user_id,
                        "displayName": counts.display_name,
                        "matchesAttended": counts.matches,
                        "trainingsAttended": counts.trainings,
                        "totalAttended": counts.matches + counts.trainings,
                        "lastUpdated": now,
                    }),
                )
                .await?;
        }
        Ok(per_user.len())
    }

    pub async fn all_stats(&self) -> Result<Vec<PlayerStats>> {
        self.stats.list().await
    }
}
