use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-player aggregate document, keyed by the player's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub matches_attended: u32,
    #[serde(default)]
    pub trainings_attended: u32,
    #[serde(default)]
    pub total_attended: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    #[serde(default)]
    pub red_cards: u32,
    #[serde(default)]
    pub figure_of_the_match: u32,
    pub last_updated: DateTime<Utc>,
}

impl PlayerStats {
    pub fn empty(user_id: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            matches_attended: 0,
            trainings_attended: 0,
            total_attended: 0,
            goals: 0,
            assists: 0,
            yellow_cards: 0,
            red_cards: 0,
            figure_of_the_match: 0,
            last_updated: now,
        }
    }

    /// `totalAttended` is always the sum of the two counters, never tracked
    /// independently.
    pub fn recompute_total(&mut self) {
        self.total_attended = self.matches_attended + self.trainings_attended;
    }
}
