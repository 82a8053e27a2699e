use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synthetic scorer id for guest players in friendly matches. Guests never
/// accrue statistics.
pub const GUEST_PLAYER_ID: &str = "INVITADO";

/// Scores are clamped into this range before validation.
pub const MAX_GOALS: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Yellow,
    Red,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchGoal {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_player_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCard {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub card_type: CardType,
    pub created_at: DateTime<Utc>,
}

/// Result of an archived match, keyed by the originating event's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: String,
    pub rival_id: String,
    pub rival_name: String,
    pub furia_goals: u32,
    pub rival_goals: u32,
    #[serde(default)]
    pub goals: Vec<MatchGoal>,
    #[serde(default)]
    pub cards: Vec<MatchCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figure_of_the_match_id: Option<String>,
    #[serde(default)]
    pub is_friendly: bool,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGoal {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub assist_player_id: Option<String>,
    #[serde(default)]
    pub assist_player_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCard {
    pub player_id: String,
    pub player_name: String,
    pub card_type: CardType,
}

/// Candidate result submitted by an admin for one archived match.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMatchResult {
    pub rival_id: String,
    pub rival_name: String,
    pub furia_goals: u32,
    pub rival_goals: u32,
    #[serde(default)]
    pub goals: Vec<SaveGoal>,
    #[serde(default)]
    pub cards: Vec<SaveCard>,
    #[serde(default)]
    pub figure_of_the_match_id: Option<String>,
    #[serde(default)]
    pub is_friendly: bool,
}
