use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opponent reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rival {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRival {
    pub name: String,
    #[serde(default)]
    pub field: Option<String>,
}

/// Scheduled tournament date. May link to a played match's result, copying
/// the score at link time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rival_id: Option<String>,
    pub rival_name: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_result_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furia_goals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rival_goals: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFixture {
    #[serde(default)]
    pub rival_id: Option<String>,
    pub rival_name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub competition: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFixtureResult {
    pub match_result_id: String,
}
