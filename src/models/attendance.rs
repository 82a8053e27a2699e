use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "attending")]
    Attending,
    #[serde(rename = "not-attending")]
    NotAttending,
    #[serde(rename = "pending")]
    Pending,
    /// Synthetic status for players with no record; computed at read time,
    /// never persisted.
    #[serde(rename = "not-voted")]
    NotVoted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub user_display_name: String,
    /// Legacy flag kept for records written before `status` existed.
    #[serde(default)]
    pub attending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttendanceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub with_car: bool,
    #[serde(default)]
    pub can_give_ride: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Attendance {
    /// Deterministic document id for the one-vote-per-user-per-event rule.
    pub fn doc_id(user_id: &str, event_id: &str) -> String {
        format!("{}_{}", user_id, event_id)
    }

    /// Status with the legacy bool as fallback for pre-status records.
    pub fn effective_status(&self) -> AttendanceStatus {
        self.status.unwrap_or(if self.attending {
            AttendanceStatus::Attending
        } else {
            AttendanceStatus::NotAttending
        })
    }

    pub fn attended(&self) -> bool {
        self.effective_status() == AttendanceStatus::Attending
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub status: AttendanceStatus,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub with_car: bool,
    #[serde(default)]
    pub can_give_ride: bool,
}

/// One roster row for an event: a real vote or the synthetic `not-voted`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub user_id: String,
    pub user_display_name: String,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub with_car: bool,
    pub can_give_ride: bool,
}
