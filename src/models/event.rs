use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Hours past an event's start during which it still counts as live.
pub const ARCHIVE_GRACE_HOURS: i64 = 1;
/// Events further out than this many days are hidden from the upcoming view.
pub const UPCOMING_WINDOW_DAYS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Training,
    Match,
    Birthday,
    Custom,
}

impl EventType {
    /// Only matches and trainings feed player statistics.
    pub fn counts_for_stats(self) -> bool {
        matches!(self, EventType::Match | EventType::Training)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringType {
    Weekly,
    Biweekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_type: Option<RecurringType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rival_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rival_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_friendly: Option<bool>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn end(&self) -> DateTime<Utc> {
        self.date + Duration::hours(ARCHIVE_GRACE_HOURS)
    }

    /// An event becomes archivable strictly after its end.
    pub fn is_archivable(&self, now: DateTime<Utc>) -> bool {
        now > self.end()
    }

    /// Whether the event belongs in the upcoming view at `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        !self.is_archivable(now) && self.date <= now + Duration::days(UPCOMING_WINDOW_DAYS)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_type: Option<RecurringType>,
    #[serde(default)]
    pub recurring_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rival_id: Option<String>,
    #[serde(default)]
    pub rival_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_at(date: DateTime<Utc>) -> Event {
        Event {
            id: "e1".into(),
            event_type: EventType::Training,
            date,
            title: "Tuesday training".into(),
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
            archived_at: None,
        }
    }

    #[test]
    fn archivable_boundary_is_strict() {
        let now = Utc::now();
        let event = event_at(now - Duration::hours(1));
        // Exactly at date + 1h: still live.
        assert!(!event.is_archivable(now));
        assert!(event.is_archivable(now + Duration::seconds(1)));
    }

    #[test]
    fn far_future_events_are_not_upcoming() {
        let now = Utc::now();
        let event = event_at(now + Duration::days(11));
        assert!(!event.is_upcoming(now));
        assert!(!event.is_archivable(now));

        let near = event_at(now + Duration::days(9));
        assert!(near.is_upcoming(now));
    }
}
