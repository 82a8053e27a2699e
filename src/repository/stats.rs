use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::database::store::collections::STATS;
use crate::database::store::DocumentStore;
use crate::errors::Result;
use crate::models::stats::PlayerStats;
use crate::repository::{decode, decode_all};

pub struct StatsRepository {
    store: Arc<dyn DocumentStore>,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<PlayerStats>> {
        let docs = self.store.get_all(STATS).await?;
        let mut stats: Vec<PlayerStats> = decode_all(STATS, docs)?;
        stats.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(stats)
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<PlayerStats>> {
        match self.store.get(STATS, user_id).await? {
            Some(doc) => Ok(Some(decode(STATS, doc)?)),
            None => Ok(None),
        }
    }

    /// Read a player's document, or a zeroed one if it does not exist yet.
    /// Stats documents are created lazily by the first write that touches
    /// the player.
    pub async fn get_or_empty(
        &self,
        user_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PlayerStats> {
        Ok(self
            .get(user_id)
            .await?
            .unwrap_or_else(|| PlayerStats::empty(user_id, display_name, now)))
    }

    /// Merge a subset of fields into a player's document, creating it if
    /// absent. Callers always include identity fields so lazily created
    /// documents are complete.
    pub async fn merge_fields(&self, user_id: &str, fields: Value) -> Result<()> {
        self.store.set(STATS, user_id, fields, true).await?;
        Ok(())
    }
}
