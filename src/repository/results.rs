use std::sync::Arc;

use crate::database::store::collections::MATCH_RESULTS;
use crate::database::store::DocumentStore;
use crate::errors::Result;
use crate::models::match_result::MatchResult;
use crate::repository::{decode, decode_all, encode};

pub struct ResultRepository {
    store: Arc<dyn DocumentStore>,
}

impl ResultRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<MatchResult>> {
        let docs = self.store.get_all(MATCH_RESULTS).await?;
        Ok(decode_all(MATCH_RESULTS, docs)?)
    }

    /// Results are keyed by the originating event's id.
    pub async fn get(&self, event_id: &str) -> Result<Option<MatchResult>> {
        match self.store.get(MATCH_RESULTS, event_id).await? {
            Some(doc) => Ok(Some(decode(MATCH_RESULTS, doc)?)),
            None => Ok(None),
        }
    }

    pub async fn upsert(&self, result: &MatchResult) -> Result<()> {
        self.store
            .set(MATCH_RESULTS, &result.id, encode(result)?, false)
            .await?;
        Ok(())
    }
}
