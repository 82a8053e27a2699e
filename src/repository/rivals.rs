use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::database::store::collections::{FIXTURES, RIVALS};
use crate::database::store::DocumentStore;
use crate::errors::{AppError, Result};
use crate::models::match_result::MatchResult;
use crate::models::rival::{CreateFixture, CreateRival, Fixture, LinkFixtureResult, Rival};
use crate::repository::{decode_all, encode};

pub struct RivalRepository {
    store: Arc<dyn DocumentStore>,
}

impl RivalRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Rival>> {
        let docs = self.store.get_all(RIVALS).await?;
        let mut rivals: Vec<Rival> = decode_all(RIVALS, docs)?;
        rivals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rivals)
    }

    pub async fn create(&self, payload: CreateRival, now: DateTime<Utc>) -> Result<Rival> {
        if payload.name.trim().is_empty() {
            return Err(AppError::Validation("rival name is required".into()));
        }
        let rival = Rival {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            field: payload.field,
            created_at: now,
        };
        self.store
            .set(RIVALS, &rival.id, encode(&rival)?, false)
            .await?;
        Ok(rival)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(RIVALS, id).await?;
        Ok(())
    }

    pub async fn list_fixtures(&self) -> Result<Vec<Fixture>> {
        let docs = self.store.get_all(FIXTURES).await?;
        let mut fixtures: Vec<Fixture> = decode_all(FIXTURES, docs)?;
        fixtures.sort_by_key(|f| f.date);
        Ok(fixtures)
    }

    pub async fn create_fixture(
        &self,
        payload: CreateFixture,
        now: DateTime<Utc>,
    ) -> Result<Fixture> {
        let fixture = Fixture {
            id: Uuid::new_v4().to_string(),
            rival_id: payload.rival_id,
            rival_name: payload.rival_name,
            date: payload.date,
            location: payload.location,
            competition: payload.competition,
            match_result_id: None,
            furia_goals: None,
            rival_goals: None,
            created_at: now,
        };
        self.store
            .set(FIXTURES, &fixture.id, encode(&fixture)?, false)
            .await?;
        Ok(fixture)
    }

    /// Link a fixture to a played match's result, copying the score as it
    /// stands now. Later edits of the result do not flow back.
    pub async fn link_result(
        &self,
        fixture_id: &str,
        link: &LinkFixtureResult,
        result: &MatchResult,
    ) -> Result<()> {
        let fields = json!({
            "matchResultId": link.match_result_id,
            "furiaGoals": result.furia_goals,
            "rivalGoals": result.rival_goals,
        });
        self.store.update(FIXTURES, fixture_id, fields).await?;
        Ok(())
    }
}
