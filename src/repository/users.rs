use std::sync::Arc;

use crate::database::store::collections::USERS;
use crate::database::store::DocumentStore;
use crate::errors::Result;
use crate::models::user::{Role, User};
use crate::repository::decode_all;

pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Team roster: everyone except read-only viewer accounts, which stay
    /// out of rosters and counts entirely.
    pub async fn list_players(&self) -> Result<Vec<User>> {
        let docs = self.store.get_all(USERS).await?;
        let mut users: Vec<User> = decode_all(USERS, docs)?;
        users.retain(|u| u.role != Role::Viewer);
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(users)
    }
}
