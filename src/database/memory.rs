use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{BatchOp, Document, DocumentStore, StoreError, WriteBatch};

/// In-memory document store. Backs the test suite and serves as a fallback
/// when no database is configured. A batch runs under a single write guard,
/// which gives it the same all-or-nothing behavior as the real store.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn merge_fields(target: &mut Value, fields: &Value) {
    if let (Some(target_map), Some(field_map)) = (target.as_object_mut(), fields.as_object()) {
        for (key, value) in field_map {
            target_map.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_all(&self, collection: &'static str) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_eq(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| data.get(field) == Some(&value))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: &'static str, id: &str) -> Result<Option<Document>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).and_then(|docs| {
            docs.get(id).map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            })
        }))
    }

    async fn add(&self, collection: &'static str, data: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn set(
        &self,
        collection: &'static str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();
        if merge {
            if let Some(existing) = docs.get_mut(id) {
                merge_fields(existing, &data);
                return Ok(());
            }
        }
        docs.insert(id.to_string(), data);
        Ok(())
    }

    async fn update(
        &self,
        collection: &'static str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let existing = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_fields(existing, &fields);
        Ok(())
    }

    async fn delete(&self, collection: &'static str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        if let Some(docs) = guard.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;

        // Validate updates up front so a failing op cannot leave the batch
        // half-applied.
        for op in &batch.ops {
            if let BatchOp::Update { collection, id, .. } = op {
                let exists = guard
                    .get(*collection)
                    .is_some_and(|docs| docs.contains_key(id));
                if !exists {
                    return Err(StoreError::NotFound {
                        collection: collection.to_string(),
                        id: id.clone(),
                    });
                }
            }
        }

        for op in batch.ops {
            match op {
                BatchOp::Set { collection, id, data } => {
                    guard
                        .entry(collection.to_string())
                        .or_default()
                        .insert(id, data);
                }
                BatchOp::Update { collection, id, fields } => {
                    if let Some(existing) =
                        guard.get_mut(collection).and_then(|docs| docs.get_mut(&id))
                    {
                        merge_fields(existing, &fields);
                    }
                }
                BatchOp::Delete { collection, id } => {
                    if let Some(docs) = guard.get_mut(collection) {
                        docs.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }
}
