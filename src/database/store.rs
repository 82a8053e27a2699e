use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Collection names used across the application.
pub mod collections {
    pub const EVENTS: &str = "events";
    pub const EVENTS_ARCHIVE: &str = "events_archive";
    pub const ATTENDANCES: &str = "attendances";
    pub const ATTENDANCES_ARCHIVE: &str = "attendances_archive";
    pub const RIVALS: &str = "rivals";
    pub const FIXTURES: &str = "fixtures";
    pub const MATCH_RESULTS: &str = "match_results";
    pub const STATS: &str = "stats";
    pub const USERS: &str = "users";
}

/// Closed error taxonomy produced at the storage boundary. Everything the
/// backing client can throw is folded into one of these kinds before it
/// reaches application code.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("malformed document in {collection}/{id}: {reason}")]
    Malformed {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("store error: {0}")]
    Unknown(String),
}

/// A raw document: its key plus the stored JSON object.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// One mutation inside an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOp {
    Set {
        collection: &'static str,
        id: String,
        data: Value,
    },
    Update {
        collection: &'static str,
        id: String,
        fields: Value,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

/// An ordered set of mutations applied together or not at all. Atomicity
/// holds within one batch only; sequences of batches are not transactional.
#[derive(Debug, Default)]
pub struct WriteBatch {
    pub ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &'static str, id: impl Into<String>, data: Value) {
        self.ops.push(BatchOp::Set {
            collection,
            id: id.into(),
            data,
        });
    }

    pub fn update(&mut self, collection: &'static str, id: impl Into<String>, fields: Value) {
        self.ops.push(BatchOp::Update {
            collection,
            id: id.into(),
            fields,
        });
    }

    pub fn delete(&mut self, collection: &'static str, id: impl Into<String>) {
        self.ops.push(BatchOp::Delete {
            collection,
            id: id.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// The document database seen by the rest of the application: schemaless
/// JSON documents keyed by string id, grouped in named collections, with
/// last-write-wins per document and atomic multi-document batches.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_all(&self, collection: &'static str) -> Result<Vec<Document>, StoreError>;

    /// Equality filter on a single top-level field.
    async fn find_eq(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: &'static str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert with an auto-generated id; returns the id.
    async fn add(&self, collection: &'static str, data: Value) -> Result<String, StoreError>;

    /// Write a document under an explicit id. With `merge` the given
    /// top-level fields are overlaid onto the existing document; without it
    /// the document is replaced (created if absent, in both modes).
    async fn set(
        &self,
        collection: &'static str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Partial update of an existing document; `NotFound` if it is missing.
    async fn update(
        &self,
        collection: &'static str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError>;

    /// Delete by id. Deleting a missing document is not an error.
    async fn delete(&self, collection: &'static str, id: &str) -> Result<(), StoreError>;

    /// Apply a batch atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
