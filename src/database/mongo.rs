use async_trait::async_trait;
use bson::{doc, Bson};
use futures::stream::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::{ReplaceOptions, UpdateOptions};
use mongodb::{Client, Database};
use serde_json::Value;
use uuid::Uuid;

use super::store::{BatchOp, Document, DocumentStore, StoreError, WriteBatch};

/// Document store backed by MongoDB. Documents are stored with the
/// application key as `_id`; batches run inside one multi-document
/// transaction so they land together or not at all.
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self { client, db }
    }

    fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.db.collection::<bson::Document>(name)
    }
}

fn map_error(err: mongodb::error::Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Authentication { message, .. } => StoreError::PermissionDenied(message.clone()),
        ErrorKind::Command(command) if command.code == 13 => {
            StoreError::PermissionDenied(command.message.clone())
        }
        ErrorKind::ServerSelection { message, .. } => StoreError::Unavailable(message.clone()),
        ErrorKind::Io(io) => StoreError::Unavailable(io.to_string()),
        ErrorKind::ConnectionPoolCleared { message, .. } => StoreError::Unavailable(message.clone()),
        _ => StoreError::Unknown(err.to_string()),
    }
}

/// Field document for `$set` updates; must not carry `_id`, which MongoDB
/// treats as immutable.
fn to_bson_fields(collection: &str, id: &str, data: &Value) -> Result<bson::Document, StoreError> {
    let mut doc = bson::to_document(data).map_err(|e| StoreError::Malformed {
        collection: collection.to_string(),
        id: id.to_string(),
        reason: e.to_string(),
    })?;
    doc.remove("_id");
    Ok(doc)
}

/// Full document for inserts and replacements, keyed by `_id`.
fn to_bson_document(collection: &str, id: &str, data: &Value) -> Result<bson::Document, StoreError> {
    let mut doc = to_bson_fields(collection, id, data)?;
    doc.insert("_id", id);
    Ok(doc)
}

fn from_bson_document(collection: &str, mut doc: bson::Document) -> Result<Document, StoreError> {
    let id = match doc.remove("_id") {
        Some(Bson::String(id)) => id,
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let data = bson::from_document::<Value>(doc).map_err(|e| StoreError::Malformed {
        collection: collection.to_string(),
        id: id.clone(),
        reason: e.to_string(),
    })?;
    Ok(Document { id, data })
}

fn to_bson_value(value: &Value) -> Result<Bson, StoreError> {
    bson::to_bson(value).map_err(|e| StoreError::Unknown(e.to_string()))
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn get_all(&self, collection: &'static str) -> Result<Vec<Document>, StoreError> {
        let mut cursor = self
            .collection(collection)
            .find(None, None)
            .await
            .map_err(map_error)?;
        let mut documents = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(map_error)? {
            documents.push(from_bson_document(collection, doc)?);
        }
        Ok(documents)
    }

    async fn find_eq(
        &self,
        collection: &'static str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        let mut filter = bson::Document::new();
        filter.insert(field, to_bson_value(&value)?);
        let mut cursor = self
            .collection(collection)
            .find(filter, None)
            .await
            .map_err(map_error)?;
        let mut documents = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(map_error)? {
            documents.push(from_bson_document(collection, doc)?);
        }
        Ok(documents)
    }

    async fn get(&self, collection: &'static str, id: &str) -> Result<Option<Document>, StoreError> {
        let found = self
            .collection(collection)
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(map_error)?;
        found.map(|doc| from_bson_document(collection, doc)).transpose()
    }

    async fn add(&self, collection: &'static str, data: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let doc = to_bson_document(collection, &id, &data)?;
        self.collection(collection)
            .insert_one(doc, None)
            .await
            .map_err(map_error)?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &'static str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        if merge {
            let fields = to_bson_fields(collection, id, &data)?;
            let options = UpdateOptions::builder().upsert(true).build();
            self.collection(collection)
                .update_one(doc! { "_id": id }, doc! { "$set": fields }, options)
                .await
                .map_err(map_error)?;
        } else {
            let doc = to_bson_document(collection, id, &data)?;
            let options = ReplaceOptions::builder().upsert(true).build();
            self.collection(collection)
                .replace_one(doc! { "_id": id }, doc, options)
                .await
                .map_err(map_error)?;
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: &'static str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let fields = to_bson_fields(collection, id, &fields)?;
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields }, None)
            .await
            .map_err(map_error)?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: &'static str, id: &str) -> Result<(), StoreError> {
        self.collection(collection)
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut session = self.client.start_session(None).await.map_err(map_error)?;
        session.start_transaction(None).await.map_err(map_error)?;

        for op in &batch.ops {
            let applied = match op {
                BatchOp::Set { collection, id, data } => {
                    match to_bson_document(collection, id, data) {
                        Ok(doc) => {
                            let options = ReplaceOptions::builder().upsert(true).build();
                            self.collection(collection)
                                .replace_one_with_session(
                                    doc! { "_id": id.as_str() },
                                    doc,
                                    options,
                                    &mut session,
                                )
                                .await
                                .map(|_| ())
                                .map_err(map_error)
                        }
                        Err(e) => Err(e),
                    }
                }
                BatchOp::Update { collection, id, fields } => {
                    match to_bson_fields(collection, id, fields) {
                        Ok(fields) => self
                            .collection(collection)
                            .update_one_with_session(
                                doc! { "_id": id.as_str() },
                                doc! { "$set": fields },
                                None,
                                &mut session,
                            )
                            .await
                            .map(|_| ())
                            .map_err(map_error),
                        Err(e) => Err(e),
                    }
                }
                BatchOp::Delete { collection, id } => self
                    .collection(collection)
                    .delete_one_with_session(doc! { "_id": id.as_str() }, None, &mut session)
                    .await
                    .map(|_| ())
                    .map_err(map_error),
            };

            if let Err(e) = applied {
                let _ = session.abort_transaction().await;
                return Err(e);
            }
        }

        session.commit_transaction().await.map_err(map_error)
    }
}
