pub mod attendance;
pub mod events;
pub mod results;
pub mod rivals;
pub mod stats;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::database::store::{Document, StoreError};

/// Typed read boundary: a stored document that does not match the expected
/// shape is an error, never a silently defaulted record.
pub(crate) fn decode<T: DeserializeOwned>(
    collection: &'static str,
    doc: Document,
) -> Result<T, StoreError> {
    serde_json::from_value(doc.data).map_err(|e| StoreError::Malformed {
        collection: collection.to_string(),
        id: doc.id,
        reason: e.to_string(),
    })
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: &'static str,
    docs: Vec<Document>,
) -> Result<Vec<T>, StoreError> {
    docs.into_iter().map(|doc| decode(collection, doc)).collect()
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Unknown(e.to_string()))
}
