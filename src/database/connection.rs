use std::sync::Arc;

use mongodb::Client;

use super::memory::MemoryStore;
use super::mongo::MongoStore;
use super::store::DocumentStore;

/// Connect to the configured document store. Falls back to the in-memory
/// store when `MONGODB_URI` is not set so the server can run without a
/// database for local experiments.
pub async fn connect() -> Arc<dyn DocumentStore> {
    match std::env::var("MONGODB_URI") {
        Ok(uri) => {
            let db_name =
                std::env::var("MONGODB_DB").unwrap_or_else(|_| "furia".to_string());
            let client = Client::with_uri_str(&uri)
                .await
                .expect("Failed to connect to MongoDB");
            tracing::info!("Connected to MongoDB database '{}'", db_name);
            Arc::new(MongoStore::new(client, &db_name))
        }
        Err(_) => {
            tracing::warn!("MONGODB_URI not set, using volatile in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
