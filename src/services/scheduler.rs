use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::database::store::DocumentStore;
use crate::services::archival::ArchivalEngine;

const DEFAULT_INTERVAL_SECS: u64 = 900;

/// Periodic archival, so stale events get moved even when nobody opens the
/// events page. The same reconciliation also runs on the read path and on
/// demand; a pass that finds nothing is free.
pub fn spawn_archival_loop(store: Arc<dyn DocumentStore>) {
    let interval_secs = std::env::var("ARCHIVE_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    tokio::spawn(async move {
        let engine = ArchivalEngine::new(store);
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            engine.run(Utc::now()).await;
        }
    });
    tracing::info!("archival scheduler running every {}s", interval_secs);
}
