use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::models::SyncLogEntry;
use crate::store::{Collection, Store};

/// Entries beyond this are evicted, oldest first.
const MAX_LOG_ENTRIES: usize = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SyncStatusSummary {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Appends one entry to the sync history, newest first, enforcing the
/// retention cap. Entries are immutable once written.
#[instrument(skip(store, entry), fields(event = ?entry.event_type, status = ?entry.status))]
pub async fn record(store: &Store, entry: SyncLogEntry) -> Result<(), AppError> {
    let _guard = store.lock(Collection::SyncLog).await;
    let mut log: Vec<SyncLogEntry> = store.load(Collection::SyncLog).await?;

    log.insert(0, entry);
    log.truncate(MAX_LOG_ENTRIES);

    store.save(Collection::SyncLog, &log).await
}

#[instrument(skip(store))]
pub async fn status(store: &Store) -> Result<SyncStatusSummary, AppError> {
    let log: Vec<SyncLogEntry> = store.load(Collection::SyncLog).await?;

    match log.first() {
        Some(last) => Ok(SyncStatusSummary {
            status: last.status.as_str().to_string(),
            message: last.message.clone(),
            timestamp: Some(last.timestamp),
        }),
        None => Ok(SyncStatusSummary {
            status: "never".to_string(),
            message: "No sync has been performed yet".to_string(),
            timestamp: None,
        }),
    }
}

/// Full history, most recent first.
#[instrument(skip(store))]
pub async fn history(store: &Store) -> Result<Vec<SyncLogEntry>, AppError> {
    store.load(Collection::SyncLog).await
}

#[instrument(skip(store))]
pub async fn last_sync_time(store: &Store) -> Result<Option<DateTime<Utc>>, AppError> {
    let log: Vec<SyncLogEntry> = store.load(Collection::SyncLog).await?;
    Ok(log.first().map(|entry| entry.timestamp))
}
