use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use crate::error::AppError;

/// The collections persisted by the store, one JSON array file each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Classes,
    Enrollments,
    SyncLog,
}

impl Collection {
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Classes => "classes.json",
            Collection::Enrollments => "enrollments.json",
            Collection::SyncLog => "sync_log.json",
        }
    }
}

struct StoreInner {
    data_dir: PathBuf,
    users: Mutex<()>,
    classes: Mutex<()>,
    enrollments: Mutex<()>,
    sync_log: Mutex<()>,
}

/// Flat-file JSON persistence. Every write replaces the whole collection
/// file; there are no partial writes and no transactions. Callers doing a
/// load-mutate-save cycle must hold the collection's lock across the whole
/// cycle, since two unguarded writers would lose updates.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                data_dir: data_dir.into(),
                users: Mutex::new(()),
                classes: Mutex::new(()),
                enrollments: Mutex::new(()),
                sync_log: Mutex::new(()),
            }),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.inner.data_dir.join("csv")
    }

    /// Exclusive access for a read-modify-write cycle on one collection.
    /// When a class deletion touches both classes and enrollments, take the
    /// classes lock first.
    pub async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        match collection {
            Collection::Users => self.inner.users.lock().await,
            Collection::Classes => self.inner.classes.lock().await,
            Collection::Enrollments => self.inner.enrollments.lock().await,
            Collection::SyncLog => self.inner.sync_log.lock().await,
        }
    }

    fn file_path(&self, collection: Collection) -> PathBuf {
        self.inner.data_dir.join(collection.file_name())
    }

    /// Reads a whole collection. A missing file means "no data yet" and
    /// reads as empty; a file that exists but cannot be parsed is a
    /// distinct storage error, not an empty collection.
    #[instrument(skip(self))]
    pub async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, AppError> {
        let path = self.file_path(collection);

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    err
                )));
            }
        };

        serde_json::from_slice(&raw).map_err(|err| {
            AppError::Storage(format!("Unreadable collection {}: {}", path.display(), err))
        })
    }

    /// Overwrites a whole collection with pretty-printed JSON, creating the
    /// data directory if needed.
    #[instrument(skip(self, records))]
    pub async fn save<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.inner.data_dir).await?;

        let path = self.file_path(collection);
        let raw = serde_json::to_vec_pretty(records)
            .map_err(|err| AppError::Internal(format!("Serialization error: {}", err)))?;

        tokio::fs::write(&path, raw).await.map_err(|err| {
            AppError::Storage(format!("Failed to write {}: {}", path.display(), err))
        })
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("data_dir", &self.inner.data_dir)
            .finish()
    }
}
