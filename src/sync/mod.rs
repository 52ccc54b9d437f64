pub mod export;
pub mod log;
pub mod transfer;

use std::path::PathBuf;

use rocket::tokio::task;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::SftpConfig;
use crate::error::AppError;
use crate::models::{SyncEventType, SyncLogEntry, SyncStatus};
use crate::store::Store;

/// Outcome returned to the caller for a successful sync operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SyncOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl SyncOutcome {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            files: None,
        }
    }

    fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = Some(files);
        self
    }
}

/// Drives the roster sync pipeline: export the store to CSV, move files
/// over SFTP, and record every attempt in the sync log. Always externally
/// triggered; there is no scheduler and no retry loop here.
#[derive(Clone)]
pub struct SyncService {
    store: Store,
    config: SftpConfig,
    csv_dir: PathBuf,
}

impl SyncService {
    pub fn new(store: Store, config: SftpConfig) -> Self {
        let csv_dir = store.csv_dir();
        Self {
            store,
            config,
            csv_dir,
        }
    }

    /// Opens and closes a session without transferring anything.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> Result<SyncOutcome, AppError> {
        let config = self.config.clone();
        let result = task::spawn_blocking(move || transfer::check(&config))
            .await
            .map_err(|err| AppError::Internal(format!("Transfer task panicked: {}", err)))?;

        match result {
            Ok(()) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::ConnectionTest,
                        SyncStatus::Success,
                        "SFTP connection test successful",
                    ),
                )
                .await?;

                Ok(SyncOutcome::new("Connection successful"))
            }
            Err(err) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::ConnectionTest,
                        SyncStatus::Error,
                        format!("SFTP connection failed: {}", err),
                    ),
                )
                .await?;

                Err(AppError::Transfer(format!("Connection failed: {}", err)))
            }
        }
    }

    /// Regenerates the CSV extracts from current store state and pushes
    /// them to the remote root.
    #[instrument(skip(self))]
    pub async fn upload(&self) -> Result<SyncOutcome, AppError> {
        let result = self.export_and_upload().await;

        match result {
            Ok(uploaded) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::Upload,
                        SyncStatus::Success,
                        "Successfully uploaded CSV files to Clever",
                    )
                    .with_uploaded(uploaded.clone()),
                )
                .await?;

                Ok(SyncOutcome::new("Upload successful").with_files(uploaded))
            }
            Err(err) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::Upload,
                        SyncStatus::Error,
                        format!("Upload failed: {}", err),
                    ),
                )
                .await?;

                Err(AppError::Transfer(format!("Upload failed: {}", err)))
            }
        }
    }

    async fn export_and_upload(&self) -> Result<Vec<String>, AppError> {
        let csvs = export::export(&self.store, &self.csv_dir).await?;

        let files: Vec<(String, PathBuf)> = csvs
            .files()
            .iter()
            .map(|(name, path)| (name.to_string(), path.to_path_buf()))
            .collect();

        let config = self.config.clone();
        task::spawn_blocking(move || transfer::upload_files(&config, &files))
            .await
            .map_err(|err| AppError::Internal(format!("Transfer task panicked: {}", err)))?
    }

    /// Fetches every remote CSV without processing its contents.
    #[instrument(skip(self))]
    pub async fn download(&self) -> Result<SyncOutcome, AppError> {
        let config = self.config.clone();
        let csv_dir = self.csv_dir.clone();
        let result = task::spawn_blocking(move || transfer::download_files(&config, &csv_dir))
            .await
            .map_err(|err| AppError::Internal(format!("Transfer task panicked: {}", err)))?;

        match result {
            Ok(downloaded) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::Download,
                        SyncStatus::Success,
                        "Successfully downloaded files from Clever",
                    )
                    .with_downloaded(downloaded.clone()),
                )
                .await?;

                Ok(SyncOutcome::new("Download successful").with_files(downloaded))
            }
            Err(err) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::Download,
                        SyncStatus::Error,
                        format!("Download failed: {}", err),
                    ),
                )
                .await?;

                Err(AppError::Transfer(format!("Download failed: {}", err)))
            }
        }
    }

    /// Full sync: connectivity test, then upload. Download is a separate,
    /// independently triggered path.
    #[instrument(skip(self))]
    pub async fn trigger_sync(&self) -> Result<SyncOutcome, AppError> {
        info!("Starting full sync");
        log::record(
            &self.store,
            SyncLogEntry::new(
                SyncEventType::SyncStart,
                SyncStatus::InProgress,
                "Starting full sync process",
            ),
        )
        .await?;

        let result = async {
            self.test_connection().await?;
            self.upload().await
        }
        .await;

        match result {
            Ok(upload_outcome) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::SyncComplete,
                        SyncStatus::Success,
                        "Full sync completed successfully",
                    )
                    .with_details(serde_json::json!({
                        "message": upload_outcome.message,
                        "files": upload_outcome.files,
                    })),
                )
                .await?;

                Ok(SyncOutcome::new("Sync completed successfully"))
            }
            Err(err) => {
                log::record(
                    &self.store,
                    SyncLogEntry::new(
                        SyncEventType::SyncComplete,
                        SyncStatus::Error,
                        format!("Sync failed: {}", err),
                    ),
                )
                .await?;

                Err(err)
            }
        }
    }

    pub async fn status(&self) -> Result<log::SyncStatusSummary, AppError> {
        log::status(&self.store).await
    }

    pub async fn history(&self) -> Result<Vec<SyncLogEntry>, AppError> {
        log::history(&self.store).await
    }

    pub async fn last_sync_time(
        &self,
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>, AppError> {
        log::last_sync_time(&self.store).await
    }
}
