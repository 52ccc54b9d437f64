#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::models::{SyncEventType, SyncStatus};
    use crate::store::Store;
    use crate::sync::SyncService;
    use crate::test::utils::{TestStoreBuilder, empty_store, test_config};

    /// A service pointed at an endpoint nothing is listening on, so every
    /// transfer attempt fails at connect.
    fn unreachable_sync(store: &Store) -> SyncService {
        let config = test_config(store.data_dir());
        SyncService::new(store.clone(), config.sftp)
    }

    #[rocket::async_test]
    async fn test_connection_failure_is_logged() {
        let test_store = empty_store();
        let sync = unreachable_sync(&test_store.store);

        let err = sync.test_connection().await.unwrap_err();
        match err {
            AppError::Transfer(message) => {
                assert!(message.starts_with("Connection failed:"));
            }
            other => panic!("Expected transfer error, got {:?}", other),
        }

        let entries = sync.history().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, SyncEventType::ConnectionTest);
        assert_eq!(entries[0].status, SyncStatus::Error);
    }

    #[rocket::async_test]
    async fn test_upload_failure_is_logged() {
        let seeded = TestStoreBuilder::new()
            .user("S1", "Ann", "Lee")
            .build()
            .await
            .unwrap();
        let sync = unreachable_sync(seeded.store());

        let err = sync.upload().await.unwrap_err();
        assert!(matches!(err, AppError::Transfer(_)));

        let entries = sync.history().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event_type, SyncEventType::Upload);
        assert_eq!(entries[0].status, SyncStatus::Error);
        assert!(entries[0].message.starts_with("Upload failed:"));

        // The local extracts were written before the push failed.
        assert!(seeded.store().csv_dir().join("students.csv").exists());
    }

    #[rocket::async_test]
    async fn test_failed_sync_records_completion_entry() {
        let test_store = empty_store();
        let sync = unreachable_sync(&test_store.store);

        assert!(sync.trigger_sync().await.is_err());

        // Newest first: the failed run still closes with a sync_complete
        // error entry after the sync_start it opened with.
        let entries = sync.history().await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].event_type, SyncEventType::SyncComplete);
        assert_eq!(entries[0].status, SyncStatus::Error);
        assert!(entries[0].message.starts_with("Sync failed:"));
        assert_eq!(entries[1].event_type, SyncEventType::ConnectionTest);
        assert_eq!(entries[1].status, SyncStatus::Error);
        assert_eq!(entries[2].event_type, SyncEventType::SyncStart);
        assert_eq!(entries[2].status, SyncStatus::InProgress);

        let summary = sync.status().await.unwrap();
        assert_eq!(summary.status, "error");
    }
}
