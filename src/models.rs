use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student record. `student_id` is the caller-supplied business key and
/// must be unique across the collection; `id` is generated and immutable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A class/section record. `course_code` is the unique business key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub id: String,
    pub name: String,
    pub course_code: String,
    pub description: String,
    pub instructor: String,
    pub schedule: String,
    pub room: String,
    pub capacity: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a class (by internal id) to a student (by business key).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    pub id: String,
    pub class_id: String,
    pub student_id: String,
    pub enrolled_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncEventType {
    ConnectionTest,
    Upload,
    Download,
    SyncStart,
    SyncComplete,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Success,
    Error,
    InProgress,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
            SyncStatus::InProgress => "in_progress",
        }
    }
}

/// One append-only entry in the sync history. Immutable once written;
/// the log keeps the 100 most recent entries, newest first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SyncLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: SyncEventType,
    pub status: SyncStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_uploaded: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_downloaded: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SyncLogEntry {
    pub fn new(event_type: SyncEventType, status: SyncStatus, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis().to_string(),
            timestamp: now,
            event_type,
            status,
            message: message.into(),
            files_uploaded: None,
            files_downloaded: None,
            details: None,
        }
    }

    pub fn with_uploaded(mut self, files: Vec<String>) -> Self {
        self.files_uploaded = Some(files);
        self
    }

    pub fn with_downloaded(mut self, files: Vec<String>) -> Self {
        self.files_downloaded = Some(files);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
