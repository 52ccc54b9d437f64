use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::Mutex;

/// Session lifetime matches the admin cookie: 24 hours.
const SESSION_HOURS: i64 = 24;
const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// In-memory session tokens for the single-admin panel. Sessions do not
/// survive a restart; expired entries are dropped on lookup.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    pub async fn create(&self, username: &str) -> String {
        self.create_with_expiry(username, Utc::now() + Duration::hours(SESSION_HOURS))
            .await
    }

    /// Every new session sweeps expired entries first, so abandoned
    /// tokens from repeated logins do not accumulate.
    pub async fn create_with_expiry(&self, username: &str, expires_at: DateTime<Utc>) -> String {
        let token = Self::generate_token();
        let session = AdminSession {
            username: username.to_string(),
            expires_at,
        };

        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, existing| existing.is_valid());
        sessions.insert(token.clone(), session);
        token
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn validate(&self, token: &str) -> Option<AdminSession> {
        let mut sessions = self.sessions.lock().await;

        match sessions.get(token) {
            Some(session) if session.is_valid() => Some(session.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub async fn invalidate(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }
}
