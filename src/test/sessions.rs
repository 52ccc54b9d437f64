#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::auth::session::SessionStore;

    #[rocket::async_test]
    async fn test_create_and_validate_session() {
        let sessions = SessionStore::new();

        let token = sessions.create("admin").await;
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));

        let session = sessions.validate(&token).await.unwrap();
        assert_eq!(session.username, "admin");
    }

    #[rocket::async_test]
    async fn test_expired_session_is_rejected_and_dropped() {
        let sessions = SessionStore::new();

        let token = sessions
            .create_with_expiry("admin", Utc::now() - Duration::minutes(1))
            .await;

        assert!(sessions.validate(&token).await.is_none());
        // The dead token is removed on lookup, not just hidden.
        assert_eq!(sessions.session_count().await, 0);
    }

    #[rocket::async_test]
    async fn test_create_sweeps_expired_sessions() {
        let sessions = SessionStore::new();

        let stale = sessions
            .create_with_expiry("admin", Utc::now() - Duration::minutes(1))
            .await;
        assert_eq!(sessions.session_count().await, 1);

        let fresh = sessions.create("admin").await;

        // The new login evicted the stale token; only the live one remains.
        assert_eq!(sessions.session_count().await, 1);
        assert!(sessions.validate(&fresh).await.is_some());
        assert!(sessions.validate(&stale).await.is_none());
    }

    #[rocket::async_test]
    async fn test_invalidate_session() {
        let sessions = SessionStore::new();

        let token = sessions.create("admin").await;
        assert!(sessions.validate(&token).await.is_some());

        sessions.invalidate(&token).await;
        assert!(sessions.validate(&token).await.is_none());
    }
}
