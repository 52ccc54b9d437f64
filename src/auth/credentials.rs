use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::AdminConfig;
use crate::error::AppError;

/// Admin credentials, constructed once at startup from configuration and
/// handed to Rocket as managed state. The password is held only as a
/// bcrypt hash; changing it swaps the hash behind the lock.
pub struct CredentialStore {
    username: String,
    password_hash: RwLock<String>,
}

impl CredentialStore {
    pub fn from_config(config: &AdminConfig) -> Result<Self, AppError> {
        let password_hash = bcrypt::hash(&config.password, bcrypt::DEFAULT_COST)?;

        Ok(Self {
            username: config.username.clone(),
            password_hash: RwLock::new(password_hash),
        })
    }

    #[instrument(skip(self, password))]
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if username != self.username {
            return Ok(false);
        }

        let hash = self.password_hash.read().await;
        match bcrypt::verify(password, &hash) {
            Ok(valid) => Ok(valid),
            Err(_) => Ok(false),
        }
    }

    /// Replaces the stored hash after verifying the current password.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if !self.verify(username, current_password).await? {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;
        *self.password_hash.write().await = new_hash;

        info!("Admin password changed");
        Ok(())
    }
}
