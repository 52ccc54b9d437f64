use std::path::Path;

use tracing::{debug, info};

/// Loads `.env` then `.secrets.env`, later files overriding earlier ones.
/// Missing files are skipped; deployments may provide plain process env.
pub fn load_environment() -> Result<(), Box<dyn std::error::Error>> {
    for env_file in [".env", ".secrets.env"] {
        if !Path::new(env_file).exists() {
            debug!("Environment file {} not found, skipping", env_file);
            continue;
        }

        dotenvy::from_filename_override(env_file)?;
        info!("Loaded environment from: {}", env_file);
    }

    Ok(())
}
