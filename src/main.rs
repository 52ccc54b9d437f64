#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod config;
mod env;
mod error;
mod models;
mod records;
mod store;
mod sync;
mod telemetry;
#[cfg(test)]
mod test;

use api::{
    api_add_enrollment, api_change_password, api_create_class, api_create_user,
    api_dashboard_stats, api_delete_class, api_delete_user, api_get_class,
    api_get_class_enrollments, api_get_classes, api_get_user, api_get_users, api_login,
    api_logout, api_remove_enrollment, api_search_users, api_sync_download, api_sync_history,
    api_sync_status, api_sync_upload, api_test_connection, api_trigger_sync, api_update_class,
    api_update_user, health,
};
use auth::{CredentialStore, SessionStore, unauthorized_api};
use config::AppConfig;
use rocket::{Build, Rocket};
use store::Store;
use sync::SyncService;
use telemetry::{TelemetryFairing, init_tracing};
use tracing::{error, info};

#[launch]
async fn rocket() -> _ {
    init_tracing();

    if let Err(err) = env::load_environment() {
        error!("Failed to load environment files: {}", err);
    }

    let config = AppConfig::from_env().expect("Invalid configuration");

    init_rocket(&config).expect("Failed to construct application state")
}

pub fn init_rocket(config: &AppConfig) -> Result<Rocket<Build>, error::AppError> {
    info!("Starting Clever SIS admin panel");

    let store = Store::new(config.data_dir.clone());
    let sync_service = SyncService::new(store.clone(), config.sftp.clone());
    let credentials = CredentialStore::from_config(&config.admin)?;
    let sessions = SessionStore::new();

    Ok(rocket::build()
        .manage(store)
        .manage(sync_service)
        .manage(credentials)
        .manage(sessions)
        .mount(
            "/api",
            routes![
                api_login,
                api_logout,
                api_change_password,
                api_get_users,
                api_get_user,
                api_create_user,
                api_update_user,
                api_delete_user,
                api_search_users,
                api_get_classes,
                api_get_class,
                api_create_class,
                api_update_class,
                api_delete_class,
                api_get_class_enrollments,
                api_add_enrollment,
                api_remove_enrollment,
                api_sync_status,
                api_sync_history,
                api_trigger_sync,
                api_sync_upload,
                api_sync_download,
                api_test_connection,
                api_dashboard_stats,
                health,
            ],
        )
        .register("/api", catchers![unauthorized_api])
        .attach(TelemetryFairing))
}
