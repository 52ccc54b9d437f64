use chrono::{DateTime, Utc};
use rocket::State;
use rocket::http::{Cookie, SameSite};
use rocket::response::status;
use rocket::serde::{Deserialize, Serialize, json::Json};
use serde_json::{Value, json};
use validator::Validate;

use crate::auth::{AdminUser, CredentialStore, SESSION_COOKIE, SessionStore};
use crate::error::AppError;
use crate::models::{ClassRecord, EnrollmentRecord, SyncLogEntry, UserRecord};
use crate::records::{
    ClassPatch, NewClass, NewUser, UserPatch, add_student_to_class, class_count, create_class,
    create_user, delete_class, delete_user, get_all_classes, get_all_users, get_class,
    get_class_enrollments, get_user, remove_student_from_class, search_users, update_class,
    update_user, user_count,
};
use crate::store::Store;
use crate::sync::log::SyncStatusSummary;
use crate::sync::{SyncOutcome, SyncService};

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub username: Option<String>,
    pub error: Option<String>,
}

#[post("/auth/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    cookies: &rocket::http::CookieJar<'_>,
    credentials: &State<CredentialStore>,
    sessions: &State<SessionStore>,
) -> Result<Json<LoginResponse>, AppError> {
    if credentials.verify(&login.username, &login.password).await? {
        let token = sessions.create(&login.username).await;

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(rocket::time::Duration::hours(24));
        cookies.add_private(cookie);

        cookies.add_private(
            Cookie::build(("logged_in", login.username.clone()))
                .same_site(SameSite::Lax)
                .max_age(rocket::time::Duration::hours(24)),
        );

        Ok(Json(LoginResponse {
            success: true,
            username: Some(login.username.clone()),
            error: None,
        }))
    } else {
        Ok(Json(LoginResponse {
            success: false,
            username: None,
            error: Some("Invalid username or password".to_string()),
        }))
    }
}

#[post("/auth/logout")]
pub async fn api_logout(
    cookies: &rocket::http::CookieJar<'_>,
    sessions: &State<SessionStore>,
) -> Json<Value> {
    let token = cookies
        .get_private(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    if let Some(token) = token {
        sessions.invalidate(&token).await;
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE));
    cookies.remove_private(Cookie::build("logged_in"));

    Json(json!({ "success": true, "message": "Logged out" }))
}

#[derive(Deserialize, Validate)]
pub struct PasswordChangeRequest {
    #[validate(length(min = 1, message = "current_password is required"))]
    current_password: String,
    #[validate(length(min = 1, message = "new_password is required"))]
    new_password: String,
}

#[post("/auth/change-password", data = "<password>")]
pub async fn api_change_password(
    password: Json<PasswordChangeRequest>,
    user: AdminUser,
    credentials: &State<CredentialStore>,
) -> Result<Json<Value>, AppError> {
    password.validate()?;

    credentials
        .change_password(
            &user.username,
            &password.current_password,
            &password.new_password,
        )
        .await?;

    Ok(Json(
        json!({ "success": true, "message": "Password changed successfully" }),
    ))
}

#[get("/users")]
pub async fn api_get_users(
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    let users = get_all_users(store).await?;
    Ok(Json(users))
}

#[get("/users/<id>")]
pub async fn api_get_user(
    id: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<UserRecord>, AppError> {
    let user = get_user(store, id).await?;
    Ok(Json(user))
}

#[post("/users", data = "<new_user>")]
pub async fn api_create_user(
    new_user: Json<NewUser>,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<status::Created<Json<UserRecord>>, AppError> {
    let created = create_user(store, new_user.into_inner()).await?;
    let location = format!("/api/users/{}", created.id);
    Ok(status::Created::new(location).body(Json(created)))
}

#[put("/users/<id>", data = "<patch>")]
pub async fn api_update_user(
    id: &str,
    patch: Json<UserPatch>,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<UserRecord>, AppError> {
    let updated = update_user(store, id, patch.into_inner()).await?;
    Ok(Json(updated))
}

#[delete("/users/<id>")]
pub async fn api_delete_user(
    id: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Value>, AppError> {
    delete_user(store, id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

#[get("/users/search/<query>")]
pub async fn api_search_users(
    query: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Vec<UserRecord>>, AppError> {
    let users = search_users(store, query).await?;
    Ok(Json(users))
}

#[get("/classes")]
pub async fn api_get_classes(
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Vec<ClassRecord>>, AppError> {
    let classes = get_all_classes(store).await?;
    Ok(Json(classes))
}

#[get("/classes/<id>")]
pub async fn api_get_class(
    id: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<ClassRecord>, AppError> {
    let class = get_class(store, id).await?;
    Ok(Json(class))
}

#[post("/classes", data = "<new_class>")]
pub async fn api_create_class(
    new_class: Json<NewClass>,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<status::Created<Json<ClassRecord>>, AppError> {
    let created = create_class(store, new_class.into_inner()).await?;
    let location = format!("/api/classes/{}", created.id);
    Ok(status::Created::new(location).body(Json(created)))
}

#[put("/classes/<id>", data = "<patch>")]
pub async fn api_update_class(
    id: &str,
    patch: Json<ClassPatch>,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<ClassRecord>, AppError> {
    let updated = update_class(store, id, patch.into_inner()).await?;
    Ok(Json(updated))
}

#[delete("/classes/<id>")]
pub async fn api_delete_class(
    id: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Value>, AppError> {
    delete_class(store, id).await?;
    Ok(Json(json!({ "message": "Class deleted successfully" })))
}

#[get("/classes/<id>/enrollments")]
pub async fn api_get_class_enrollments(
    id: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Vec<EnrollmentRecord>>, AppError> {
    let enrollments = get_class_enrollments(store, id).await?;
    Ok(Json(enrollments))
}

#[derive(Deserialize, Validate)]
pub struct EnrollRequest {
    #[serde(alias = "studentId")]
    #[validate(length(min = 1, message = "student_id is required"))]
    student_id: String,
}

#[post("/classes/<id>/enrollments", data = "<request>")]
pub async fn api_add_enrollment(
    id: &str,
    request: Json<EnrollRequest>,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<status::Created<Json<EnrollmentRecord>>, AppError> {
    request.validate()?;

    let enrollment = add_student_to_class(store, id, &request.student_id).await?;
    let location = format!("/api/classes/{}/enrollments", id);
    Ok(status::Created::new(location).body(Json(enrollment)))
}

#[delete("/classes/<id>/enrollments/<student_id>")]
pub async fn api_remove_enrollment(
    id: &str,
    student_id: &str,
    _user: AdminUser,
    store: &State<Store>,
) -> Result<Json<Value>, AppError> {
    remove_student_from_class(store, id, student_id).await?;
    Ok(Json(
        json!({ "message": "Student removed from class successfully" }),
    ))
}

#[get("/sync/status")]
pub async fn api_sync_status(
    _user: AdminUser,
    sync: &State<SyncService>,
) -> Result<Json<SyncStatusSummary>, AppError> {
    let status = sync.status().await?;
    Ok(Json(status))
}

#[get("/sync/history")]
pub async fn api_sync_history(
    _user: AdminUser,
    sync: &State<SyncService>,
) -> Result<Json<Vec<SyncLogEntry>>, AppError> {
    let history = sync.history().await?;
    Ok(Json(history))
}

#[post("/sync/trigger")]
pub async fn api_trigger_sync(
    _user: AdminUser,
    sync: &State<SyncService>,
) -> Result<Json<SyncOutcome>, AppError> {
    let outcome = sync.trigger_sync().await?;
    Ok(Json(outcome))
}

#[post("/sync/upload")]
pub async fn api_sync_upload(
    _user: AdminUser,
    sync: &State<SyncService>,
) -> Result<Json<SyncOutcome>, AppError> {
    let outcome = sync.upload().await?;
    Ok(Json(outcome))
}

#[post("/sync/download")]
pub async fn api_sync_download(
    _user: AdminUser,
    sync: &State<SyncService>,
) -> Result<Json<SyncOutcome>, AppError> {
    let outcome = sync.download().await?;
    Ok(Json(outcome))
}

#[get("/sync/test-connection")]
pub async fn api_test_connection(
    _user: AdminUser,
    sync: &State<SyncService>,
) -> Result<Json<SyncOutcome>, AppError> {
    let outcome = sync.test_connection().await?;
    Ok(Json(outcome))
}

#[derive(Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_classes: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_status: SyncStatusSummary,
}

#[get("/dashboard/stats")]
pub async fn api_dashboard_stats(
    _user: AdminUser,
    store: &State<Store>,
    sync: &State<SyncService>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(DashboardStats {
        total_users: user_count(store).await?,
        total_classes: class_count(store).await?,
        last_sync: sync.last_sync_time().await?,
        sync_status: sync.status().await?,
    }))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
