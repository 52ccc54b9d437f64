use rocket::http::ContentType;
use rocket::local::asynchronous::Client;
use serde_json::json;
use tempfile::TempDir;

use crate::config::{AdminConfig, AppConfig, SftpConfig};
use crate::error::AppError;
use crate::models::{ClassRecord, UserRecord};
use crate::records::{NewClass, NewUser, add_student_to_class, create_class, create_user};
use crate::store::Store;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password123";

/// A store rooted in a scratch directory. The directory lives as long
/// as this value.
pub struct TestStore {
    pub store: Store,
    _tmp: TempDir,
}

pub fn empty_store() -> TestStore {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    TestStore {
        store: Store::new(tmp.path()),
        _tmp: tmp,
    }
}

/// Seeds records through the same create paths production uses.
#[derive(Default)]
pub struct TestStoreBuilder {
    users: Vec<NewUser>,
    classes: Vec<NewClass>,
    enrollments: Vec<(String, String)>,
}

impl TestStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, student_id: &str, first_name: &str, last_name: &str) -> Self {
        self.users.push(NewUser {
            student_id: student_id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: Some(format!("{}@example.edu", student_id.to_lowercase())),
            grade: Some("9".to_string()),
            status: None,
        });
        self
    }

    pub fn class(mut self, course_code: &str, name: &str, room: Option<&str>) -> Self {
        self.classes.push(NewClass {
            name: name.to_string(),
            course_code: course_code.to_string(),
            description: None,
            instructor: Some("teacher@example.edu".to_string()),
            schedule: Some("Period 2".to_string()),
            room: room.map(String::from),
            capacity: None,
            status: None,
        });
        self
    }

    /// Enrolls by course code; the class must have been added first.
    pub fn enrollment(mut self, course_code: &str, student_id: &str) -> Self {
        self.enrollments
            .push((course_code.to_string(), student_id.to_string()));
        self
    }

    pub async fn build(self) -> Result<SeededStore, AppError> {
        let test_store = empty_store();
        let store = test_store.store.clone();

        let mut users = Vec::new();
        for new_user in self.users {
            users.push(create_user(&store, new_user).await?);
        }

        let mut classes = Vec::new();
        for new_class in self.classes {
            classes.push(create_class(&store, new_class).await?);
        }

        for (course_code, student_id) in self.enrollments {
            let class = classes
                .iter()
                .find(|class| class.course_code == course_code)
                .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;
            add_student_to_class(&store, &class.id, &student_id).await?;
        }

        Ok(SeededStore {
            inner: test_store,
            users,
            classes,
        })
    }
}

pub struct SeededStore {
    inner: TestStore,
    pub users: Vec<UserRecord>,
    pub classes: Vec<ClassRecord>,
}

impl SeededStore {
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn class_id(&self, course_code: &str) -> Option<&str> {
        self.classes
            .iter()
            .find(|class| class.course_code == course_code)
            .map(|class| class.id.as_str())
    }
}

pub fn test_config(data_dir: &std::path::Path) -> AppConfig {
    AppConfig {
        data_dir: data_dir.to_path_buf(),
        sftp: SftpConfig {
            host: "127.0.0.1".to_string(),
            port: 2222,
            username: "clever".to_string(),
            password: "clever".to_string(),
        },
        admin: AdminConfig {
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    }
}

/// Tracked client so the session cookie set at login rides along on
/// subsequent requests. The caller keeps the backing `TestStore` (or
/// `SeededStore`) alive for the duration of the client.
pub async fn setup_test_client(store: &Store) -> Client {
    let config = test_config(store.data_dir());

    let rocket = crate::init_rocket(&config).expect("Failed to build test rocket");

    Client::tracked(rocket)
        .await
        .expect("Failed to build test client")
}

pub async fn login_admin(client: &Client) {
    let response = client
        .post("/api/auth/login")
        .header(ContentType::JSON)
        .body(
            json!({
                "username": ADMIN_USERNAME,
                "password": ADMIN_PASSWORD,
            })
            .to_string(),
        )
        .dispatch()
        .await;

    assert_eq!(response.status(), rocket::http::Status::Ok);
}
