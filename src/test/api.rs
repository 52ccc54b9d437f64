#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::{Value, json};

    use crate::api::LoginResponse;
    use crate::models::{ClassRecord, EnrollmentRecord, UserRecord};
    use crate::sync::log::SyncStatusSummary;
    use crate::test::utils::{TestStoreBuilder, empty_store, login_admin, setup_test_client};

    #[rocket::async_test]
    async fn test_login_api() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": "admin",
                    "password": "password123"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let login_response: LoginResponse = serde_json::from_str(&body).unwrap();

        assert!(login_response.success);
        assert_eq!(login_response.username.as_deref(), Some("admin"));

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": "admin",
                    "password": "wrong_password"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let login_response: LoginResponse = serde_json::from_str(&body).unwrap();

        assert!(!login_response.success);
        assert!(login_response.error.is_some());
    }

    #[rocket::async_test]
    async fn test_auth_required_apis() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;

        let endpoints = vec![
            "/api/users",
            "/api/classes",
            "/api/sync/status",
            "/api/dashboard/stats",
        ];

        for endpoint in endpoints {
            let response = client.get(endpoint).dispatch().await;
            assert_eq!(
                response.status(),
                Status::Unauthorized,
                "Endpoint {} did not require authentication",
                endpoint
            );

            let body: Value =
                serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
            assert_eq!(body["error"], "Unauthorized");
        }
    }

    #[rocket::async_test]
    async fn test_user_crud_flow() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;
        login_admin(&client).await;

        let response = client
            .post("/api/users")
            .header(ContentType::JSON)
            .body(
                json!({
                    "student_id": "S1",
                    "first_name": "Ann",
                    "last_name": "Lee"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);
        let created: UserRecord =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(created.status, "active");
        assert!(!created.id.is_empty());

        // Duplicate business key fails without touching the collection.
        let response = client
            .post("/api/users")
            .header(ContentType::JSON)
            .body(
                json!({
                    "student_id": "S1",
                    "first_name": "Bob",
                    "last_name": "Ray"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["error"], "User with this student_id already exists");

        let response = client
            .put(format!("/api/users/{}", created.id))
            .header(ContentType::JSON)
            .body(json!({ "grade": "10" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let updated: UserRecord =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(updated.grade, "10");
        assert_eq!(updated.first_name, "Ann");

        let response = client.get("/api/users/search/ann").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let found: Vec<UserRecord> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(found.len(), 1);

        let response = client
            .delete(format!("/api/users/{}", created.id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/users/{}", created.id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_missing_user_is_404() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;
        login_admin(&client).await;

        let response = client.get("/api/users/no-such-id").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["error"], "User not found");
    }

    #[rocket::async_test]
    async fn test_enrollment_flow_and_cascade() {
        let seeded = TestStoreBuilder::new()
            .user("S1", "Ann", "Lee")
            .class("MATH101", "Algebra", None)
            .build()
            .await
            .unwrap();
        let client = setup_test_client(seeded.store()).await;
        login_admin(&client).await;

        let class_id = seeded.class_id("MATH101").unwrap().to_string();

        let response = client
            .post(format!("/api/classes/{}/enrollments", class_id))
            .header(ContentType::JSON)
            .body(json!({ "student_id": "S1" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);
        let enrollment: EnrollmentRecord =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(enrollment.student_id, "S1");
        assert_eq!(enrollment.status, "active");

        // Enrolling twice is a validation failure.
        let response = client
            .post(format!("/api/classes/{}/enrollments", class_id))
            .header(ContentType::JSON)
            .body(json!({ "student_id": "S1" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        // Deleting the class removes its enrollments with it.
        let response = client
            .delete(format!("/api/classes/{}", class_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/classes/{}/enrollments", class_id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let enrollments: Vec<EnrollmentRecord> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(enrollments.is_empty());
    }

    #[rocket::async_test]
    async fn test_class_create_validation() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;
        login_admin(&client).await;

        let response = client
            .post("/api/classes")
            .header(ContentType::JSON)
            .body(json!({ "name": "Algebra", "course_code": "MATH101" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);
        let created: ClassRecord =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(created.capacity, 30);
        assert_eq!(created.status, "active");

        let response = client
            .post("/api/classes")
            .header(ContentType::JSON)
            .body(json!({ "name": "Algebra II", "course_code": "MATH101" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(body["error"], "Class with this course_code already exists");
    }

    #[rocket::async_test]
    async fn test_sync_status_and_history_endpoints() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;
        login_admin(&client).await;

        let response = client.get("/api/sync/status").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let summary: SyncStatusSummary =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(summary.status, "never");

        let response = client.get("/api/sync/history").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let history: Vec<Value> =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(history.is_empty());
    }

    #[rocket::async_test]
    async fn test_dashboard_stats() {
        let seeded = TestStoreBuilder::new()
            .user("S1", "Ann", "Lee")
            .user("S2", "Bob", "Ray")
            .class("MATH101", "Algebra", None)
            .build()
            .await
            .unwrap();
        let client = setup_test_client(seeded.store()).await;
        login_admin(&client).await;

        let response = client.get("/api/dashboard/stats").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let stats: Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert_eq!(stats["total_users"], 2);
        assert_eq!(stats["total_classes"], 1);
        assert!(stats["last_sync"].is_null());
        assert_eq!(stats["sync_status"]["status"], "never");
    }

    #[rocket::async_test]
    async fn test_change_password_flow() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;
        login_admin(&client).await;

        let response = client
            .post("/api/auth/change-password")
            .header(ContentType::JSON)
            .body(
                json!({
                    "current_password": "wrong",
                    "new_password": "hunter2hunter2"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client
            .post("/api/auth/change-password")
            .header(ContentType::JSON)
            .body(
                json!({
                    "current_password": "password123",
                    "new_password": "hunter2hunter2"
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        // The old password no longer works; the new one does.
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "username": "admin", "password": "password123" }).to_string())
            .dispatch()
            .await;
        let login_response: LoginResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(!login_response.success);

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "username": "admin", "password": "hunter2hunter2" }).to_string())
            .dispatch()
            .await;
        let login_response: LoginResponse =
            serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
        assert!(login_response.success);
    }

    #[rocket::async_test]
    async fn test_logout_invalidates_session() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;
        login_admin(&client).await;

        let response = client.get("/api/users").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.post("/api/auth/logout").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let response = client.get("/api/users").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn test_health() {
        let test_store = empty_store();
        let client = setup_test_client(&test_store.store).await;

        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.unwrap(), "OK");
    }
}
