use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{ClassRecord, EnrollmentRecord, UserRecord};
use crate::store::{Collection, Store};

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct NewUser {
    #[serde(default)]
    #[validate(length(min = 1, message = "student_id is required"))]
    pub student_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "first_name is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "last_name is required"))]
    pub last_name: String,
    pub email: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

/// Shallow merge: only supplied fields overwrite the stored record.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UserPatch {
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub grade: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct NewClass {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "course_code is required"))]
    pub course_code: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub schedule: Option<String>,
    pub room: Option<String>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub course_code: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub schedule: Option<String>,
    pub room: Option<String>,
    pub capacity: Option<i64>,
    pub status: Option<String>,
}

#[instrument(skip(store))]
pub async fn get_all_users(store: &Store) -> Result<Vec<UserRecord>, AppError> {
    store.load(Collection::Users).await
}

#[instrument(skip(store))]
pub async fn get_user(store: &Store, id: &str) -> Result<UserRecord, AppError> {
    let users: Vec<UserRecord> = store.load(Collection::Users).await?;

    users
        .into_iter()
        .find(|user| user.id == id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[instrument(skip(store))]
pub async fn user_count(store: &Store) -> Result<usize, AppError> {
    let users: Vec<UserRecord> = store.load(Collection::Users).await?;
    Ok(users.len())
}

#[instrument(skip(store, data), fields(student_id = %data.student_id))]
pub async fn create_user(store: &Store, data: NewUser) -> Result<UserRecord, AppError> {
    info!("Creating user");
    data.validate()?;

    let _guard = store.lock(Collection::Users).await;
    let mut users: Vec<UserRecord> = store.load(Collection::Users).await?;

    if users.iter().any(|user| user.student_id == data.student_id) {
        return Err(AppError::Validation(
            "User with this student_id already exists".to_string(),
        ));
    }

    let now = Utc::now();
    let user = UserRecord {
        id: Uuid::new_v4().to_string(),
        student_id: data.student_id,
        first_name: data.first_name,
        last_name: data.last_name,
        email: data.email.unwrap_or_default(),
        grade: data.grade.unwrap_or_default(),
        status: data.status.unwrap_or_else(|| "active".to_string()),
        created_at: now,
        updated_at: now,
    };

    users.push(user.clone());
    store.save(Collection::Users, &users).await?;

    Ok(user)
}

#[instrument(skip(store, patch))]
pub async fn update_user(
    store: &Store,
    id: &str,
    patch: UserPatch,
) -> Result<UserRecord, AppError> {
    info!("Updating user");
    let _guard = store.lock(Collection::Users).await;
    let mut users: Vec<UserRecord> = store.load(Collection::Users).await?;

    let index = users
        .iter()
        .position(|user| user.id == id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Re-check uniqueness when the business key is changing.
    if let Some(student_id) = &patch.student_id {
        if *student_id != users[index].student_id
            && users.iter().any(|user| user.student_id == *student_id)
        {
            return Err(AppError::Validation(
                "User with this student_id already exists".to_string(),
            ));
        }
    }

    let user = &mut users[index];
    if let Some(student_id) = patch.student_id {
        user.student_id = student_id;
    }
    if let Some(first_name) = patch.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(grade) = patch.grade {
        user.grade = grade;
    }
    if let Some(status) = patch.status {
        user.status = status;
    }
    user.updated_at = Utc::now();

    let updated = user.clone();
    store.save(Collection::Users, &users).await?;

    Ok(updated)
}

#[instrument(skip(store))]
pub async fn delete_user(store: &Store, id: &str) -> Result<(), AppError> {
    info!("Deleting user");
    let _guard = store.lock(Collection::Users).await;
    let mut users: Vec<UserRecord> = store.load(Collection::Users).await?;

    let index = users
        .iter()
        .position(|user| user.id == id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    users.remove(index);
    store.save(Collection::Users, &users).await
}

/// Case-insensitive substring match against first name, last name,
/// student id and email.
#[instrument(skip(store))]
pub async fn search_users(store: &Store, query: &str) -> Result<Vec<UserRecord>, AppError> {
    let users: Vec<UserRecord> = store.load(Collection::Users).await?;
    let term = query.to_lowercase();

    Ok(users
        .into_iter()
        .filter(|user| {
            user.first_name.to_lowercase().contains(&term)
                || user.last_name.to_lowercase().contains(&term)
                || user.student_id.to_lowercase().contains(&term)
                || user.email.to_lowercase().contains(&term)
        })
        .collect())
}

#[instrument(skip(store))]
pub async fn get_all_classes(store: &Store) -> Result<Vec<ClassRecord>, AppError> {
    store.load(Collection::Classes).await
}

#[instrument(skip(store))]
pub async fn get_class(store: &Store, id: &str) -> Result<ClassRecord, AppError> {
    let classes: Vec<ClassRecord> = store.load(Collection::Classes).await?;

    classes
        .into_iter()
        .find(|class| class.id == id)
        .ok_or_else(|| AppError::NotFound("Class not found".to_string()))
}

#[instrument(skip(store))]
pub async fn class_count(store: &Store) -> Result<usize, AppError> {
    let classes: Vec<ClassRecord> = store.load(Collection::Classes).await?;
    Ok(classes.len())
}

#[instrument(skip(store, data), fields(course_code = %data.course_code))]
pub async fn create_class(store: &Store, data: NewClass) -> Result<ClassRecord, AppError> {
    info!("Creating class");
    data.validate()?;

    let _guard = store.lock(Collection::Classes).await;
    let mut classes: Vec<ClassRecord> = store.load(Collection::Classes).await?;

    if classes
        .iter()
        .any(|class| class.course_code == data.course_code)
    {
        return Err(AppError::Validation(
            "Class with this course_code already exists".to_string(),
        ));
    }

    let now = Utc::now();
    let class = ClassRecord {
        id: Uuid::new_v4().to_string(),
        name: data.name,
        course_code: data.course_code,
        description: data.description.unwrap_or_default(),
        instructor: data.instructor.unwrap_or_default(),
        schedule: data.schedule.unwrap_or_default(),
        room: data.room.unwrap_or_default(),
        capacity: data.capacity.unwrap_or(30),
        status: data.status.unwrap_or_else(|| "active".to_string()),
        created_at: now,
        updated_at: now,
    };

    classes.push(class.clone());
    store.save(Collection::Classes, &classes).await?;

    Ok(class)
}

#[instrument(skip(store, patch))]
pub async fn update_class(
    store: &Store,
    id: &str,
    patch: ClassPatch,
) -> Result<ClassRecord, AppError> {
    info!("Updating class");
    let _guard = store.lock(Collection::Classes).await;
    let mut classes: Vec<ClassRecord> = store.load(Collection::Classes).await?;

    let index = classes
        .iter()
        .position(|class| class.id == id)
        .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

    if let Some(course_code) = &patch.course_code {
        if *course_code != classes[index].course_code
            && classes.iter().any(|class| class.course_code == *course_code)
        {
            return Err(AppError::Validation(
                "Class with this course_code already exists".to_string(),
            ));
        }
    }

    let class = &mut classes[index];
    if let Some(name) = patch.name {
        class.name = name;
    }
    if let Some(course_code) = patch.course_code {
        class.course_code = course_code;
    }
    if let Some(description) = patch.description {
        class.description = description;
    }
    if let Some(instructor) = patch.instructor {
        class.instructor = instructor;
    }
    if let Some(schedule) = patch.schedule {
        class.schedule = schedule;
    }
    if let Some(room) = patch.room {
        class.room = room;
    }
    if let Some(capacity) = patch.capacity {
        class.capacity = capacity;
    }
    if let Some(status) = patch.status {
        class.status = status;
    }
    class.updated_at = Utc::now();

    let updated = class.clone();
    store.save(Collection::Classes, &classes).await?;

    Ok(updated)
}

/// Deleting a class cascades: every enrollment referencing it goes too.
/// Lock order is classes then enrollments, always.
#[instrument(skip(store))]
pub async fn delete_class(store: &Store, id: &str) -> Result<(), AppError> {
    info!("Deleting class");
    let _classes_guard = store.lock(Collection::Classes).await;
    let mut classes: Vec<ClassRecord> = store.load(Collection::Classes).await?;

    let index = classes
        .iter()
        .position(|class| class.id == id)
        .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

    {
        let _enrollments_guard = store.lock(Collection::Enrollments).await;
        let mut enrollments: Vec<EnrollmentRecord> = store.load(Collection::Enrollments).await?;
        enrollments.retain(|enrollment| enrollment.class_id != id);
        store.save(Collection::Enrollments, &enrollments).await?;
    }

    classes.remove(index);
    store.save(Collection::Classes, &classes).await
}

#[instrument(skip(store))]
pub async fn get_class_enrollments(
    store: &Store,
    class_id: &str,
) -> Result<Vec<EnrollmentRecord>, AppError> {
    let enrollments: Vec<EnrollmentRecord> = store.load(Collection::Enrollments).await?;

    Ok(enrollments
        .into_iter()
        .filter(|enrollment| enrollment.class_id == class_id)
        .collect())
}

#[instrument(skip(store))]
pub async fn add_student_to_class(
    store: &Store,
    class_id: &str,
    student_id: &str,
) -> Result<EnrollmentRecord, AppError> {
    info!("Enrolling student in class");
    let _guard = store.lock(Collection::Enrollments).await;
    let mut enrollments: Vec<EnrollmentRecord> = store.load(Collection::Enrollments).await?;

    if enrollments
        .iter()
        .any(|e| e.class_id == class_id && e.student_id == student_id)
    {
        return Err(AppError::Validation(
            "Student is already enrolled in this class".to_string(),
        ));
    }

    let enrollment = EnrollmentRecord {
        id: Uuid::new_v4().to_string(),
        class_id: class_id.to_string(),
        student_id: student_id.to_string(),
        enrolled_at: Utc::now(),
        status: "active".to_string(),
    };

    enrollments.push(enrollment.clone());
    store.save(Collection::Enrollments, &enrollments).await?;

    Ok(enrollment)
}

#[instrument(skip(store))]
pub async fn remove_student_from_class(
    store: &Store,
    class_id: &str,
    student_id: &str,
) -> Result<(), AppError> {
    info!("Removing student from class");
    let _guard = store.lock(Collection::Enrollments).await;
    let mut enrollments: Vec<EnrollmentRecord> = store.load(Collection::Enrollments).await?;

    let index = enrollments
        .iter()
        .position(|e| e.class_id == class_id && e.student_id == student_id)
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    enrollments.remove(index);
    store.save(Collection::Enrollments, &enrollments).await
}
