use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::ClassRecord;
use crate::records::{get_all_classes, get_all_users, get_class_enrollments};
use crate::store::Store;

/// The three roster extracts, in the order the remote endpoint expects
/// them. The logical name doubles as the remote file name.
#[derive(Debug, Clone)]
pub struct ExportedCsvs {
    pub students: PathBuf,
    pub sections: PathBuf,
    pub enrollments: PathBuf,
}

impl ExportedCsvs {
    pub fn files(&self) -> [(&'static str, &Path); 3] {
        [
            ("students", &self.students),
            ("sections", &self.sections),
            ("enrollments", &self.enrollments),
        ]
    }
}

/// The section identifier the remote schema keys on: the class's room, or
/// its course code when no room is set.
fn section_id(class: &ClassRecord) -> &str {
    if class.room.is_empty() {
        &class.course_code
    } else {
        &class.room
    }
}

/// Materializes the current store state into the three fixed-schema CSV
/// files, overwriting any previous export. The header names (including
/// `Teacher_email` for the instructor field and `Section_id` for the room)
/// are the remote system's exact expected schema and must not be "fixed".
#[instrument(skip(store))]
pub async fn export(store: &Store, csv_dir: &Path) -> Result<ExportedCsvs, AppError> {
    info!("Generating CSV extracts");
    tokio::fs::create_dir_all(csv_dir).await?;

    let paths = ExportedCsvs {
        students: csv_dir.join("students.csv"),
        sections: csv_dir.join("sections.csv"),
        enrollments: csv_dir.join("enrollments.csv"),
    };

    let users = get_all_users(store).await?;
    let mut writer = csv::Writer::from_path(&paths.students)?;
    writer.write_record([
        "Student_id",
        "First_name",
        "Last_name",
        "Email",
        "Grade",
        "Status",
    ])?;
    for user in &users {
        writer.write_record([
            &user.student_id,
            &user.first_name,
            &user.last_name,
            &user.email,
            &user.grade,
            &user.status,
        ])?;
    }
    writer.flush()?;

    let classes = get_all_classes(store).await?;
    let mut writer = csv::Writer::from_path(&paths.sections)?;
    writer.write_record([
        "Course_number",
        "Course_name",
        "Teacher_email",
        "Period",
        "Section_id",
    ])?;
    for class in &classes {
        writer.write_record([
            &class.course_code,
            &class.name,
            &class.instructor,
            &class.schedule,
            &class.room,
        ])?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(&paths.enrollments)?;
    writer.write_record(["Section_id", "Student_id"])?;
    for class in &classes {
        let enrollments = get_class_enrollments(store, &class.id).await?;
        for enrollment in &enrollments {
            writer.write_record([section_id(class), enrollment.student_id.as_str()])?;
        }
    }
    writer.flush()?;

    info!(
        students = users.len(),
        sections = classes.len(),
        "CSV extracts written"
    );

    Ok(paths)
}
