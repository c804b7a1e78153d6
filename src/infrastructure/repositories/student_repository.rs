//! SeaORM implementation of StudentRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};

use crate::domain::errors::unique_violation;
use crate::domain::{CirculationError, CreateStudentInput, StudentRepository};
use crate::models::student::{ActiveModel, StudentDto};

/// SeaORM-based implementation of StudentRepository
pub struct SeaOrmStudentRepository {
    db: DatabaseConnection,
}

impl SeaOrmStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Name the unique column SQLite complained about.
fn map_write_error(e: DbErr) -> CirculationError {
    match unique_violation(&e) {
        Some(msg) if msg.contains("email") => CirculationError::DuplicateKey("email"),
        Some(msg) if msg.contains("user_id") => CirculationError::DuplicateKey("user_id"),
        Some(_) => CirculationError::DuplicateKey("student_id"),
        None => e.into(),
    }
}

#[async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn create(&self, input: CreateStudentInput) -> Result<StudentDto, CirculationError> {
        if input.student_id.trim().is_empty() || input.name.trim().is_empty() {
            return Err(CirculationError::Validation(
                "Student ID and name are required".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(CirculationError::Validation(format!(
                "Invalid email address '{}'",
                input.email
            )));
        }

        let new_student = ActiveModel {
            user_id: Set(input.user_id),
            student_id: Set(input.student_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let result = new_student
            .insert(&self.db)
            .await
            .map_err(map_write_error)?;
        tracing::info!("Registered student {} ({})", result.id, result.student_id);

        Ok(result.into())
    }
}
