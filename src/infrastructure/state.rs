//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, StudentRepository};
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmStudentRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection, used directly by the circulation services
    db: DatabaseConnection,
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Student repository
    pub student_repo: Arc<dyn StudentRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let student_repo = Arc::new(SeaOrmStudentRepository::new(db.clone()));

        Self {
            db,
            book_repo,
            student_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
