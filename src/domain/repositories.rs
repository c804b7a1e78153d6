//! Repository trait definitions
//!
//! These traits define the contract for catalogue data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::Deserialize;

use super::CirculationError;
use crate::models::book::BookDto;
use crate::models::student::StudentDto;

/// Input for creating a book
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateBookInput {
    /// Generated as `BK` + six digits when omitted
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub category: String,
    pub description: Option<String>,
    /// Defaults to a single copy
    pub total_copies: Option<i32>,
}

/// Input for updating a book
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateBookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub category: Option<String>,
    pub description: Option<Option<String>>,
    /// Shifts `available_copies` by the same amount
    pub total_copies: Option<i32>,
}

/// Input for registering a student
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateStudentInput {
    pub user_id: Option<i32>,
    pub student_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books ordered by title
    async fn find_all(&self) -> Result<Vec<BookDto>, CirculationError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<BookDto>, CirculationError>;

    /// Create a new book with all copies on the shelf
    async fn create(&self, input: CreateBookInput) -> Result<BookDto, CirculationError>;

    /// Update an existing book
    async fn update(&self, id: i32, input: UpdateBookInput) -> Result<BookDto, CirculationError>;

    /// Delete a book and, by cascade, its borrow history
    async fn delete(&self, id: i32) -> Result<(), CirculationError>;
}

/// Repository trait for Student entity
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Register a new student
    async fn create(&self, input: CreateStudentInput) -> Result<StudentDto, CirculationError>;
}
