//! Domain error types
//!
//! Every rejection a circulation operation can produce. None of them is fatal:
//! they are reported to the caller as a kind plus a readable message.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CirculationError {
    /// No copy of the book is on the shelf
    BookUnavailable,
    /// The student already holds an unreturned copy of this book
    AlreadyBorrowed,
    /// The student must return overdue books before borrowing again
    HasOverdueBooks,
    /// The record or fine is in the wrong status for the requested transition
    InvalidState(String),
    /// The fine has already been paid
    AlreadyPaid,
    /// Unknown book, student, record or fine
    NotFound(&'static str),
    /// The caller's role or identity does not allow the operation
    PermissionDenied(String),
    /// A uniqueness constraint rejected the write (field name)
    DuplicateKey(&'static str),
    /// Malformed input
    Validation(String),
    /// Database/persistence error
    Database(String),
}

impl CirculationError {
    /// Stable machine-readable code for this rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            CirculationError::BookUnavailable => "book_unavailable",
            CirculationError::AlreadyBorrowed => "already_borrowed",
            CirculationError::HasOverdueBooks => "has_overdue_books",
            CirculationError::InvalidState(_) => "invalid_state",
            CirculationError::AlreadyPaid => "already_paid",
            CirculationError::NotFound(_) => "not_found",
            CirculationError::PermissionDenied(_) => "permission_denied",
            CirculationError::DuplicateKey(_) => "duplicate_key",
            CirculationError::Validation(_) => "validation",
            CirculationError::Database(_) => "database",
        }
    }
}

impl fmt::Display for CirculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CirculationError::BookUnavailable => {
                write!(f, "This book is currently not available")
            }
            CirculationError::AlreadyBorrowed => write!(f, "You have already borrowed this book"),
            CirculationError::HasOverdueBooks => write!(
                f,
                "You have overdue books. Please return them before borrowing new books"
            ),
            CirculationError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            CirculationError::AlreadyPaid => write!(f, "Fine has already been paid"),
            CirculationError::NotFound(what) => write!(f, "{} not found", what),
            CirculationError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            CirculationError::DuplicateKey(field) => write!(f, "{} already exists", field),
            CirculationError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CirculationError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for CirculationError {}

// Conversion from SeaORM errors (used in infrastructure and service layers)
impl From<sea_orm::DbErr> for CirculationError {
    fn from(e: sea_orm::DbErr) -> Self {
        CirculationError::Database(e.to_string())
    }
}

/// Message of a UNIQUE constraint failure, if that is what rejected the write.
/// SQLite reports it as `UNIQUE constraint failed: <table>.<column>`.
pub fn unique_violation(e: &sea_orm::DbErr) -> Option<String> {
    match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => Some(msg),
        _ => None,
    }
}
