//! Repository implementations using SeaORM

pub mod book_repository;
pub mod student_repository;

pub use book_repository::SeaOrmBookRepository;
pub use student_repository::SeaOrmStudentRepository;
