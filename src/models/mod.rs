pub mod book;
pub mod borrow_record;
pub mod fine;
pub mod student;

pub use book::Entity as Book;
pub use borrow_record::{BorrowStatus, Entity as BorrowRecord};
pub use fine::{Entity as Fine, FineStatus};
pub use student::Entity as Student;
