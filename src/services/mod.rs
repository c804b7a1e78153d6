//! Services Layer
//!
//! Circulation rules applied against the database. Every operation takes the
//! caller and the current instant explicitly; handlers and tests call them the same way.

pub mod circulation_service;
pub mod fine_service;
pub mod report_service;
pub mod sweep_service;

// Re-export for convenience
pub use circulation_service::{
    BorrowRequest, ReturnOutcome, VerifyReturnRequest, borrow_book, reject_return,
    request_return, verify_return,
};
pub use fine_service::{FineWithDetails, list_fines, mark_fine_paid, pending_fine_total, settle_fine};
pub use report_service::{
    Overview, PendingFineAmount, RecordFilter, RecordWithDetails, StudentDashboard,
    StudentDetail, StudentSummary, list_records, overview, student_dashboard, student_detail,
    student_pending_fines, student_summaries,
};
pub use sweep_service::{run_sweeper, sweep_overdue, sweep_overdue_as};
