use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::books::list_books,
        api::books::create_book,
        api::books::get_book,
        api::books::update_book,
        api::books::delete_book,
        api::borrows::borrow_book,
        api::borrows::list_borrows,
        api::borrows::request_return,
        api::borrows::verify_return,
        api::borrows::reject_return,
        api::borrows::settle_fine,
        api::students::list_students,
        api::students::create_student,
        api::students::get_student,
        api::students::pending_fines,
        api::fines::list_fines,
        api::fines::mark_paid,
        api::circulation::sweep,
        api::circulation::overview,
        api::circulation::dashboard,
    ),
    components(
        schemas(
            crate::models::book::BookDto,
            crate::models::student::StudentDto,
            crate::models::borrow_record::BorrowRecordDto,
            crate::models::borrow_record::BorrowStatus,
            crate::models::fine::FineDto,
            crate::models::fine::FineStatus,
            crate::domain::CreateBookInput,
            crate::domain::UpdateBookInput,
            crate::domain::CreateStudentInput,
            crate::domain::ReturnCondition,
            crate::services::BorrowRequest,
            crate::services::VerifyReturnRequest,
            crate::services::RecordWithDetails,
            crate::services::Overview,
            crate::services::StudentSummary,
            crate::services::StudentDetail,
            crate::services::StudentDashboard,
            crate::services::PendingFineAmount,
            crate::services::FineWithDetails,
            api::borrows::RejectReturnRequest,
        )
    ),
    tags(
        (name = "circulation-desk", description = "Library circulation API")
    )
)]
pub struct ApiDoc;
