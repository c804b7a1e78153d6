pub mod books;
pub mod borrows;
pub mod circulation;
pub mod error;
pub mod extract;
pub mod fines;
pub mod health;
pub mod students;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

/// Create API router with AppState (repositories + database)
pub fn api_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalogue
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/borrow", post(borrows::borrow_book))
        // Students
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/students/:id", get(students::get_student))
        .route("/students/:id/fines/pending", get(students::pending_fines))
        // Borrow records
        .route("/borrows", get(borrows::list_borrows))
        .route("/borrows/:id/request-return", post(borrows::request_return))
        .route("/borrows/:id/verify-return", post(borrows::verify_return))
        .route("/borrows/:id/reject-return", post(borrows::reject_return))
        .route("/borrows/:id/settle-fine", post(borrows::settle_fine))
        // Fines
        .route("/fines", get(fines::list_fines))
        .route("/fines/:id/mark-paid", post(fines::mark_paid))
        // Desk views
        .route("/circulation/sweep", post(circulation::sweep))
        .route("/overview", get(circulation::overview))
        .route("/dashboard", get(circulation::dashboard))
        .with_state(state)
}
