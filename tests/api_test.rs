use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use circulation_desk::domain::Role;
use circulation_desk::{auth, db, server};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn setup_app() -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    server::build_router(db, &[])
}

fn token(user_id: i32, role: Role) -> String {
    auth::create_jwt(user_id, role).expect("Failed to sign token")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header("Authorization", format!("Bearer {}", t));
    }
    let request = match body {
        Some(b) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = setup_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, "GET", "/api/books", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_students_cannot_use_librarian_routes() {
    let app = setup_app().await;
    let student = token(1, Role::Student);

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&student),
        Some(json!({"title": "Dune", "author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    for uri in ["/api/overview", "/api/fines", "/api/borrows", "/api/students"] {
        let (status, _) = send(&app, "GET", uri, Some(&student), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }

    let (status, _) = send(&app, "POST", "/api/circulation/sweep", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_catalogue_management() {
    let app = setup_app().await;
    let librarian = token(100, Role::Librarian);

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&librarian),
        Some(json!({"title": "Dune", "author": "Frank Herbert", "total_copies": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let isbn = body["book"]["isbn"].as_str().unwrap().to_string();
    assert!(isbn.starts_with("BK"));
    assert_eq!(isbn.len(), 8);
    assert_eq!(body["book"]["available_copies"], 2);

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&librarian),
        Some(json!({"isbn": isbn, "title": "Dune Messiah", "author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_key");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/books/1",
        Some(&librarian),
        Some(json!({"total_copies": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["total_copies"], 5);
    assert_eq!(body["book"]["available_copies"], 5);

    let (status, body) = send(&app, "GET", "/api/books/999", Some(&librarian), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&app, "DELETE", "/api/books/1", Some(&librarian), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", "/api/books/1", Some(&librarian), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_borrow_flow_over_http() {
    let app = setup_app().await;
    let librarian = token(100, Role::Librarian);
    let student = token(1, Role::Student);

    let (status, _) = send(
        &app,
        "POST",
        "/api/books",
        Some(&librarian),
        Some(json!({"isbn": "BK123456", "title": "Dune", "author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Borrowing before a profile is linked
    let (status, body) = send(
        &app,
        "POST",
        "/api/books/1/borrow",
        Some(&student),
        Some(json!({"duration_days": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(
        &app,
        "POST",
        "/api/students",
        Some(&librarian),
        Some(json!({
            "user_id": 1,
            "student_id": "S2024001",
            "name": "Ada Student",
            "email": "ada@example.edu"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/books/1/borrow",
        Some(&student),
        Some(json!({"duration_days": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().unwrap().contains("7 or 14"));

    // No body at all is rejected the same way
    let (status, body) = send(&app, "POST", "/api/books/1/borrow", Some(&student), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");

    let (status, body) = send(
        &app,
        "POST",
        "/api/books/1/borrow",
        Some(&student),
        Some(json!({"duration_days": 7})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["status"], "borrowed");
    assert_eq!(body["record"]["borrow_duration_days"], 7);
    let record_id = body["record"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/books/1/borrow",
        Some(&student),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_borrowed");

    let (status, body) = send(&app, "GET", "/api/dashboard", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_records"].as_array().unwrap().len(), 1);
    assert_eq!(body["current_records"][0]["book_title"], "Dune");
    assert_eq!(body["current_records"][0]["days_until_due"], 6);

    let (status, body) = send(
        &app,
        "GET",
        "/api/borrows?status=borrowed",
        Some(&librarian),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["records"][0]["student_name"], "Ada Student");

    let verify_uri = format!("/api/borrows/{}/verify-return", record_id);
    let (status, body) = send(
        &app,
        "POST",
        &verify_uri,
        Some(&librarian),
        Some(json!({"condition": "good"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_state");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/borrows/{}/request-return", record_id),
        Some(&student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "pending_return");

    let (status, body) = send(
        &app,
        "POST",
        &verify_uri,
        Some(&librarian),
        Some(json!({"condition": "good", "librarian_notes": "Fine shape"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "returned");
    assert!(body["fine"].is_null());

    let (status, body) = send(&app, "GET", "/api/books/1", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["available_copies"], 1);

    let (status, body) = send(
        &app,
        "GET",
        "/api/students/1/fines/pending",
        Some(&librarian),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 0.0);
}

#[tokio::test]
async fn test_duplicate_student_email_conflicts() {
    let app = setup_app().await;
    let librarian = token(100, Role::Librarian);

    let student = |id: &str| {
        json!({
            "student_id": id,
            "name": "Ada Student",
            "email": "ada@example.edu"
        })
    };

    let (status, _) = send(&app, "POST", "/api/students", Some(&librarian), Some(student("S1"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        send(&app, "POST", "/api/students", Some(&librarian), Some(student("S2"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_key");
    assert_eq!(body["message"], "email already exists");
}

#[tokio::test]
async fn test_malformed_bodies_get_structured_rejections() {
    let app = setup_app().await;
    let librarian = token(100, Role::Librarian);

    // Missing required field
    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&librarian),
        Some(json!({"author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
    assert!(body["message"].as_str().unwrap().contains("title"));

    // Unknown return condition
    let (status, body) = send(
        &app,
        "POST",
        "/api/borrows/1/verify-return",
        Some(&librarian),
        Some(json!({"condition": "soggy"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation");
}
