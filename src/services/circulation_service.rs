//! Circulation Service - borrow and return transitions
//!
//! Every transition checks the caller's capability first, then reads and writes
//! inside a single transaction. Shelf counts move through guarded single-statement
//! updates so two requests can never both take the last copy.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Deserialize;

use crate::domain::access::ensure_owner;
use crate::domain::errors::unique_violation;
use crate::domain::policy::{rejection_notes, return_notes};
use crate::domain::{
    Action, BorrowEvent, Caller, CirculationError, LoanPeriod, ReturnCondition, authorize,
    transition,
};
use crate::models::book::{self, Entity as Book};
use crate::models::borrow_record::{self, BorrowStatus, Entity as BorrowRecord};
use crate::models::fine::{self, Entity as Fine, FineStatus};
use crate::models::student::{self, Entity as Student};

/// Borrow request submitted by a student
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct BorrowRequest {
    /// 7 or 14
    #[serde(default)]
    #[schema(value_type = i64)]
    pub duration_days: LoanPeriod,
    pub notes: Option<String>,
}

/// Librarian's inspection of a returned book
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct VerifyReturnRequest {
    pub condition: ReturnCondition,
    #[serde(default)]
    pub librarian_notes: String,
}

/// Result of a verified return
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    pub record: borrow_record::Model,
    /// Fine attached to the record after the return, if any
    pub fine: Option<fine::Model>,
}

/// Student profile linked to the caller's identity
pub(crate) async fn caller_student<C: ConnectionTrait>(
    conn: &C,
    caller: &Caller,
) -> Result<student::Model, CirculationError> {
    Student::find()
        .filter(student::Column::UserId.eq(caller.user_id))
        .one(conn)
        .await?
        .ok_or(CirculationError::NotFound("Student profile"))
}

async fn find_record<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<borrow_record::Model, CirculationError> {
    BorrowRecord::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(CirculationError::NotFound("Borrow record"))
}

/// Write `changes` only if the record still has the status it was read with.
async fn save_transition<C: ConnectionTrait>(
    conn: &C,
    record: &borrow_record::Model,
    changes: borrow_record::ActiveModel,
) -> Result<borrow_record::Model, CirculationError> {
    let result = BorrowRecord::update_many()
        .set(changes)
        .filter(borrow_record::Column::Id.eq(record.id))
        .filter(borrow_record::Column::Status.eq(record.status))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(CirculationError::InvalidState(
            "Record was modified by another request".to_string(),
        ));
    }

    find_record(conn, record.id).await
}

/// Borrow a book for the calling student
pub async fn borrow_book(
    db: &DatabaseConnection,
    caller: &Caller,
    book_id: i32,
    request: BorrowRequest,
    now: DateTime<Utc>,
) -> Result<borrow_record::Model, CirculationError> {
    authorize(caller, Action::Borrow)?;

    let txn = db.begin().await?;

    let student = caller_student(&txn, caller).await?;
    let book = Book::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or(CirculationError::NotFound("Book"))?;

    // 1. No borrowing while holding an overdue book, stored or lapsed
    let overdue = BorrowRecord::find()
        .filter(borrow_record::Column::StudentId.eq(student.id))
        .filter(
            Condition::any()
                .add(borrow_record::Column::Status.eq(BorrowStatus::Overdue))
                .add(
                    Condition::all()
                        .add(borrow_record::Column::Status.eq(BorrowStatus::Borrowed))
                        .add(borrow_record::Column::DueDate.lt(now)),
                ),
        )
        .count(&txn)
        .await?;
    if overdue > 0 {
        tracing::info!(
            "Student {} has {} overdue record(s), refusing borrow",
            student.id,
            overdue
        );
        return Err(CirculationError::HasOverdueBooks);
    }

    // 2. One unreturned copy of a title per student
    let active = BorrowRecord::find()
        .filter(borrow_record::Column::StudentId.eq(student.id))
        .filter(borrow_record::Column::BookId.eq(book.id))
        .filter(borrow_record::Column::Status.is_in(BorrowStatus::ACTIVE))
        .count(&txn)
        .await?;
    if active > 0 {
        return Err(CirculationError::AlreadyBorrowed);
    }

    // 3. Take a copy off the shelf; the guard makes check and decrement one statement
    let taken = Book::update_many()
        .col_expr(
            book::Column::AvailableCopies,
            Expr::col(book::Column::AvailableCopies).sub(1),
        )
        .filter(book::Column::Id.eq(book.id))
        .filter(book::Column::AvailableCopies.gt(0))
        .exec(&txn)
        .await?;
    if taken.rows_affected == 0 {
        return Err(CirculationError::BookUnavailable);
    }

    let new_record = borrow_record::ActiveModel {
        student_id: Set(student.id),
        book_id: Set(book.id),
        borrow_date: Set(now),
        due_date: Set(now + request.duration_days.duration()),
        borrow_duration_days: Set(request.duration_days.days() as i32),
        return_date: Set(None),
        return_requested_date: Set(None),
        status: Set(BorrowStatus::Borrowed),
        notes: Set(request.notes),
        ..Default::default()
    };

    let saved = new_record.insert(&txn).await.map_err(|e| {
        if unique_violation(&e).is_some() {
            CirculationError::AlreadyBorrowed
        } else {
            e.into()
        }
    })?;

    txn.commit().await?;

    tracing::info!(
        "📚 Student {} borrowed \"{}\" (record {}), due {}",
        student.id,
        book.title,
        saved.id,
        saved.due_date.format("%B %d, %Y")
    );

    Ok(saved)
}

/// Student asks to hand a book back
pub async fn request_return(
    db: &DatabaseConnection,
    caller: &Caller,
    record_id: i32,
    now: DateTime<Utc>,
) -> Result<borrow_record::Model, CirculationError> {
    authorize(caller, Action::RequestReturn)?;

    let txn = db.begin().await?;

    let (record, student) = BorrowRecord::find_by_id(record_id)
        .find_also_related(Student)
        .one(&txn)
        .await?
        .ok_or(CirculationError::NotFound("Borrow record"))?;
    ensure_owner(caller, student.and_then(|s| s.user_id))?;

    let next = transition(record.status, BorrowEvent::RequestReturn)?;

    let updated = save_transition(
        &txn,
        &record,
        borrow_record::ActiveModel {
            status: Set(next),
            return_requested_date: Set(Some(now)),
            ..Default::default()
        },
    )
    .await?;

    txn.commit().await?;

    tracing::info!("Return requested for record {}", updated.id);
    Ok(updated)
}

/// Librarian accepts a returned book, restocks it and settles the fine amount
pub async fn verify_return(
    db: &DatabaseConnection,
    caller: &Caller,
    record_id: i32,
    request: VerifyReturnRequest,
    now: DateTime<Utc>,
) -> Result<ReturnOutcome, CirculationError> {
    authorize(caller, Action::VerifyReturn)?;

    let txn = db.begin().await?;

    let record = find_record(&txn, record_id).await?;
    let next = transition(record.status, BorrowEvent::VerifyReturn)?;

    let updated = save_transition(
        &txn,
        &record,
        borrow_record::ActiveModel {
            status: Set(next),
            return_date: Set(Some(now)),
            notes: Set(Some(return_notes(
                request.condition,
                &request.librarian_notes,
            ))),
            ..Default::default()
        },
    )
    .await?;

    // Put the copy back on the shelf, never above the total
    let restocked = Book::update_many()
        .col_expr(
            book::Column::AvailableCopies,
            Expr::col(book::Column::AvailableCopies).add(1),
        )
        .filter(book::Column::Id.eq(updated.book_id))
        .filter(Expr::col(book::Column::AvailableCopies).lt(Expr::col(book::Column::TotalCopies)))
        .exec(&txn)
        .await?;
    if restocked.rows_affected == 0 {
        tracing::warn!(
            "⚠️ Book {} already has all copies on the shelf; not restocking for record {}",
            updated.book_id,
            updated.id
        );
    }

    let fine = assess_fine(&txn, &updated, now).await?;

    txn.commit().await?;

    match &fine {
        Some(f) if f.status == FineStatus::Pending => tracing::info!(
            "Record {} returned {} day(s) late, fine of {:.2} pending",
            updated.id,
            updated.days_overdue(now),
            f.amount
        ),
        _ => tracing::info!("Record {} returned", updated.id),
    }

    Ok(ReturnOutcome {
        record: updated,
        fine,
    })
}

/// Create or refresh the fine for a just-returned record. Paid fines are left alone.
async fn assess_fine<C: ConnectionTrait>(
    conn: &C,
    record: &borrow_record::Model,
    now: DateTime<Utc>,
) -> Result<Option<fine::Model>, CirculationError> {
    let amount = record.calculate_fine(now);

    let existing = Fine::find()
        .filter(fine::Column::BorrowRecordId.eq(record.id))
        .one(conn)
        .await?;

    match existing {
        None if amount > 0.0 => {
            let created = fine::ActiveModel {
                borrow_record_id: Set(record.id),
                amount: Set(amount),
                status: Set(FineStatus::Pending),
                paid_date: Set(None),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            Ok(Some(created))
        }
        None => Ok(None),
        Some(existing) if existing.status == FineStatus::Pending && existing.amount != amount => {
            let mut active: fine::ActiveModel = existing.into();
            active.amount = Set(amount);
            Ok(Some(active.update(conn).await?))
        }
        Some(existing) => Ok(Some(existing)),
    }
}

/// Librarian refuses a return request; the book stays out with the student
pub async fn reject_return(
    db: &DatabaseConnection,
    caller: &Caller,
    record_id: i32,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<borrow_record::Model, CirculationError> {
    authorize(caller, Action::RejectReturn)?;

    let txn = db.begin().await?;

    let record = find_record(&txn, record_id).await?;
    let next = transition(
        record.status,
        BorrowEvent::RejectReturn {
            overdue: record.is_overdue(now),
        },
    )?;

    let updated = save_transition(
        &txn,
        &record,
        borrow_record::ActiveModel {
            status: Set(next),
            return_requested_date: Set(None),
            notes: Set(Some(rejection_notes(reason))),
            ..Default::default()
        },
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        "Return rejected for record {}, now {:?}",
        updated.id,
        updated.status
    );
    Ok(updated)
}
