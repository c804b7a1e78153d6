//! Fine Service - settling fines and totting up what a student owes

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;

use crate::domain::{Action, Caller, CirculationError, authorize};
use crate::models::book::Entity as Book;
use crate::models::borrow_record::{self, BorrowStatus, Entity as BorrowRecord};
use crate::models::fine::{self, Entity as Fine, FineStatus};
use crate::models::student::Entity as Student;

/// Fine enriched with who owes it and for which book
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FineWithDetails {
    pub id: i32,
    pub borrow_record_id: i32,
    pub amount: f64,
    pub status: FineStatus,
    pub paid_date: Option<DateTime<Utc>>,
    pub student_id: Option<i32>,
    pub student_name: String,
    pub book_title: String,
}

/// Mark a pending fine as paid
pub async fn mark_fine_paid(
    db: &DatabaseConnection,
    caller: &Caller,
    fine_id: i32,
    now: DateTime<Utc>,
) -> Result<fine::Model, CirculationError> {
    authorize(caller, Action::MarkFinePaid)?;

    let txn = db.begin().await?;

    let existing = Fine::find_by_id(fine_id)
        .one(&txn)
        .await?
        .ok_or(CirculationError::NotFound("Fine"))?;

    let paid = pay(&txn, existing, now).await?;
    txn.commit().await?;

    tracing::info!("💰 Fine {} of {:.2} marked paid", paid.id, paid.amount);
    Ok(paid)
}

/// Flip a pending fine to paid; the status guard keeps a concurrent payment from winning twice.
async fn pay<C: ConnectionTrait>(
    conn: &C,
    existing: fine::Model,
    now: DateTime<Utc>,
) -> Result<fine::Model, CirculationError> {
    if existing.status == FineStatus::Paid {
        return Err(CirculationError::AlreadyPaid);
    }

    let result = Fine::update_many()
        .set(fine::ActiveModel {
            status: Set(FineStatus::Paid),
            paid_date: Set(Some(now)),
            ..Default::default()
        })
        .filter(fine::Column::Id.eq(existing.id))
        .filter(fine::Column::Status.eq(FineStatus::Pending))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(CirculationError::AlreadyPaid);
    }

    Fine::find_by_id(existing.id)
        .one(conn)
        .await?
        .ok_or(CirculationError::NotFound("Fine"))
}

/// Settle a record's fine in one step: materialise it at the calculated
/// amount if it does not exist yet, then mark it paid.
pub async fn settle_fine(
    db: &DatabaseConnection,
    caller: &Caller,
    record_id: i32,
    now: DateTime<Utc>,
) -> Result<fine::Model, CirculationError> {
    authorize(caller, Action::SettleFine)?;

    let txn = db.begin().await?;

    let (record, existing) = BorrowRecord::find_by_id(record_id)
        .find_also_related(Fine)
        .one(&txn)
        .await?
        .ok_or(CirculationError::NotFound("Borrow record"))?;

    let paid = match existing {
        Some(existing) => pay(&txn, existing, now).await?,
        None => {
            let amount = record.calculate_fine(now);
            if amount <= 0.0 {
                return Err(CirculationError::Validation(
                    "No fine is owed for this record".to_string(),
                ));
            }

            fine::ActiveModel {
                borrow_record_id: Set(record.id),
                amount: Set(amount),
                status: Set(FineStatus::Paid),
                paid_date: Set(Some(now)),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    tracing::info!(
        "💰 Fine of {:.2} for record {} settled",
        paid.amount,
        record.id
    );
    Ok(paid)
}

/// List fines, optionally filtered by status, newest borrow first
pub async fn list_fines(
    db: &DatabaseConnection,
    caller: &Caller,
    status: Option<FineStatus>,
) -> Result<Vec<FineWithDetails>, CirculationError> {
    authorize(caller, Action::ViewCirculation)?;

    let mut query = Fine::find();
    if let Some(status) = status {
        query = query.filter(fine::Column::Status.eq(status));
    }

    let fines_with_records = query
        .find_also_related(BorrowRecord)
        .order_by_desc(borrow_record::Column::BorrowDate)
        .all(db)
        .await?;

    let mut result = Vec::with_capacity(fines_with_records.len());
    for (fine, record) in fines_with_records {
        let (student_id, student_name, book_title) = match record {
            Some(record) => {
                let student = Student::find_by_id(record.student_id).one(db).await?;
                let book = Book::find_by_id(record.book_id).one(db).await?;
                (
                    Some(record.student_id),
                    student.map(|s| s.name).unwrap_or_else(|| "Unknown".to_string()),
                    book.map(|b| b.title).unwrap_or_else(|| "Unknown".to_string()),
                )
            }
            None => (None, "Unknown".to_string(), "Unknown".to_string()),
        };

        result.push(FineWithDetails {
            id: fine.id,
            borrow_record_id: fine.borrow_record_id,
            amount: fine.amount,
            status: fine.status,
            paid_date: fine.paid_date,
            student_id,
            student_name,
            book_title,
        });
    }

    Ok(result)
}

/// What a student owes right now.
///
/// Pending fines plus the running fine of every overdue book that has no fine
/// row yet, so nothing is counted twice before the return is verified.
pub async fn pending_fine_total<C: ConnectionTrait>(
    conn: &C,
    student_id: i32,
    now: DateTime<Utc>,
) -> Result<f64, CirculationError> {
    let records_with_fines = BorrowRecord::find()
        .filter(borrow_record::Column::StudentId.eq(student_id))
        .find_also_related(Fine)
        .all(conn)
        .await?;

    let total = records_with_fines
        .iter()
        .map(|(record, fine)| match fine {
            Some(fine) if fine.status == FineStatus::Pending => fine.amount,
            Some(_) => 0.0,
            None if record.status != BorrowStatus::Returned && record.is_overdue(now) => {
                record.calculate_fine(now)
            }
            None => 0.0,
        })
        .sum();

    Ok(total)
}
