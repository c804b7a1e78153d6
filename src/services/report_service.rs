//! Report Service - read-side views for librarians and students

use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::circulation_service::caller_student;
use super::fine_service::pending_fine_total;
use super::sweep_service::sweep_overdue;
use crate::domain::{Action, Caller, CirculationError, authorize};
use crate::models::book::{self, Entity as Book};
use crate::models::borrow_record::{self, BorrowStatus, Entity as BorrowRecord};
use crate::models::fine::{self, Entity as Fine, FineDto, FineStatus};
use crate::models::student::{self, Entity as Student, StudentDto};

const RECENT_RECORDS: u64 = 5;

/// Borrow record with the names a desk clerk needs and its read-time flags
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RecordWithDetails {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub book_id: i32,
    pub book_title: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub borrow_duration_days: i32,
    pub return_date: Option<DateTime<Utc>>,
    pub return_requested_date: Option<DateTime<Utc>>,
    pub status: BorrowStatus,
    pub notes: Option<String>,
    pub is_overdue: bool,
    pub days_until_due: Option<i64>,
    pub should_warn: bool,
    /// Fine accrued so far, or charged at return
    pub fine_amount: f64,
}

/// Filter parameters for listing borrow records
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecordFilter {
    pub student_id: Option<i32>,
    pub status: Option<BorrowStatus>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Overview {
    pub total_books: u64,
    pub total_students: u64,
    pub borrowed_count: u64,
    pub overdue_count: u64,
    pub recent_records: Vec<RecordWithDetails>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StudentSummary {
    pub student: StudentDto,
    /// Records still holding a copy
    pub active_count: u64,
    pub overdue_count: u64,
    /// Sum of pending fine rows
    pub pending_fines: f64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StudentDetail {
    pub student: StudentDto,
    pub records: Vec<RecordWithDetails>,
    pub current_records: Vec<RecordWithDetails>,
    pub fines: Vec<FineDto>,
    pub pending_fine_total: f64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StudentDashboard {
    pub student: StudentDto,
    pub current_records: Vec<RecordWithDetails>,
    pub history: Vec<RecordWithDetails>,
    pub pending_fines: Vec<FineDto>,
    pub pending_fine_total: f64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PendingFineAmount {
    pub student_id: i32,
    pub amount: f64,
}

/// Attach student names, book titles and fine amounts to a page of records.
async fn with_details<C: ConnectionTrait>(
    conn: &C,
    records: Vec<borrow_record::Model>,
    now: DateTime<Utc>,
) -> Result<Vec<RecordWithDetails>, CirculationError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let student_ids: Vec<i32> = records.iter().map(|r| r.student_id).collect();
    let book_ids: Vec<i32> = records.iter().map(|r| r.book_id).collect();
    let record_ids: Vec<i32> = records.iter().map(|r| r.id).collect();

    let student_names: HashMap<i32, String> = Student::find()
        .filter(student::Column::Id.is_in(student_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();

    let book_titles: HashMap<i32, String> = Book::find()
        .filter(book::Column::Id.is_in(book_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|b| (b.id, b.title))
        .collect();

    let fine_amounts: HashMap<i32, f64> = Fine::find()
        .filter(fine::Column::BorrowRecordId.is_in(record_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|f| (f.borrow_record_id, f.amount))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let fine_amount = fine_amounts
                .get(&record.id)
                .copied()
                .unwrap_or_else(|| record.calculate_fine(now));

            RecordWithDetails {
                student_name: student_names
                    .get(&record.student_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                book_title: book_titles
                    .get(&record.book_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                is_overdue: record.is_overdue(now),
                days_until_due: record.days_until_due(now),
                should_warn: record.should_warn(now),
                fine_amount,
                id: record.id,
                student_id: record.student_id,
                book_id: record.book_id,
                borrow_date: record.borrow_date,
                due_date: record.due_date,
                borrow_duration_days: record.borrow_duration_days,
                return_date: record.return_date,
                return_requested_date: record.return_requested_date,
                status: record.status,
                notes: record.notes,
            }
        })
        .collect())
}

/// List borrow records, newest borrow first
pub async fn list_records(
    db: &DatabaseConnection,
    caller: &Caller,
    filter: RecordFilter,
    now: DateTime<Utc>,
) -> Result<Vec<RecordWithDetails>, CirculationError> {
    authorize(caller, Action::ViewCirculation)?;

    let mut condition = Condition::all();
    if let Some(student_id) = filter.student_id {
        condition = condition.add(borrow_record::Column::StudentId.eq(student_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(borrow_record::Column::Status.eq(status));
    }

    let records = BorrowRecord::find()
        .filter(condition)
        .order_by_desc(borrow_record::Column::BorrowDate)
        .order_by_desc(borrow_record::Column::Id)
        .all(db)
        .await?;

    with_details(db, records, now).await
}

/// Librarian's front page; sweeps first so the overdue count is current
pub async fn overview(
    db: &DatabaseConnection,
    caller: &Caller,
    now: DateTime<Utc>,
) -> Result<Overview, CirculationError> {
    authorize(caller, Action::ViewCirculation)?;
    sweep_overdue(db, now).await?;

    let total_books = Book::find().count(db).await?;
    let total_students = Student::find().count(db).await?;
    let borrowed_count = BorrowRecord::find()
        .filter(borrow_record::Column::Status.eq(BorrowStatus::Borrowed))
        .count(db)
        .await?;
    let overdue_count = BorrowRecord::find()
        .filter(borrow_record::Column::Status.eq(BorrowStatus::Overdue))
        .count(db)
        .await?;

    let recent = BorrowRecord::find()
        .order_by_desc(borrow_record::Column::BorrowDate)
        .order_by_desc(borrow_record::Column::Id)
        .limit(RECENT_RECORDS)
        .all(db)
        .await?;

    Ok(Overview {
        total_books,
        total_students,
        borrowed_count,
        overdue_count,
        recent_records: with_details(db, recent, now).await?,
    })
}

/// Per-student circulation counts for the librarian's student list
pub async fn student_summaries(
    db: &DatabaseConnection,
    caller: &Caller,
) -> Result<Vec<StudentSummary>, CirculationError> {
    authorize(caller, Action::ViewCirculation)?;

    let students = Student::find()
        .order_by_asc(student::Column::Name)
        .find_with_related(BorrowRecord)
        .all(db)
        .await?;

    let pending: HashMap<i32, f64> = Fine::find()
        .filter(fine::Column::Status.eq(FineStatus::Pending))
        .find_also_related(BorrowRecord)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(fine, record)| record.map(|r| (r.student_id, fine.amount)))
        .fold(HashMap::new(), |mut acc, (student_id, amount)| {
            *acc.entry(student_id).or_insert(0.0) += amount;
            acc
        });

    Ok(students
        .into_iter()
        .map(|(student, records)| {
            let active_count = records
                .iter()
                .filter(|r| !r.status.is_terminal())
                .count() as u64;
            let overdue_count = records
                .iter()
                .filter(|r| r.status == BorrowStatus::Overdue)
                .count() as u64;

            StudentSummary {
                pending_fines: pending.get(&student.id).copied().unwrap_or(0.0),
                student: student.into(),
                active_count,
                overdue_count,
            }
        })
        .collect())
}

/// Everything about one student, for the librarian
pub async fn student_detail(
    db: &DatabaseConnection,
    caller: &Caller,
    student_id: i32,
    now: DateTime<Utc>,
) -> Result<StudentDetail, CirculationError> {
    authorize(caller, Action::ViewCirculation)?;

    let student = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(CirculationError::NotFound("Student"))?;

    let records = BorrowRecord::find()
        .filter(borrow_record::Column::StudentId.eq(student.id))
        .order_by_desc(borrow_record::Column::BorrowDate)
        .order_by_desc(borrow_record::Column::Id)
        .all(db)
        .await?;
    let record_ids: Vec<i32> = records.iter().map(|r| r.id).collect();

    let fines = Fine::find()
        .filter(fine::Column::BorrowRecordId.is_in(record_ids))
        .order_by_desc(fine::Column::Id)
        .all(db)
        .await?;

    let records = with_details(db, records, now).await?;
    let current_records = records
        .iter()
        .filter(|r| !r.status.is_terminal())
        .cloned()
        .collect();

    Ok(StudentDetail {
        pending_fine_total: pending_fine_total(db, student.id, now).await?,
        student: student.into(),
        records,
        current_records,
        fines: fines.into_iter().map(FineDto::from).collect(),
    })
}

/// Amount a student owes right now, for the librarian
pub async fn student_pending_fines(
    db: &DatabaseConnection,
    caller: &Caller,
    student_id: i32,
    now: DateTime<Utc>,
) -> Result<PendingFineAmount, CirculationError> {
    authorize(caller, Action::ViewCirculation)?;

    let student = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(CirculationError::NotFound("Student"))?;

    Ok(PendingFineAmount {
        student_id: student.id,
        amount: pending_fine_total(db, student.id, now).await?,
    })
}

/// The calling student's own dashboard; sweeps first so statuses are current
pub async fn student_dashboard(
    db: &DatabaseConnection,
    caller: &Caller,
    now: DateTime<Utc>,
) -> Result<StudentDashboard, CirculationError> {
    authorize(caller, Action::ViewOwnDashboard)?;
    let student = caller_student(db, caller).await?;
    sweep_overdue(db, now).await?;

    let records = BorrowRecord::find()
        .filter(borrow_record::Column::StudentId.eq(student.id))
        .order_by_desc(borrow_record::Column::BorrowDate)
        .order_by_desc(borrow_record::Column::Id)
        .all(db)
        .await?;
    let record_ids: Vec<i32> = records.iter().map(|r| r.id).collect();

    let pending_fines = Fine::find()
        .filter(fine::Column::BorrowRecordId.is_in(record_ids))
        .filter(fine::Column::Status.eq(FineStatus::Pending))
        .all(db)
        .await?;

    let (current_records, history): (Vec<_>, Vec<_>) = with_details(db, records, now)
        .await?
        .into_iter()
        .partition(|r| !r.status.is_terminal());

    Ok(StudentDashboard {
        pending_fine_total: pending_fine_total(db, student.id, now).await?,
        student: student.into(),
        current_records,
        history,
        pending_fines: pending_fines.into_iter().map(FineDto::from).collect(),
    })
}
