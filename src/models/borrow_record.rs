use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::policy;

/// Lifecycle status of a borrow record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    /// Book is out with the student and not yet due
    #[sea_orm(string_value = "borrowed")]
    Borrowed,
    /// Student asked to return; waiting for a librarian to inspect the book
    #[sea_orm(string_value = "pending_return")]
    PendingReturn,
    /// Due date passed while the book was still out
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Return verified by a librarian
    #[sea_orm(string_value = "returned")]
    Returned,
}

impl BorrowStatus {
    /// Statuses that still hold a copy of the book.
    pub const ACTIVE: [Self; 3] = [Self::Borrowed, Self::PendingReturn, Self::Overdue];

    pub fn is_terminal(self) -> bool {
        self == Self::Returned
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrow_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTimeUtc,
    pub due_date: DateTimeUtc,
    pub borrow_duration_days: i32,
    pub return_date: Option<DateTimeUtc>,
    pub return_requested_date: Option<DateTimeUtc>,
    pub status: BorrowStatus,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(has_one = "super::fine::Entity")]
    Fine,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::fine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True iff the due date has passed and the book has not been returned.
    ///
    /// Read-time check, independent of the stored status.
    pub fn is_overdue(&self, now: DateTimeUtc) -> bool {
        now > self.due_date && !self.status.is_terminal()
    }

    /// Whole days left before the due date, floored (negative once lapsed).
    /// Only defined while the book is out and not yet reclassified as overdue.
    pub fn days_until_due(&self, now: DateTimeUtc) -> Option<i64> {
        match self.status {
            BorrowStatus::Borrowed | BorrowStatus::PendingReturn => {
                Some(policy::whole_days(self.due_date - now))
            }
            BorrowStatus::Overdue | BorrowStatus::Returned => None,
        }
    }

    pub fn should_warn(&self, now: DateTimeUtc) -> bool {
        self.days_until_due(now)
            .is_some_and(|days| (0..=policy::WARNING_WINDOW_DAYS).contains(&days))
    }

    /// Whole days past due: up to the return date once returned, up to `now` otherwise.
    pub fn days_overdue(&self, now: DateTimeUtc) -> i64 {
        let until = match (self.status, self.return_date) {
            (BorrowStatus::Returned, Some(returned_at)) => returned_at,
            (BorrowStatus::Returned, None) => return 0,
            _ => now,
        };

        if until > self.due_date {
            policy::whole_days(until - self.due_date)
        } else {
            0
        }
    }

    pub fn calculate_fine(&self, now: DateTimeUtc) -> f64 {
        policy::fine_for_days(self.days_overdue(now))
    }
}

// DTO for API responses
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BorrowRecordDto {
    pub id: i32,
    pub student_id: i32,
    pub book_id: i32,
    pub borrow_date: DateTimeUtc,
    pub due_date: DateTimeUtc,
    pub borrow_duration_days: i32,
    pub return_date: Option<DateTimeUtc>,
    pub return_requested_date: Option<DateTimeUtc>,
    pub status: BorrowStatus,
    pub notes: Option<String>,
}

impl From<Model> for BorrowRecordDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            student_id: model.student_id,
            book_id: model.book_id,
            borrow_date: model.borrow_date,
            due_date: model.due_date,
            borrow_duration_days: model.borrow_duration_days,
            return_date: model.return_date,
            return_requested_date: model.return_requested_date,
            status: model.status,
            notes: model.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sea_orm::Iterable;

    fn record(status: BorrowStatus, due_in: Duration) -> Model {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        Model {
            id: 1,
            student_id: 1,
            book_id: 1,
            borrow_date: now - Duration::days(7),
            due_date: now + due_in,
            borrow_duration_days: 7,
            return_date: None,
            return_requested_date: None,
            status,
            notes: None,
        }
    }

    fn now() -> DateTimeUtc {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fine_truncates_partial_days() {
        let r = record(BorrowStatus::Borrowed, -Duration::hours(23));
        assert!(r.is_overdue(now()));
        assert_eq!(r.days_overdue(now()), 0);
        assert_eq!(r.calculate_fine(now()), 0.0);

        let r = record(BorrowStatus::Overdue, -Duration::hours(73));
        assert_eq!(r.calculate_fine(now()), 3.0);
    }

    #[test]
    fn test_fine_uses_return_date_once_returned() {
        let mut r = record(BorrowStatus::Returned, -Duration::days(5));
        r.return_date = Some(r.due_date + Duration::days(2) + Duration::hours(1));
        // Still five days past due today, but only two when it came back
        assert_eq!(r.calculate_fine(now()), 2.0);
        assert!(!r.is_overdue(now()));

        r.return_date = Some(r.due_date - Duration::days(1));
        assert_eq!(r.calculate_fine(now()), 0.0);
    }

    #[test]
    fn test_no_fine_before_due_date() {
        let r = record(BorrowStatus::Borrowed, Duration::days(2));
        assert!(!r.is_overdue(now()));
        assert_eq!(r.calculate_fine(now()), 0.0);
    }

    #[test]
    fn test_days_until_due_floors_toward_past() {
        let r = record(BorrowStatus::Borrowed, Duration::hours(60));
        assert_eq!(r.days_until_due(now()), Some(2));

        let r = record(BorrowStatus::PendingReturn, -Duration::hours(1));
        assert_eq!(r.days_until_due(now()), Some(-1));

        let r = record(BorrowStatus::Overdue, -Duration::hours(1));
        assert_eq!(r.days_until_due(now()), None);
    }

    #[test]
    fn test_should_warn_window() {
        assert!(record(BorrowStatus::Borrowed, Duration::hours(1)).should_warn(now()));
        assert!(record(BorrowStatus::PendingReturn, Duration::days(3)).should_warn(now()));
        assert!(!record(BorrowStatus::Borrowed, Duration::days(4)).should_warn(now()));
        assert!(!record(BorrowStatus::Borrowed, -Duration::hours(1)).should_warn(now()));
        assert!(!record(BorrowStatus::Overdue, Duration::days(1)).should_warn(now()));
        assert!(!record(BorrowStatus::Returned, Duration::days(1)).should_warn(now()));
    }

    #[test]
    fn test_json_names_match_storage_values() {
        for status in BorrowStatus::iter() {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.to_value())
            );
        }
    }
}
