//! Circulation rules: loan periods, fine rate, warning window.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CirculationError;

/// Fine accrued per whole overdue day, in currency units.
pub const FINE_PER_DAY: f64 = 1.0;

/// A borrow is flagged for a reminder when this many days (or fewer) remain.
pub const WARNING_WINDOW_DAYS: i64 = 3;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days in `span`, floored toward negative infinity.
///
/// 23 hours is 0 days; minus one hour is -1 day.
pub fn whole_days(span: Duration) -> i64 {
    span.num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

pub fn fine_for_days(days_overdue: i64) -> f64 {
    if days_overdue <= 0 {
        return 0.0;
    }
    days_overdue as f64 * FINE_PER_DAY
}

/// Loan periods a student may choose when borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum LoanPeriod {
    OneWeek,
    #[default]
    TwoWeeks,
}

impl LoanPeriod {
    pub fn days(self) -> i64 {
        match self {
            LoanPeriod::OneWeek => 7,
            LoanPeriod::TwoWeeks => 14,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::days(self.days())
    }
}

impl TryFrom<i64> for LoanPeriod {
    type Error = CirculationError;

    fn try_from(days: i64) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(LoanPeriod::OneWeek),
            14 => Ok(LoanPeriod::TwoWeeks),
            other => Err(CirculationError::Validation(format!(
                "Borrow duration must be 7 or 14 days, got {}",
                other
            ))),
        }
    }
}

impl From<LoanPeriod> for i64 {
    fn from(period: LoanPeriod) -> Self {
        period.days()
    }
}

/// Condition of a book as inspected by the librarian on return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReturnCondition {
    Good,
    Damaged,
    Lost,
}

impl fmt::Display for ReturnCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnCondition::Good => write!(f, "good"),
            ReturnCondition::Damaged => write!(f, "damaged"),
            ReturnCondition::Lost => write!(f, "lost"),
        }
    }
}

pub fn return_notes(condition: ReturnCondition, librarian_notes: &str) -> String {
    format!("Condition: {}\nLibrarian Notes: {}", condition, librarian_notes)
}

pub fn rejection_notes(reason: &str) -> String {
    format!("Return rejected. Reason: {}", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_days_floors() {
        assert_eq!(whole_days(Duration::hours(23)), 0);
        assert_eq!(whole_days(Duration::hours(24)), 1);
        assert_eq!(whole_days(Duration::hours(71)), 2);
        assert_eq!(whole_days(-Duration::hours(1)), -1);
        assert_eq!(whole_days(-Duration::days(2)), -2);
    }

    #[test]
    fn test_fine_for_days() {
        assert_eq!(fine_for_days(3), 3.0);
        assert_eq!(fine_for_days(0), 0.0);
        assert_eq!(fine_for_days(-4), 0.0);
    }

    #[test]
    fn test_loan_period_accepts_only_one_or_two_weeks() {
        assert_eq!(LoanPeriod::try_from(7), Ok(LoanPeriod::OneWeek));
        assert_eq!(LoanPeriod::try_from(14), Ok(LoanPeriod::TwoWeeks));
        assert!(matches!(
            LoanPeriod::try_from(10),
            Err(CirculationError::Validation(_))
        ));
        assert_eq!(LoanPeriod::default().days(), 14);
    }

    #[test]
    fn test_loan_period_from_json() {
        let period: LoanPeriod = serde_json::from_str("7").unwrap();
        assert_eq!(period, LoanPeriod::OneWeek);
        assert!(serde_json::from_str::<LoanPeriod>("30").is_err());
    }

    #[test]
    fn test_notes_format() {
        assert_eq!(
            return_notes(ReturnCondition::Damaged, "torn cover"),
            "Condition: damaged\nLibrarian Notes: torn cover"
        );
        assert_eq!(rejection_notes("wrong book"), "Return rejected. Reason: wrong book");
    }
}
