//! Borrow record state machine.
//!
//! The table of legal `(status, event) -> status` moves. Services consult it
//! before touching storage so an illegal move is rejected without side effects.

use crate::models::BorrowStatus;

use super::CirculationError;

/// Events that can move a borrow record between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorrowEvent {
    /// Student asks to hand the book back
    RequestReturn,
    /// Librarian accepts the returned book
    VerifyReturn,
    /// Librarian refuses the return; `overdue` is the read-time overdue check
    RejectReturn { overdue: bool },
    /// Periodic reclassification of lapsed loans
    Sweep,
}

/// Next status for `event` from `from`, or `None` if the move is illegal.
pub fn next_status(from: BorrowStatus, event: BorrowEvent) -> Option<BorrowStatus> {
    use BorrowStatus::*;

    match (from, event) {
        (Borrowed | Overdue, BorrowEvent::RequestReturn) => Some(PendingReturn),
        (PendingReturn, BorrowEvent::VerifyReturn) => Some(Returned),
        (PendingReturn, BorrowEvent::RejectReturn { overdue: true }) => Some(Overdue),
        (PendingReturn, BorrowEvent::RejectReturn { overdue: false }) => Some(Borrowed),
        (Borrowed, BorrowEvent::Sweep) => Some(Overdue),
        _ => None,
    }
}

/// Like [`next_status`] but with the rejection callers report.
pub fn transition(from: BorrowStatus, event: BorrowEvent) -> Result<BorrowStatus, CirculationError> {
    next_status(from, event).ok_or_else(|| {
        let msg = match event {
            BorrowEvent::RequestReturn => "This book cannot be returned",
            BorrowEvent::VerifyReturn | BorrowEvent::RejectReturn { .. } => {
                "This book is not pending return"
            }
            BorrowEvent::Sweep => "Only borrowed records can become overdue",
        };
        tracing::debug!("Rejected {:?} from {:?}", event, from);
        CirculationError::InvalidState(msg.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_request_return_only_from_out_on_loan() {
        assert_eq!(
            next_status(BorrowStatus::Borrowed, BorrowEvent::RequestReturn),
            Some(BorrowStatus::PendingReturn)
        );
        assert_eq!(
            next_status(BorrowStatus::Overdue, BorrowEvent::RequestReturn),
            Some(BorrowStatus::PendingReturn)
        );
        assert!(next_status(BorrowStatus::PendingReturn, BorrowEvent::RequestReturn).is_none());
        assert!(next_status(BorrowStatus::Returned, BorrowEvent::RequestReturn).is_none());
    }

    #[test]
    fn test_librarian_decisions_require_pending_return() {
        for status in BorrowStatus::iter() {
            let verify = next_status(status, BorrowEvent::VerifyReturn);
            let reject = next_status(status, BorrowEvent::RejectReturn { overdue: false });
            if status == BorrowStatus::PendingReturn {
                assert_eq!(verify, Some(BorrowStatus::Returned));
                assert_eq!(reject, Some(BorrowStatus::Borrowed));
            } else {
                assert!(verify.is_none());
                assert!(reject.is_none());
            }
        }
    }

    #[test]
    fn test_rejected_return_of_late_book_is_overdue() {
        assert_eq!(
            next_status(
                BorrowStatus::PendingReturn,
                BorrowEvent::RejectReturn { overdue: true }
            ),
            Some(BorrowStatus::Overdue)
        );
    }

    #[test]
    fn test_sweep_skips_pending_returns() {
        assert_eq!(
            next_status(BorrowStatus::Borrowed, BorrowEvent::Sweep),
            Some(BorrowStatus::Overdue)
        );
        assert!(next_status(BorrowStatus::PendingReturn, BorrowEvent::Sweep).is_none());
        assert!(next_status(BorrowStatus::Overdue, BorrowEvent::Sweep).is_none());
        assert!(next_status(BorrowStatus::Returned, BorrowEvent::Sweep).is_none());
    }

    #[test]
    fn test_returned_is_terminal() {
        let events = [
            BorrowEvent::RequestReturn,
            BorrowEvent::VerifyReturn,
            BorrowEvent::RejectReturn { overdue: true },
            BorrowEvent::RejectReturn { overdue: false },
            BorrowEvent::Sweep,
        ];
        for event in events {
            assert!(matches!(
                transition(BorrowStatus::Returned, event),
                Err(CirculationError::InvalidState(_))
            ));
        }
    }
}
