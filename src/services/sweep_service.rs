//! Overdue sweep - reclassify lapsed loans in one bulk update

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::time::Duration;

use crate::domain::{Action, Caller, CirculationError, authorize};
use crate::models::borrow_record::{self, BorrowStatus, Entity as BorrowRecord};

/// Move every `borrowed` record whose due date has passed to `overdue`.
///
/// Records pending return are left alone. Running it twice in a row changes
/// nothing the second time. Returns the number of records moved.
pub async fn sweep_overdue<C: ConnectionTrait>(
    conn: &C,
    now: DateTime<Utc>,
) -> Result<u64, CirculationError> {
    let result = BorrowRecord::update_many()
        .col_expr(
            borrow_record::Column::Status,
            Expr::value(BorrowStatus::Overdue),
        )
        .filter(borrow_record::Column::Status.eq(BorrowStatus::Borrowed))
        .filter(borrow_record::Column::DueDate.lt(now))
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        tracing::info!("⏰ Marked {} borrow record(s) overdue", result.rows_affected);
    }

    Ok(result.rows_affected)
}

/// Sweep on behalf of a librarian
pub async fn sweep_overdue_as(
    db: &DatabaseConnection,
    caller: &Caller,
    now: DateTime<Utc>,
) -> Result<u64, CirculationError> {
    authorize(caller, Action::RunSweep)?;
    sweep_overdue(db, now).await
}

/// Background sweeper. Runs forever; errors are logged and retried on the next tick.
pub async fn run_sweeper(db: DatabaseConnection, interval: Duration) {
    tracing::info!("🔄 Overdue sweeper started (every {:?})", interval);

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_overdue(&db, Utc::now()).await {
            tracing::error!("❌ Overdue sweep failed: {}", e);
        }
    }
}
