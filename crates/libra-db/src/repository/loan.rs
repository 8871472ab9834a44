//! # Loan Repository
//!
//! Database operations for the lend/return lifecycle.
//!
//! ## Loan Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Loan Lifecycle                            │
//! │                                                                 │
//! │  1. ISSUE (one transaction)                                     │
//! │     ├── INSERT INTO loans (book, user, issue_date = now)        │
//! │     └── UPDATE books SET status = 'on-loan'                     │
//! │                                                                 │
//! │  2. CLOSE (one transaction)                                     │
//! │     ├── UPDATE loans SET return_date = now  (open loans only)   │
//! │     └── UPDATE books SET status = 'available'                   │
//! │                                                                 │
//! │  Closed is terminal. Loans are never deleted.                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dual writes are what keep the availability invariant honest: a
//! book is Available iff no open loan references it, so the status flip
//! and the loan row must commit together or not at all.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use libra_core::{BookStatus, Loan};

/// Raw `loans` row, unresolved. `book_id`/`user_id` are nullable in the
/// schema; the snapshot loader drops and reports rows it cannot resolve.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoanRow {
    pub id: i64,
    pub book_id: Option<i64>,
    pub user_id: Option<i64>,
    pub issue_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl LoanRow {
    /// Resolves the row into a domain [`Loan`], when both references are
    /// present. Existence of the referenced rows is the snapshot
    /// loader's problem, not this function's.
    pub fn resolve(&self) -> Option<Loan> {
        match (self.book_id, self.user_id) {
            (Some(book_id), Some(user_id)) => Some(Loan::new(
                self.id,
                book_id,
                user_id,
                self.issue_date,
                self.return_date,
            )),
            _ => None,
        }
    }
}

/// Repository for loan database operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LoanRepository { pool }
    }

    /// Lists all loan rows in id (insertion) order.
    pub async fn list_rows(&self) -> DbResult<Vec<LoanRow>> {
        let rows = sqlx::query_as::<_, LoanRow>(
            "SELECT id, book_id, user_id, issue_date, return_date FROM loans ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Issues a book: inserts the loan row and flips the book to OnLoan
    /// in one transaction.
    ///
    /// Preconditions (user exists, book exists and is Available, user
    /// below their limit) are the engine's responsibility; this method
    /// only guarantees the dual write is atomic.
    ///
    /// ## Returns
    /// The new loan's id.
    pub async fn issue(
        &self,
        book_id: i64,
        user_id: i64,
        issued_at: DateTime<Utc>,
    ) -> DbResult<i64> {
        debug!(book_id = %book_id, user_id = %user_id, "Issuing loan");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO loans (book_id, user_id, issue_date) VALUES (?1, ?2, ?3)",
        )
        .bind(book_id)
        .bind(user_id)
        .bind(issued_at)
        .execute(&mut *tx)
        .await?;

        let loan_id = result.last_insert_rowid();

        sqlx::query("UPDATE books SET status = ?2 WHERE id = ?1")
            .bind(book_id)
            .bind(BookStatus::OnLoan)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan_id)
    }

    /// Closes an open loan: sets the return date and flips the book back
    /// to Available in one transaction.
    ///
    /// The `return_date IS NULL` guard makes the close idempotent at the
    /// storage level: a second attempt matches zero rows and surfaces as
    /// NotFound instead of rewriting history.
    pub async fn close(
        &self,
        loan_id: i64,
        book_id: i64,
        returned_at: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(loan_id = %loan_id, book_id = %book_id, "Closing loan");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE loans SET return_date = ?2 WHERE id = ?1 AND return_date IS NULL",
        )
        .bind(loan_id)
        .bind(returned_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open loan", loan_id));
        }

        sqlx::query("UPDATE books SET status = ?2 WHERE id = ?1")
            .bind(book_id)
            .bind(BookStatus::Available)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
