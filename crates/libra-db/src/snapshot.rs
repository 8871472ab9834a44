//! # Snapshot Loader
//!
//! Full-set reload: reconstructs the complete entity graph from the
//! store. The engine calls this on construction and after every
//! mutation, keeping its cache identical to durable state.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  1. authors                                                     │
//! │  2. books      ── resolved against authors                      │
//! │  3. users                                                       │
//! │  4. librarians                                                  │
//! │  5. loans      ── resolved against books and users;             │
//! │                   open loans rebuild each user's held-set       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft-Fail Policy
//! A loan whose book or user cannot be resolved (or a book whose author
//! cannot) is dropped from the in-memory set instead of failing the
//! load. Manual database edits must never crash startup. Every dropped
//! row is logged at `warn` and recorded in the [`ReconciliationReport`]
//! so the tolerance is visible rather than a hidden swallow.

use std::collections::HashMap;

use tracing::warn;

use crate::error::DbResult;
use crate::pool::Database;
use libra_core::{Author, Book, Borrower, Loan};

// =============================================================================
// Reconciliation Report
// =============================================================================

/// A row dropped during load, with the reason it could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    pub id: i64,
    pub reason: String,
}

/// What the loader refused to carry into memory.
///
/// Empty on a healthy store. Non-empty means someone edited the database
/// by hand; the engine keeps running, but the report tells the operator
/// exactly which rows were ignored.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationReport {
    /// Books whose author id did not resolve.
    pub dropped_books: Vec<DroppedRecord>,

    /// Loans whose book or user id did not resolve.
    pub dropped_loans: Vec<DroppedRecord>,
}

impl ReconciliationReport {
    /// Whether the load carried every row.
    pub fn is_clean(&self) -> bool {
        self.dropped_books.is_empty() && self.dropped_loans.is_empty()
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// The full entity graph as of one load.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub authors: Vec<Author>,
    pub books: Vec<Book>,
    pub users: Vec<Borrower>,
    pub librarians: Vec<Borrower>,
    pub loans: Vec<Loan>,
    pub report: ReconciliationReport,
}

impl Snapshot {
    /// Loads the complete entity graph from the store.
    pub async fn load(db: &Database) -> DbResult<Self> {
        let mut report = ReconciliationReport::default();

        // 1. Authors
        let authors = db.authors().list().await?;
        let authors_by_id: HashMap<i64, &Author> = authors.iter().map(|a| (a.id, a)).collect();

        // 2. Books, each resolved against its author
        let mut books = Vec::new();
        for row in db.books().list_rows().await? {
            let author = row.author_id.and_then(|id| authors_by_id.get(&id));
            match author {
                Some(author) => {
                    books.push(Book::new(
                        row.id,
                        row.title,
                        (*author).clone(),
                        row.year,
                        row.status,
                    ));
                }
                None => {
                    warn!(
                        book_id = row.id,
                        author_id = ?row.author_id,
                        "Dropping book with unresolvable author"
                    );
                    report.dropped_books.push(DroppedRecord {
                        id: row.id,
                        reason: format!("author {:?} not found", row.author_id),
                    });
                }
            }
        }
        let book_ids: HashMap<i64, ()> = books.iter().map(|b| (b.id, ())).collect();

        // 3. Users
        let mut users: Vec<Borrower> = db
            .borrowers()
            .list_users()
            .await?
            .into_iter()
            .map(|row| Borrower::new_member(row.id, row.name))
            .collect();
        let user_index: HashMap<i64, usize> =
            users.iter().enumerate().map(|(i, u)| (u.id, i)).collect();

        // 4. Librarians
        let librarians: Vec<Borrower> = db
            .borrowers()
            .list_librarians()
            .await?
            .into_iter()
            .map(|row| Borrower::new_librarian(row.id, row.name, row.access_level))
            .collect();

        // 5. Loans, resolved against books and users; open loans rebuild
        //    the held-sets
        let mut loans = Vec::new();
        for row in db.loans().list_rows().await? {
            let loan = match row.resolve() {
                Some(loan) => loan,
                None => {
                    warn!(loan_id = row.id, "Dropping loan with NULL references");
                    report.dropped_loans.push(DroppedRecord {
                        id: row.id,
                        reason: "book or user reference is NULL".to_string(),
                    });
                    continue;
                }
            };

            if !book_ids.contains_key(&loan.book_id) {
                warn!(
                    loan_id = loan.id,
                    book_id = loan.book_id,
                    "Dropping loan referencing a missing book"
                );
                report.dropped_loans.push(DroppedRecord {
                    id: loan.id,
                    reason: format!("book {} not found", loan.book_id),
                });
                continue;
            }

            let Some(&user_pos) = user_index.get(&loan.user_id) else {
                warn!(
                    loan_id = loan.id,
                    user_id = loan.user_id,
                    "Dropping loan referencing a missing user"
                );
                report.dropped_loans.push(DroppedRecord {
                    id: loan.id,
                    reason: format!("user {} not found", loan.user_id),
                });
                continue;
            };

            if loan.is_open() {
                // A hand-edited store can exceed the capacity limit; the
                // loan itself is still carried.
                if let Err(err) = users[user_pos].borrow(loan.book_id) {
                    warn!(
                        loan_id = loan.id,
                        user_id = loan.user_id,
                        error = %err,
                        "Open loan exceeds the user's capacity"
                    );
                }
            }

            loans.push(loan);
        }

        Ok(Snapshot {
            authors,
            books,
            users,
            librarians,
            loans,
            report,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use chrono::Utc;
    use libra_core::BookStatus;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_loads_clean() {
        let db = test_db().await;
        let snapshot = Snapshot::load(&db).await.unwrap();

        assert!(snapshot.books.is_empty());
        assert!(snapshot.loans.is_empty());
        assert!(snapshot.report.is_clean());
    }

    #[tokio::test]
    async fn test_snapshot_resolves_graph() {
        let db = test_db().await;

        let book_id = db
            .books()
            .insert_with_author("War and Peace", "Leo Tolstoy", "Russian novelist", 1869)
            .await
            .unwrap();
        let user_id = db.borrowers().insert_user("Ivan Ivanov").await.unwrap();
        let loan_id = db.loans().issue(book_id, user_id, Utc::now()).await.unwrap();

        let snapshot = Snapshot::load(&db).await.unwrap();

        assert_eq!(snapshot.authors.len(), 1);
        assert_eq!(snapshot.books.len(), 1);
        assert_eq!(snapshot.books[0].author.name, "Leo Tolstoy");
        assert_eq!(snapshot.books[0].status, BookStatus::OnLoan);
        assert_eq!(snapshot.loans.len(), 1);
        assert_eq!(snapshot.loans[0].id, loan_id);
        assert!(snapshot.report.is_clean());

        // Open loan rebuilt the held-set
        assert_eq!(snapshot.users[0].borrowed_books(), &[book_id]);
    }

    #[tokio::test]
    async fn test_book_with_unresolvable_author_is_dropped_and_reported() {
        let db = test_db().await;

        let user_id = db.borrowers().insert_user("Ivan Ivanov").await.unwrap();

        // Simulate a manual edit: a book whose author row does not
        // exist, plus a loan on that book.
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(db.pool())
            .await
            .unwrap();
        let book_id = sqlx::query(
            "INSERT INTO books (title, author_id, year, status) \
             VALUES ('Ghost Book', 999, 1900, 'available')",
        )
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid();
        sqlx::query("INSERT INTO loans (book_id, user_id, issue_date) VALUES (?1, ?2, ?3)")
            .bind(book_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();

        let snapshot = Snapshot::load(&db).await.unwrap();

        // The book is dropped and reported
        assert!(snapshot.books.is_empty());
        assert_eq!(snapshot.report.dropped_books.len(), 1);
        assert_eq!(snapshot.report.dropped_books[0].id, book_id);
        assert!(snapshot.report.dropped_books[0].reason.contains("author"));

        // The loan on the dropped book cascades out with it
        assert!(snapshot.loans.is_empty());
        assert_eq!(snapshot.report.dropped_loans.len(), 1);
        assert!(snapshot.report.dropped_loans[0]
            .reason
            .contains(&format!("book {book_id}")));

        // The user's held-set stays clean
        assert_eq!(snapshot.users[0].borrowed_count(), 0);
    }

    #[tokio::test]
    async fn test_orphaned_loan_is_dropped_and_reported() {
        let db = test_db().await;

        let user_id = db.borrowers().insert_user("Ivan Ivanov").await.unwrap();

        // Simulate a manual edit: a loan pointing at a book that does
        // not exist. Foreign keys would block this through the normal
        // path, so write it with them off.
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO loans (book_id, user_id, issue_date) VALUES (999, ?1, ?2)")
            .bind(user_id)
            .bind(Utc::now())
            .execute(db.pool())
            .await
            .unwrap();

        let snapshot = Snapshot::load(&db).await.unwrap();

        assert!(snapshot.loans.is_empty());
        assert_eq!(snapshot.report.dropped_loans.len(), 1);
        assert!(snapshot.report.dropped_loans[0].reason.contains("book 999"));
    }
}
