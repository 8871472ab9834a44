//! # Lending Engine
//!
//! The single entry point for every back-office operation.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       LendingEngine                             │
//! │                                                                 │
//! │  cache: Snapshot          ← full entity graph, always equal     │
//! │  db: Database                to durable state                   │
//! │  authenticator: A                                               │
//! │                                                                 │
//! │  mutation = validate (cache) → write (db, transactional)        │
//! │             → reload (Snapshot::load)                           │
//! │                                                                 │
//! │  query    = answered from the cache, no I/O                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cache Policy
//! Every mutation is followed by a full reload. The working set is a
//! back-office catalog measured in thousands of rows, so correctness by
//! construction beats incremental cache surgery: after any write, the
//! cache is exactly what a fresh start would load.
//!
//! ## Precondition Order
//! `issue_book` checks user existence, then book existence, then
//! availability, then capacity. The first failure wins and nothing is
//! written; later checks are not evaluated.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::auth::{Authenticator, IdPresenceAuthenticator};
use crate::error::{EngineError, EngineResult};
use libra_core::validation::{
    validate_access_level, validate_author_name, validate_person_name, validate_title,
    validate_year,
};
use libra_core::{Author, Book, Borrower, Loan};
use libra_db::{seed_demo_data, Database, DbConfig, DbError, ReconciliationReport, Snapshot};

/// The lending engine: owns the store and the in-memory entity graph.
///
/// Mutating operations take `&mut self`; the engine is a single-writer
/// component by design, mirroring the one-desk back office it models.
pub struct LendingEngine<A: Authenticator = IdPresenceAuthenticator> {
    db: Database,
    authenticator: A,
    cache: Snapshot,
}

impl LendingEngine<IdPresenceAuthenticator> {
    /// Opens the engine with the default id-presence authenticator.
    ///
    /// Connects (creating the store file when missing), migrates, seeds
    /// demo data on a completely empty catalog, and loads the full
    /// entity graph.
    pub async fn open(config: DbConfig) -> EngineResult<Self> {
        let db = Database::new(config).await?;
        let authenticator = IdPresenceAuthenticator::new(db.borrowers());
        Self::with_authenticator(db, authenticator).await
    }
}

impl<A: Authenticator> LendingEngine<A> {
    /// Opens the engine over an already-connected store with a custom
    /// authenticator.
    pub async fn with_authenticator(db: Database, authenticator: A) -> EngineResult<Self> {
        // First-run convenience: an empty catalog gets demo rows. A
        // seeding failure is worth a log line, never a refused startup.
        match db.books().count().await {
            Ok(0) => {
                if let Err(err) = seed_demo_data(&db).await {
                    error!(error = %err, "Demo seeding failed; starting with an empty catalog");
                }
            }
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, "Bootstrap count failed; skipping demo seed");
            }
        }

        let cache = Snapshot::load(&db).await?;

        info!(
            books = cache.books.len(),
            users = cache.users.len(),
            librarians = cache.librarians.len(),
            loans = cache.loans.len(),
            clean = cache.report.is_clean(),
            "Lending engine ready"
        );

        Ok(LendingEngine {
            db,
            authenticator,
            cache,
        })
    }

    /// Reloads the cache from durable state.
    async fn refresh(&mut self) -> EngineResult<()> {
        self.cache = Snapshot::load(&self.db).await?;
        Ok(())
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Adds a book, creating its author on first reference.
    ///
    /// An existing author (matched by exact name) is reused as-is; the
    /// bio argument only lands on a freshly created author.
    pub async fn add_book(
        &mut self,
        title: &str,
        author_name: &str,
        author_bio: &str,
        year: i64,
    ) -> EngineResult<Book> {
        validate_title(title)?;
        validate_author_name(author_name)?;
        validate_year(year)?;

        let book_id = self
            .db
            .books()
            .insert_with_author(title, author_name, author_bio, year)
            .await?;
        self.refresh().await?;

        info!(book_id = %book_id, title = %title, author = %author_name, "Book added");

        self.book(book_id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "book",
                id: book_id,
            })
    }

    /// Removes a book from the catalog.
    ///
    /// Refused while any loan references the book: an open loan means
    /// the copy is physically out, and closed loans are history that is
    /// never deleted. The author row stays either way.
    pub async fn remove_book(&mut self, book_id: i64) -> EngineResult<()> {
        if self.book(book_id).is_none() {
            return Err(EngineError::NotFound {
                entity: "book",
                id: book_id,
            });
        }

        if self
            .cache
            .loans
            .iter()
            .any(|l| l.book_id == book_id && l.is_open())
        {
            warn!(book_id = %book_id, "Remove refused: book is on loan");
            return Err(EngineError::EntityInUse {
                entity: "book",
                id: book_id,
            });
        }

        match self.db.books().delete(book_id).await {
            Ok(()) => {}
            // Closed loans still reference the row; history wins.
            Err(DbError::ForeignKeyViolation { .. }) => {
                warn!(book_id = %book_id, "Remove refused: loan history references the book");
                return Err(EngineError::EntityInUse {
                    entity: "book",
                    id: book_id,
                });
            }
            Err(err) => return Err(err.into()),
        }
        self.refresh().await?;

        info!(book_id = %book_id, "Book removed");
        Ok(())
    }

    /// Edits a book's title, year, and/or its author's bio.
    ///
    /// All provided fields are validated before anything is written; a
    /// bad year in the same call as a good title changes nothing.
    pub async fn edit_book(
        &mut self,
        book_id: i64,
        title: Option<&str>,
        year: Option<i64>,
        author_bio: Option<&str>,
    ) -> EngineResult<Book> {
        if let Some(title) = title {
            validate_title(title)?;
        }
        if let Some(year) = year {
            validate_year(year)?;
        }

        if self.book(book_id).is_none() {
            return Err(EngineError::NotFound {
                entity: "book",
                id: book_id,
            });
        }

        self.db.books().edit(book_id, title, year, author_bio).await?;
        self.refresh().await?;

        info!(book_id = %book_id, "Book edited");

        self.book(book_id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "book",
                id: book_id,
            })
    }

    // =========================================================================
    // People Operations
    // =========================================================================

    /// Registers a new member under a generated id.
    pub async fn register_user(&mut self, name: &str) -> EngineResult<Borrower> {
        validate_person_name(name)?;

        let user_id = self.db.borrowers().insert_user(name).await?;
        self.refresh().await?;

        info!(user_id = %user_id, name = %name, "User registered");

        self.user(user_id).cloned().ok_or(EngineError::NotFound {
            entity: "user",
            id: user_id,
        })
    }

    /// Renames a member. Name is the only editable field today.
    pub async fn edit_user(&mut self, user_id: i64, name: &str) -> EngineResult<()> {
        validate_person_name(name)?;

        if self.user(user_id).is_none() {
            return Err(EngineError::NotFound {
                entity: "user",
                id: user_id,
            });
        }

        self.db.borrowers().update_user_name(user_id, name).await?;
        self.refresh().await?;

        info!(user_id = %user_id, "User renamed");
        Ok(())
    }

    /// Deletes a member.
    ///
    /// Refused while any loan references the user, open or closed: an
    /// open loan means books are still out, and closed loans are history
    /// that is never deleted.
    pub async fn delete_user(&mut self, user_id: i64) -> EngineResult<()> {
        if self.user(user_id).is_none() {
            return Err(EngineError::NotFound {
                entity: "user",
                id: user_id,
            });
        }

        if self
            .cache
            .loans
            .iter()
            .any(|l| l.user_id == user_id && l.is_open())
        {
            warn!(user_id = %user_id, "Delete refused: user holds open loans");
            return Err(EngineError::EntityInUse {
                entity: "user",
                id: user_id,
            });
        }

        match self.db.borrowers().delete_user(user_id).await {
            Ok(()) => {}
            Err(DbError::ForeignKeyViolation { .. }) => {
                warn!(user_id = %user_id, "Delete refused: loan history references the user");
                return Err(EngineError::EntityInUse {
                    entity: "user",
                    id: user_id,
                });
            }
            Err(err) => return Err(err.into()),
        }
        self.refresh().await?;

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// Registers a librarian under an administrator-assigned id.
    ///
    /// Re-registering an existing id is a no-op that returns the
    /// existing librarian unchanged.
    pub async fn register_librarian(
        &mut self,
        librarian_id: i64,
        name: &str,
        access_level: i64,
    ) -> EngineResult<Borrower> {
        validate_person_name(name)?;
        validate_access_level(access_level)?;

        self.db
            .borrowers()
            .insert_librarian(librarian_id, name, access_level)
            .await?;
        self.refresh().await?;

        info!(librarian_id = %librarian_id, "Librarian registered");

        self.librarian(librarian_id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "librarian",
                id: librarian_id,
            })
    }

    // =========================================================================
    // Lending Operations
    // =========================================================================

    /// Issues a book to a user.
    ///
    /// Preconditions, checked in order with the first failure winning:
    /// 1. the user exists
    /// 2. the book exists
    /// 3. the book is available
    /// 4. the user is below their role's capacity
    ///
    /// On success the loan row and the book's status flip commit in one
    /// transaction, and the new open [`Loan`] is returned.
    pub async fn issue_book(&mut self, user_id: i64, book_id: i64) -> EngineResult<Loan> {
        let user = self.user(user_id).ok_or(EngineError::NotFound {
            entity: "user",
            id: user_id,
        })?;
        let book = self.book(book_id).ok_or(EngineError::NotFound {
            entity: "book",
            id: book_id,
        })?;

        if !book.is_available() {
            warn!(book_id = %book_id, "Issue refused: book is on loan");
            return Err(EngineError::BookUnavailable { book_id });
        }

        if user.borrowed_count() >= user.max_books() {
            warn!(
                user_id = %user_id,
                limit = user.max_books(),
                "Issue refused: borrow limit reached"
            );
            return Err(EngineError::BorrowLimitReached {
                name: user.name.clone(),
                limit: user.max_books(),
            });
        }

        let loan_id = self.db.loans().issue(book_id, user_id, Utc::now()).await?;
        self.refresh().await?;

        info!(loan_id = %loan_id, book_id = %book_id, user_id = %user_id, "Book issued");

        self.loan(loan_id).cloned().ok_or(EngineError::NotFound {
            entity: "loan",
            id: loan_id,
        })
    }

    /// Returns a book, closing its loan.
    ///
    /// Closed is terminal: returning the same loan twice is refused with
    /// [`EngineError::LoanAlreadyClosed`], and the first return's date
    /// is never rewritten.
    pub async fn return_book(&mut self, loan_id: i64) -> EngineResult<Loan> {
        let loan = self.loan(loan_id).ok_or(EngineError::NotFound {
            entity: "loan",
            id: loan_id,
        })?;

        if !loan.is_open() {
            warn!(loan_id = %loan_id, "Return refused: loan already closed");
            return Err(EngineError::LoanAlreadyClosed { loan_id });
        }
        let book_id = loan.book_id;

        match self.db.loans().close(loan_id, book_id, Utc::now()).await {
            Ok(()) => {}
            // The storage-level open-only guard matched zero rows.
            Err(DbError::NotFound { .. }) => {
                return Err(EngineError::LoanAlreadyClosed { loan_id })
            }
            Err(err) => return Err(err.into()),
        }
        self.refresh().await?;

        info!(loan_id = %loan_id, book_id = %book_id, "Book returned");

        self.loan(loan_id).cloned().ok_or(EngineError::NotFound {
            entity: "loan",
            id: loan_id,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Authenticates a claimed librarian id through the configured
    /// [`Authenticator`]. `None` means the claim did not check out.
    pub async fn authenticate(&self, librarian_id: i64) -> EngineResult<Option<Borrower>> {
        self.authenticator.authenticate(librarian_id).await
    }

    // =========================================================================
    // Queries (cache only, no I/O)
    // =========================================================================

    /// All authors, in id order.
    pub fn authors(&self) -> &[Author] {
        &self.cache.authors
    }

    /// All books, in id order.
    pub fn books(&self) -> &[Book] {
        &self.cache.books
    }

    /// All users, in id order.
    pub fn users(&self) -> &[Borrower] {
        &self.cache.users
    }

    /// All librarians, in id order.
    pub fn librarians(&self) -> &[Borrower] {
        &self.cache.librarians
    }

    /// All loans, open and closed, in id order.
    pub fn loans(&self) -> &[Loan] {
        &self.cache.loans
    }

    /// Open loans only.
    pub fn active_loans(&self) -> Vec<&Loan> {
        self.cache.loans.iter().filter(|l| l.is_open()).collect()
    }

    /// Open loans past their due date.
    pub fn overdue_loans(&self) -> Vec<&Loan> {
        let now = Utc::now();
        self.cache
            .loans
            .iter()
            .filter(|l| l.is_overdue_at(now))
            .collect()
    }

    /// Looks up a book by id.
    pub fn book(&self, book_id: i64) -> Option<&Book> {
        self.cache.books.iter().find(|b| b.id == book_id)
    }

    /// Looks up a user by id.
    pub fn user(&self, user_id: i64) -> Option<&Borrower> {
        self.cache.users.iter().find(|u| u.id == user_id)
    }

    /// Looks up a librarian by id.
    pub fn librarian(&self, librarian_id: i64) -> Option<&Borrower> {
        self.cache.librarians.iter().find(|l| l.id == librarian_id)
    }

    /// Looks up a loan by id.
    pub fn loan(&self, loan_id: i64) -> Option<&Loan> {
        self.cache.loans.iter().find(|l| l.id == loan_id)
    }

    /// Case-insensitive substring search over book titles.
    pub fn find_books_by_title(&self, query: &str) -> Vec<&Book> {
        let needle = query.to_lowercase();
        self.cache
            .books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Case-insensitive substring search over user names.
    pub fn find_users_by_name(&self, query: &str) -> Vec<&Borrower> {
        let needle = query.to_lowercase();
        self.cache
            .users
            .iter()
            .filter(|u| u.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Case-insensitive substring search over author names.
    pub fn find_authors_by_name(&self, query: &str) -> Vec<&Author> {
        let needle = query.to_lowercase();
        self.cache
            .authors
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// What the last load refused to carry: rows whose references did
    /// not resolve. Empty on a healthy store.
    pub fn reconciliation_report(&self) -> &ReconciliationReport {
        &self.cache.report
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Shuts the engine down, releasing the store.
    pub async fn close(self) {
        info!("Shutting down lending engine");
        self.db.close().await;
    }
}
