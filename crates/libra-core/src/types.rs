//! # Domain Types
//!
//! Core entity types for the lending library.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐     │
//! │  │    Author     │   │     Book      │   │     Loan      │     │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │     │
//! │  │  id (i64)     │◄──│  author       │◄──│  book_id      │     │
//! │  │  name UNIQUE  │   │  title, year  │   │  user_id      │     │
//! │  │  bio          │   │  status       │   │  issue_date   │     │
//! │  └───────────────┘   └───────────────┘   │  return_date? │     │
//! │                                          └───────┬───────┘     │
//! │  ┌───────────────┐   ┌───────────────┐           │             │
//! │  │   Borrower    │   │     Role      │           │             │
//! │  │  ───────────  │   │  ───────────  │◄──────────┘             │
//! │  │  id, name     │   │  Member (3)   │                         │
//! │  │  role         │   │  Librarian(5) │                         │
//! │  │  borrowed[]   │   └───────────────┘                         │
//! │  └───────────────┘                                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Role Union
//! The original design used an abstract `Person` base with `User` and
//! `Librarian` subtypes. Here the role set is closed, so it is a tagged
//! union: shared fields live on [`Borrower`], role-specific data (the
//! access level) lives on the [`Role`] variant, and limits dispatch on
//! the discriminant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::{CATALOG_ACCESS_LEVEL, LIBRARIAN_MAX_BOOKS, LOAN_PERIOD_DAYS, MEMBER_MAX_BOOKS};

// =============================================================================
// Author
// =============================================================================

/// A book author.
///
/// Authors are created on first reference by a new book title (or by
/// explicit registration) and are never deleted: removing a book leaves
/// its author row behind, since other books may share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier (database row id).
    pub id: i64,

    /// Author name. Unique across the store, non-empty.
    pub name: String,

    /// Free-text biography. Mutable; set once at creation by the first
    /// writer and only changed through an explicit edit afterwards.
    pub bio: String,
}

impl Author {
    pub fn new(id: i64, name: impl Into<String>, bio: impl Into<String>) -> Self {
        Author {
            id,
            name: name.into(),
            bio: bio.into(),
        }
    }
}

// =============================================================================
// Book Status
// =============================================================================

/// Availability state of a book.
///
/// State machine: `Available --issue--> OnLoan --return--> Available`.
/// No other transitions exist. Invariant: a book is `Available` if and
/// only if no open loan references it.
///
/// Persisted as the text domain `"available"` / `"on-loan"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
pub enum BookStatus {
    Available,
    OnLoan,
}

impl BookStatus {
    /// The persisted text form of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::OnLoan => "on-loan",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Book
// =============================================================================

/// A catalogued book.
///
/// References exactly one [`Author`] (composition by reference: the
/// author may be shared by multiple books and outlives all of them).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier (database row id).
    pub id: i64,

    /// Title. Non-empty.
    pub title: String,

    /// The book's author, resolved at load time.
    pub author: Author,

    /// Publication year. Always positive.
    pub year: i64,

    /// Availability state.
    pub status: BookStatus,
}

impl Book {
    pub fn new(
        id: i64,
        title: impl Into<String>,
        author: Author,
        year: i64,
        status: BookStatus,
    ) -> Self {
        Book {
            id,
            title: title.into(),
            author,
            year,
            status,
        }
    }

    /// Updates the publication year in place.
    ///
    /// Fails with a validation error when `year <= 0`; the stored value
    /// is left untouched in that case.
    pub fn set_year(&mut self, year: i64) -> CoreResult<()> {
        if year <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "year".to_string(),
            }
            .into());
        }
        self.year = year;
        Ok(())
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }
}

// =============================================================================
// Borrower & Role
// =============================================================================

/// Role of a library account, with role-specific data on the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Regular member: may borrow up to [`MEMBER_MAX_BOOKS`] books.
    Member,

    /// Librarian: may borrow up to [`LIBRARIAN_MAX_BOOKS`] books and
    /// manage the catalog when `access_level >= 1`.
    Librarian { access_level: i64 },
}

/// A person known to the library: a member or a librarian.
///
/// The `borrowed` set holds the ids of currently held books. It is not
/// persisted as a column; the gateway reconstructs it from open loans on
/// every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    /// Unique identifier (database row id).
    pub id: i64,

    /// Display name. Non-empty.
    pub name: String,

    /// Member or librarian.
    pub role: Role,

    /// Ids of currently held books, in borrow order.
    borrowed: Vec<i64>,
}

impl Borrower {
    /// Creates a regular member with an empty held-set.
    pub fn new_member(id: i64, name: impl Into<String>) -> Self {
        Borrower {
            id,
            name: name.into(),
            role: Role::Member,
            borrowed: Vec::new(),
        }
    }

    /// Creates a librarian with an empty held-set.
    pub fn new_librarian(id: i64, name: impl Into<String>, access_level: i64) -> Self {
        Borrower {
            id,
            name: name.into(),
            role: Role::Librarian { access_level },
            borrowed: Vec::new(),
        }
    }

    /// Maximum concurrently held books for this role.
    pub fn max_books(&self) -> usize {
        match self.role {
            Role::Member => MEMBER_MAX_BOOKS,
            Role::Librarian { .. } => LIBRARIAN_MAX_BOOKS,
        }
    }

    /// Takes a book into the held-set.
    ///
    /// Succeeds iff the current count is below the role's limit. The
    /// failure is an ordinary outcome the caller must check, not a panic.
    pub fn borrow(&mut self, book_id: i64) -> CoreResult<()> {
        if self.borrowed.len() >= self.max_books() {
            return Err(CoreError::BorrowLimitReached {
                name: self.name.clone(),
                limit: self.max_books(),
            });
        }
        self.borrowed.push(book_id);
        Ok(())
    }

    /// Removes a book from the held-set.
    ///
    /// Succeeds iff the book is currently held.
    pub fn give_back(&mut self, book_id: i64) -> CoreResult<()> {
        match self.borrowed.iter().position(|&id| id == book_id) {
            Some(pos) => {
                self.borrowed.remove(pos);
                Ok(())
            }
            None => Err(CoreError::BookNotHeld { book_id }),
        }
    }

    /// Whether the given book is currently held.
    pub fn holds(&self, book_id: i64) -> bool {
        self.borrowed.contains(&book_id)
    }

    /// Ids of currently held books, in borrow order.
    pub fn borrowed_books(&self) -> &[i64] {
        &self.borrowed
    }

    /// Number of currently held books.
    pub fn borrowed_count(&self) -> usize {
        self.borrowed.len()
    }

    /// Whether this borrower may mutate the catalog.
    ///
    /// Members never can; librarians need `access_level >= 1`.
    pub fn can_manage_catalog(&self) -> bool {
        match self.role {
            Role::Member => false,
            Role::Librarian { access_level } => access_level >= CATALOG_ACCESS_LEVEL,
        }
    }

    /// Librarian access level, if any.
    pub fn access_level(&self) -> Option<i64> {
        match self.role {
            Role::Member => None,
            Role::Librarian { access_level } => Some(access_level),
        }
    }
}

// =============================================================================
// Loan
// =============================================================================

/// A lend/return record.
///
/// State machine: `Open (return_date absent) --return--> Closed`.
/// Closed is terminal; loans are never deleted or re-opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique identifier (database row id).
    pub id: i64,

    /// The book on loan.
    pub book_id: i64,

    /// The member holding it.
    pub user_id: i64,

    /// When the book was issued.
    pub issue_date: DateTime<Utc>,

    /// When the book came back. `None` means the loan is open.
    pub return_date: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn new(
        id: i64,
        book_id: i64,
        user_id: i64,
        issue_date: DateTime<Utc>,
        return_date: Option<DateTime<Utc>>,
    ) -> Self {
        Loan {
            id,
            book_id,
            user_id,
            issue_date,
            return_date,
        }
    }

    /// Whether the loan has no return date yet.
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// The date the book is due back.
    pub fn due_date(&self) -> DateTime<Utc> {
        self.issue_date + Duration::days(LOAN_PERIOD_DAYS)
    }

    /// Whether the loan is overdue at the given instant.
    ///
    /// A closed loan is never overdue, regardless of how late it came
    /// back. An open loan is overdue once `now` passes the due date.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.return_date {
            Some(_) => false,
            None => now > self.due_date(),
        }
    }

    /// Whether the loan is overdue right now.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    /// Records the return. Closed is terminal.
    pub fn close(&mut self, returned_at: DateTime<Utc>) {
        self.return_date = Some(returned_at);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_author() -> Author {
        Author::new(1, "Leo Tolstoy", "Russian novelist")
    }

    #[test]
    fn test_book_set_year() {
        let mut book = Book::new(1, "War and Peace", demo_author(), 1869, BookStatus::Available);

        assert!(book.set_year(1870).is_ok());
        assert_eq!(book.year, 1870);

        assert!(book.set_year(0).is_err());
        assert!(book.set_year(-5).is_err());
        // Failed update leaves the old value in place
        assert_eq!(book.year, 1870);
    }

    #[test]
    fn test_book_status_text() {
        assert_eq!(BookStatus::Available.as_str(), "available");
        assert_eq!(BookStatus::OnLoan.as_str(), "on-loan");
    }

    #[test]
    fn test_member_borrow_limit() {
        let mut member = Borrower::new_member(1, "Ivan Ivanov");

        for book_id in 1..=3 {
            assert!(member.borrow(book_id).is_ok());
        }
        assert_eq!(member.borrowed_count(), 3);

        // 4th book exceeds the member limit
        let err = member.borrow(4).unwrap_err();
        assert!(matches!(
            err,
            CoreError::BorrowLimitReached { limit: 3, .. }
        ));
        assert_eq!(member.borrowed_count(), 3);
    }

    #[test]
    fn test_librarian_borrow_limit() {
        let mut librarian = Borrower::new_librarian(1, "Head Librarian", 1);

        for book_id in 1..=5 {
            assert!(librarian.borrow(book_id).is_ok());
        }
        assert!(matches!(
            librarian.borrow(6).unwrap_err(),
            CoreError::BorrowLimitReached { limit: 5, .. }
        ));
    }

    #[test]
    fn test_give_back() {
        let mut member = Borrower::new_member(1, "Ivan Ivanov");
        member.borrow(7).unwrap();
        assert!(member.holds(7));

        assert!(member.give_back(7).is_ok());
        assert!(!member.holds(7));

        // Book not held anymore
        assert!(matches!(
            member.give_back(7).unwrap_err(),
            CoreError::BookNotHeld { book_id: 7 }
        ));
    }

    #[test]
    fn test_catalog_permission() {
        let member = Borrower::new_member(1, "Ivan Ivanov");
        assert!(!member.can_manage_catalog());

        let librarian = Borrower::new_librarian(2, "Head Librarian", 1);
        assert!(librarian.can_manage_catalog());
        assert_eq!(librarian.access_level(), Some(1));
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&Role::Member).unwrap();
        assert_eq!(json, r#"{"role":"member"}"#);

        let role = Role::Librarian { access_level: 2 };
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, r#"{"role":"librarian","access_level":2}"#);

        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&BookStatus::OnLoan).unwrap(),
            r#""on-loan""#
        );
        assert_eq!(
            serde_json::from_str::<BookStatus>(r#""available""#).unwrap(),
            BookStatus::Available
        );
    }

    #[test]
    fn test_loan_overdue_boundary() {
        let now = Utc::now();
        let period = Duration::days(LOAN_PERIOD_DAYS);

        // Issued 14 days + 1 second ago: overdue
        let loan = Loan::new(1, 1, 1, now - period - Duration::seconds(1), None);
        assert!(loan.is_overdue_at(now));

        // Issued 14 days - 1 second ago: not yet
        let loan = Loan::new(2, 1, 1, now - period + Duration::seconds(1), None);
        assert!(!loan.is_overdue_at(now));
    }

    #[test]
    fn test_closed_loan_never_overdue() {
        let now = Utc::now();
        let mut loan = Loan::new(1, 1, 1, now - Duration::days(100), None);
        assert!(loan.is_overdue_at(now));

        loan.close(now);
        assert!(!loan.is_open());
        assert!(!loan.is_overdue_at(now));
    }

    #[test]
    fn test_due_date() {
        let now = Utc::now();
        let loan = Loan::new(1, 1, 1, now, None);
        assert_eq!(loan.due_date(), now + Duration::days(14));
    }
}
