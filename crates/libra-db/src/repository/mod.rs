//! # Repository Module
//!
//! Repository implementations, one per aggregate.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Engine operation                                               │
//! │       │                                                         │
//! │       │  db.loans().issue(book_id, user_id, now)                │
//! │       ▼                                                         │
//! │  LoanRepository                                                 │
//! │  ├── issue: INSERT loan + flip book status (ONE transaction)    │
//! │  ├── close: set return_date + flip status (ONE transaction)     │
//! │  └── list_rows: feed for the snapshot loader                    │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite database                                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL is isolated here; the engine never sees a query string. Any
//! operation spanning more than one table lives in the repository that
//! owns the primary row and runs inside a single transaction.
//!
//! ## Available Repositories
//!
//! - [`author::AuthorRepository`] - Read-side author listing
//! - [`book::BookRepository`] - Catalog CRUD, author-upsert insert
//! - [`borrower::BorrowerRepository`] - Users and librarians
//! - [`loan::LoanRepository`] - Issue/close state transitions

pub mod author;
pub mod book;
pub mod borrower;
pub mod loan;
