//! # libra-db: Database Layer for the Lending Library
//!
//! Persistence gateway between the lending engine and SQLite. Translates
//! engine operations into durable storage and reconstructs the full
//! entity graph on startup.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Libra Data Flow                            │
//! │                                                                 │
//! │  Engine operation (issue_book)                                  │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌───────────────────────────────────────────────────────────┐ │
//! │  │                  libra-db (THIS CRATE)                    │ │
//! │  │                                                           │ │
//! │  │   ┌─────────────┐   ┌──────────────┐   ┌──────────────┐  │ │
//! │  │   │  Database   │   │ Repositories │   │  Migrations  │  │ │
//! │  │   │  (pool.rs)  │◄──│ author, book │   │  (embedded)  │  │ │
//! │  │   │             │   │ borrower,    │   │ 0001_init.sql│  │ │
//! │  │   │ SqlitePool  │   │ loan         │   │              │  │ │
//! │  │   └─────────────┘   └──────────────┘   └──────────────┘  │ │
//! │  │                                                           │ │
//! │  │   ┌─────────────────────────────────────────────────────┐ │ │
//! │  │   │ snapshot: full reload + orphan reconciliation       │ │ │
//! │  │   └─────────────────────────────────────────────────────┘ │ │
//! │  └───────────────────────────────────────────────────────────┘ │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite database file (default: library.db)                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations per aggregate
//! - [`snapshot`] - Full-set reload with a reconciliation report
//! - [`seed`] - First-run demo data
//!
//! ## Transaction Contract
//!
//! Every logical operation that touches more than one row commits as a
//! single transaction or not at all: issue (loan insert + status flip),
//! return (return-date set + status flip), add-book (author upsert +
//! book insert), edit-book (all provided field updates). Nothing may
//! leave a book's status disagreeing with the existence of an open loan
//! referencing it.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::seed_demo_data;
pub use snapshot::{DroppedRecord, ReconciliationReport, Snapshot};

// Repository re-exports for convenience
pub use repository::author::AuthorRepository;
pub use repository::book::BookRepository;
pub use repository::borrower::BorrowerRepository;
pub use repository::loan::LoanRepository;
