//! # libra-core: Pure Domain Model for the Lending Library
//!
//! This crate is the **heart** of Libra. It contains the entity model
//! and its local invariants as pure types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Libra Architecture                         │
//! │                                                                 │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Presentation Layer (external)              │   │
//! │  │    forms ──► menus ──► screens (out of scope here)      │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │                                  │
//! │  ┌───────────────────────────▼─────────────────────────────┐   │
//! │  │                   libra-engine                           │   │
//! │  │    add_book, issue_book, return_book, authenticate       │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │                                  │
//! │  ┌───────────────────────────▼─────────────────────────────┐   │
//! │  │             ★ libra-core (THIS CRATE) ★                 │   │
//! │  │                                                          │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────┐ │   │
//! │  │   │  types   │  │  types   │  │  error   │  │validation│ │  │
//! │  │   │  Author  │  │ Borrower │  │ typed    │  │  rules   │ │  │
//! │  │   │  Book    │  │  Loan    │  │ failures │  │  checks  │ │  │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └─────────┘ │   │
//! │  │                                                          │   │
//! │  │   NO I/O • NO DATABASE • PURE TYPES AND RULES            │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │                                  │
//! │  ┌───────────────────────────▼─────────────────────────────┐   │
//! │  │                    libra-db                              │   │
//! │  │      SQLite schema, repositories, transactions           │   │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Author, Book, Borrower, Loan)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure types**: same input, same output; nothing here touches a clock
//!    except through an explicit `now` parameter (convenience wrappers that
//!    read `Utc::now()` delegate to the explicit form)
//! 2. **No I/O**: database and filesystem access are FORBIDDEN here
//! 3. **Explicit errors**: failures are typed enum variants, never panics
//! 4. **Closed role set**: User and Librarian are variants of one
//!    [`types::Role`] union, not an open subtype hierarchy

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::{Author, Book, BookStatus, Borrower, Loan, Role};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum books a regular member may hold at once.
pub const MEMBER_MAX_BOOKS: usize = 3;

/// Maximum books a librarian may hold at once.
pub const LIBRARIAN_MAX_BOOKS: usize = 5;

/// Fixed loan period in days. An open loan becomes overdue once the
/// current time passes `issue_date + LOAN_PERIOD_DAYS`.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Minimum access level required for every catalog-mutation operation.
///
/// Only one tier is enforced today; the field exists so future tiers can
/// gate finer-grained permissions without a schema change.
pub const CATALOG_ACCESS_LEVEL: i64 = 1;
