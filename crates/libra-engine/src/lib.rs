//! # libra-engine: Lending Engine for the Library Back Office
//!
//! The orchestration layer of Libra: validates every request, drives
//! the issue/return state machine through transactional storage writes,
//! and answers all reads from an in-memory entity graph kept identical
//! to durable state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Libra Architecture                         │
//! │                                                                 │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Presentation Layer (external)              │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │                                  │
//! │  ┌───────────────────────────▼─────────────────────────────┐   │
//! │  │            ★ libra-engine (THIS CRATE) ★                │   │
//! │  │                                                          │   │
//! │  │   ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  │   │
//! │  │   │ LendingEngine│  │ Authenticator│  │ EngineError  │  │   │
//! │  │   │ cache + ops  │  │ trait seam   │  │ typed surface│  │   │
//! │  │   └──────────────┘  └──────────────┘  └──────────────┘  │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │                                  │
//! │        libra-core (types) ── │ ── libra-db (SQLite gateway)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use libra_engine::{DbConfig, LendingEngine};
//!
//! let mut engine = LendingEngine::open(DbConfig::default()).await?;
//! let book = engine.add_book("War and Peace", "Leo Tolstoy", "bio", 1869).await?;
//! let user = engine.register_user("Ivan Ivanov").await?;
//! let loan = engine.issue_book(user.id, book.id).await?;
//! engine.return_book(loan.id).await?;
//! engine.close().await;
//! ```
//!
//! The engine is single-writer: mutations take `&mut self`, and the
//! host decides how to serialize access (typically one owner task).
//! Logging goes through `tracing`; the host installs the subscriber.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod engine;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{Authenticator, IdPresenceAuthenticator};
pub use engine::LendingEngine;
pub use error::{EngineError, EngineResult};

// Storage configuration, re-exported so hosts need only this crate
pub use libra_db::{Database, DbConfig};
