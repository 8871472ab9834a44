//! # Engine Error Types
//!
//! The error surface callers of the engine see. Every refused operation
//! names its reason as a variant; presentation layers match on the
//! variant, not on message strings.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Error Propagation                           │
//! │                                                                 │
//! │  ValidationError ──┐                                            │
//! │                    ├──► EngineError ──► caller                  │
//! │  DbError ──────────┘                                            │
//! │                                                                 │
//! │  Plus the engine's own refusals: unknown ids, unavailable       │
//! │  books, capacity limits, double returns, in-use deletions.      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use libra_core::ValidationError;
use libra_db::DbError;

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input failed validation before any storage write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The book exists but is already on loan.
    #[error("book {book_id} is not available")]
    BookUnavailable { book_id: i64 },

    /// The user already holds their role's maximum number of books.
    #[error("{name} has reached the borrow limit of {limit}")]
    BorrowLimitReached { name: String, limit: usize },

    /// The loan was already returned; closed is terminal.
    #[error("loan {loan_id} is already closed")]
    LoanAlreadyClosed { loan_id: i64 },

    /// Deletion refused: loans still reference the entity.
    #[error("{entity} {id} is referenced by loans and cannot be deleted")]
    EntityInUse { entity: &'static str, id: i64 },

    /// Storage-level failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl EngineError {
    /// Whether this error is an expected business refusal rather than a
    /// storage failure. Refusals are logged at `warn`, failures at
    /// `error`.
    pub fn is_refusal(&self) -> bool {
        !matches!(self, EngineError::Db(err) if !err.is_constraint_violation())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::NotFound {
            entity: "book",
            id: 42,
        };
        assert_eq!(err.to_string(), "book not found: 42");

        let err = EngineError::BookUnavailable { book_id: 7 };
        assert_eq!(err.to_string(), "book 7 is not available");

        let err = EngineError::LoanAlreadyClosed { loan_id: 3 };
        assert_eq!(err.to_string(), "loan 3 is already closed");
    }

    #[test]
    fn test_refusal_classification() {
        assert!(EngineError::BookUnavailable { book_id: 1 }.is_refusal());
        assert!(EngineError::EntityInUse {
            entity: "user",
            id: 1
        }
        .is_refusal());

        let storage = EngineError::Db(DbError::ConnectionFailed("down".to_string()));
        assert!(!storage.is_refusal());
    }
}
