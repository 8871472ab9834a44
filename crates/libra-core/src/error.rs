//! # Error Types
//!
//! Domain-specific error types for libra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Error Types                              │
//! │                                                                 │
//! │  libra-core errors (this file)                                  │
//! │  ├── CoreError        - Local rule violations                   │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  libra-db errors (separate crate)                               │
//! │  └── DbError          - Storage operation failures              │
//! │                                                                 │
//! │  libra-engine errors                                            │
//! │  └── EngineError      - What the presentation layer sees        │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → EngineError → caller       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (book id, limit, etc.)
//! 3. Errors are enum variants, never String
//! 4. Capacity failures are normal outcomes the caller must check,
//!    not exceptional conditions

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Local domain-rule violations.
///
/// These represent business outcomes the caller is expected to handle,
/// such as a borrower reaching their book limit.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Borrower already holds their maximum number of books.
    ///
    /// ## When This Occurs
    /// - A member tries to take a 4th book (limit 3)
    /// - A librarian tries to take a 6th book (limit 5)
    #[error("{name} already holds the maximum of {limit} books")]
    BorrowLimitReached { name: String, limit: usize },

    /// Borrower does not currently hold the given book.
    #[error("book {book_id} is not held by this borrower")]
    BookNotHeld { book_id: i64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when caller-supplied data has the wrong shape, before any
/// business logic or storage write runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::BorrowLimitReached {
            name: "Ivan Ivanov".to_string(),
            limit: 3,
        };
        assert_eq!(
            err.to_string(),
            "Ivan Ivanov already holds the maximum of 3 books"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::MustBePositive {
            field: "year".to_string(),
        };
        assert_eq!(err.to_string(), "year must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
