//! # Validation Module
//!
//! Input validation rules for the lending library.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Validation Layers                           │
//! │                                                                 │
//! │  Layer 1: Presentation (external)                               │
//! │  ├── Basic format checks, immediate feedback                    │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 2: Engine operation (Rust)                               │
//! │  └── THIS MODULE: shape checks before any write                 │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 3: Database (SQLite)                                     │
//! │  ├── NOT NULL / UNIQUE constraints                              │
//! │  ├── CHECK(year > 0), CHECK(access_level > 0)                   │
//! │  └── Foreign key constraints                                    │
//! │                                                                 │
//! │  Defense in depth: each layer catches different mistakes        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound accepted for a publication year.
pub const MAX_YEAR: i64 = 2100;

// =============================================================================
// String Validators
// =============================================================================

fn validate_non_empty(value: &str, field: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a book title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 300 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    validate_non_empty(title, "title", 300)
}

/// Validates an author name.
///
/// Uniqueness is enforced by the store, not here.
pub fn validate_author_name(name: &str) -> ValidationResult<()> {
    validate_non_empty(name, "author name", 200)
}

/// Validates a member or librarian name.
pub fn validate_person_name(name: &str) -> ValidationResult<()> {
    validate_non_empty(name, "name", 200)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a publication year.
///
/// ## Rules
/// - Must be positive (the store also enforces `CHECK(year > 0)`)
/// - Must not exceed [`MAX_YEAR`]
///
/// ## Example
/// ```rust
/// use libra_core::validation::validate_year;
///
/// assert!(validate_year(1869).is_ok());
/// assert!(validate_year(0).is_err());
/// assert!(validate_year(3000).is_err());
/// ```
pub fn validate_year(year: i64) -> ValidationResult<()> {
    if year <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "year".to_string(),
        });
    }

    if year > MAX_YEAR {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 1,
            max: MAX_YEAR,
        });
    }

    Ok(())
}

/// Validates a librarian access level.
///
/// Level 1 is the only enforced tier today; anything >= 1 is accepted.
pub fn validate_access_level(level: i64) -> ValidationResult<()> {
    if level < 1 {
        return Err(ValidationError::MustBePositive {
            field: "access level".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
