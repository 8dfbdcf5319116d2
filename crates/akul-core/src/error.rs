//! # Error Types
//!
//! Domain-specific error types for akul-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  akul-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule refusals                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  akul-db errors (separate crate)                                       │
//! │  └── DbError          - Database failures, NotFound, Rejected(Core)    │
//! │                                                                         │
//! │  admin app errors                                                      │
//! │  └── ApiError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Operator     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every refusal here leaves stored state untouched: the caller rolls back
//! or never starts the write.

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule refusals.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Every copy of the title is already on loan.
    ///
    /// ## User Workflow
    /// ```text
    /// Issue "Dune" to Alice
    ///      │
    ///      ▼
    /// Check shelf: available_quantity = 0
    ///      │
    ///      ▼
    /// NoCopiesAvailable { book_id: 7, title: "Dune" }
    ///      │
    ///      ▼
    /// No circulation row, availability unchanged
    /// ```
    #[error("No copies of '{title}' available (book {book_id})")]
    NoCopiesAvailable { book_id: i64, title: String },

    /// The loan was already returned; a second return does nothing.
    #[error("Circulation {circulation_id} is already returned")]
    AlreadyReturned { circulation_id: i64 },

    /// Member already holds the configured maximum of loans.
    ///
    /// Only raised when loan-limit enforcement is switched on.
    #[error("Member {member_id} already has {active} books on loan (limit {max})")]
    LoanLimitReached { member_id: i64, active: i64, max: i64 },

    /// No member matched any step of the lookup strategy.
    #[error("No member matches '{input}'")]
    MemberUnresolved { input: String },

    /// Manual penalty submitted without an amount.
    #[error("Penalty amount is required")]
    AmountMissing,

    /// The loan duration pushes the due date past the supported calendar.
    #[error("Due date out of range: {issue_date} plus {days} days")]
    DueDateOutOfRange { issue_date: NaiveDate, days: i64 },

    /// The overdue fine does not fit in the money type.
    #[error("Fine for {days} days at {rate} per day is too large")]
    FineOverflow { days: i64, rate: Money },

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before anything is written.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed amount, email without '@').
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate ISBN).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
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
        let err = CoreError::NoCopiesAvailable {
            book_id: 7,
            title: "Dune".to_string(),
        };
        assert_eq!(err.to_string(), "No copies of 'Dune' available (book 7)");

        let err = CoreError::LoanLimitReached {
            member_id: 3,
            active: 3,
            max: 3,
        };
        assert_eq!(
            err.to_string(),
            "Member 3 already has 3 books on loan (limit 3)"
        );

        let err = CoreError::FineOverflow {
            days: 19,
            rate: Money::from_cents(1050),
        };
        assert_eq!(err.to_string(), "Fine for 19 days at 10.50 per day is too large");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::Duplicate {
            field: "isbn".to_string(),
            value: "9780441013593".to_string(),
        };
        assert_eq!(err.to_string(), "isbn '9780441013593' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "isbn".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
