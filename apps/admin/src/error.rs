//! # API Error Type
//!
//! Unified error type returned by every admin command.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  akul-admin return 12                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command handler → Result<T, ApiError>                           │  │
//! │  │         │                                                        │  │
//! │  │  DbError::NotFound ────────────────► NOT_FOUND                   │  │
//! │  │  DbError::Rejected(AlreadyReturned) ► ALREADY_RETURNED           │  │
//! │  │  DbError::QueryFailed ─── logged ──► DATABASE_ERROR (generic)    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stderr: {"code":"ALREADY_RETURNED","message":"..."}  exit 1           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use akul_core::{CoreError, ValidationError};
use akul_db::DbError;
use serde::Serialize;

use crate::config::ConfigError;

/// Error reported by a failed command.
///
/// ```json
/// {
///   "code": "NO_COPIES_AVAILABLE",
///   "message": "No copies of 'Dune' available (book 7)"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced row does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Every copy is on loan
    NoCopiesAvailable,

    /// Loan already returned
    AlreadyReturned,

    /// Member holds the maximum number of loans
    LoanLimitReached,

    /// No member matched the manual penalty lookup
    MemberUnresolved,

    /// Process configuration is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::CheckViolation { constraint } => ApiError::validation(format!(
                "Value out of range ({})",
                constraint
            )),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Rejected(e) => ApiError::from(e),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::NoCopiesAvailable { .. } => {
                ApiError::new(ErrorCode::NoCopiesAvailable, message)
            }
            CoreError::AlreadyReturned { .. } => ApiError::new(ErrorCode::AlreadyReturned, message),
            CoreError::LoanLimitReached { .. } => {
                ApiError::new(ErrorCode::LoanLimitReached, message)
            }
            CoreError::MemberUnresolved { .. } => {
                ApiError::new(ErrorCode::MemberUnresolved, message)
            }
            CoreError::AmountMissing
            | CoreError::InvalidDate { .. }
            | CoreError::DueDateOutOfRange { .. }
            | CoreError::FineOverflow { .. } => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON encoding failed: {}", err);
        ApiError::internal("Failed to encode output")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_keep_their_code() {
        let err = ApiError::from(DbError::Rejected(CoreError::AlreadyReturned {
            circulation_id: 4,
        }));
        assert_eq!(err.code, ErrorCode::AlreadyReturned);
        assert_eq!(err.message, "Circulation 4 is already returned");
    }

    #[test]
    fn test_overflowing_settings_surface_as_validation() {
        let err = ApiError::from(DbError::Rejected(CoreError::FineOverflow {
            days: 19,
            rate: akul_core::Money::from_cents(1000),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ApiError::from(DbError::QueryFailed("no such column: foo".to_string()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("foo"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Book", "7");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"NOT_FOUND","message":"Book not found: 7"}"#);
    }
}
