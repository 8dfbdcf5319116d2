//! # Validation Module
//!
//! Input validation for catalogue and member forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin command (Rust)                                         │
//! │  ├── Argument parsing (clap)                                           │
//! │  └── THIS MODULE: required fields, lengths, copy counts                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Repository                                                   │
//! │  └── Existence checks (author, publisher), duplicate ISBN pre-check    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (isbn, email)                                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use akul_core::validation::{validate_isbn, validate_quantities};
//!
//! validate_isbn("9780441013593").unwrap();
//! validate_quantities(3, 2).unwrap();
//! assert!(validate_quantities(3, 4).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{BookDraft, MemberDraft};
use crate::MAX_ISBN_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_QUERY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required short text such as a title or a name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use akul_core::validation::validate_name;
///
/// assert!(validate_name("title", "Dune").is_ok());
/// assert!(validate_name("title", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an ISBN: required, at most 13 characters.
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let isbn = isbn.trim();

    if isbn.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn".to_string(),
        });
    }

    if isbn.chars().count() > MAX_ISBN_LEN {
        return Err(ValidationError::TooLong {
            field: "isbn".to_string(),
            max: MAX_ISBN_LEN,
        });
    }

    Ok(())
}

/// Validates a member email address.
///
/// Only the shape `local@domain` is checked.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected local@domain".to_string(),
        }),
    }
}

/// Validates an optional thumbnail link.
pub fn validate_link(link: Option<&str>) -> ValidationResult<()> {
    match link.map(str::trim) {
        None | Some("") => Ok(()),
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "thumbnail_link".to_string(),
            reason: "must be an http(s) URL".to_string(),
        }),
    }
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates copy counts: `0 <= available <= quantity`.
pub fn validate_quantities(quantity: i64, available: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if available < 0 || available > quantity {
        return Err(ValidationError::OutOfRange {
            field: "available_quantity".to_string(),
            min: 0,
            max: quantity,
        });
    }

    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates a book form and returns the selected `(author_id, publisher_id)`.
///
/// ## Example
/// ```rust
/// use akul_core::types::BookDraft;
/// use akul_core::validation::validate_book_draft;
///
/// let draft = BookDraft {
///     title: "Dune".into(),
///     author_id: Some(1),
///     publisher_id: None,
///     isbn: "9780441013593".into(),
///     quantity: 1,
///     available_quantity: 1,
///     thumbnail_link: None,
/// };
/// assert!(validate_book_draft(&draft).is_err());
/// ```
pub fn validate_book_draft(draft: &BookDraft) -> ValidationResult<(i64, i64)> {
    validate_name("title", &draft.title)?;

    let author_id = draft.author_id.ok_or_else(|| ValidationError::Required {
        field: "author".to_string(),
    })?;
    let publisher_id = draft.publisher_id.ok_or_else(|| ValidationError::Required {
        field: "publisher".to_string(),
    })?;

    validate_isbn(&draft.isbn)?;
    validate_quantities(draft.quantity, draft.available_quantity)?;
    validate_link(draft.thumbnail_link.as_deref())?;

    Ok((author_id, publisher_id))
}

/// Validates a member form.
pub fn validate_member_draft(draft: &MemberDraft) -> ValidationResult<()> {
    validate_name("name", &draft.name)?;
    validate_email(&draft.email)
}

// =============================================================================
// Unit Tests
// =============================================================================
