//! # akul-core: Pure Business Logic for Akul Library
//!
//! This crate is the **heart** of the library back office. It contains the
//! circulation rules, fine arithmetic and reporting math as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Akul Library Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator CLI / Web admin panel                  │   │
//! │  │     issue ──► return ──► penalties ──► dashboard ──► report     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ akul-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌─────────────┐ ┌──────────┐ ┌───────────────┐  │   │
//! │  │  │  types   │ │ circulation │ │ penalty  │ │   reporting   │  │   │
//! │  │  │  Book    │ │  due dates  │ │ member   │ │ chart buckets │  │   │
//! │  │  │  Member  │ │  fines      │ │ lookup   │ │ tabulation    │  │   │
//! │  │  └──────────┘ └─────────────┘ └──────────┘ └───────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    akul-db (Database Layer)                     │   │
//! │  │          SQLite queries, migrations, transactional workflow     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Book, Member, Circulation, Penalty, ...)
//! - [`settings`] - Library settings value object and enforcement policy
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`circulation`] - Issue/return planning: due dates and overdue fines
//! - [`penalty`] - Manual penalty requests and member lookup strategy
//! - [`notification`] - Notification log capacity and message wording
//! - [`reporting`] - Chart buckets, circulation tabulation, report export
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use akul_core::circulation::{compute_fine, due_date, overdue_days};
//! use akul_core::{LibrarySettings, Money};
//! use chrono::NaiveDate;
//!
//! let settings = LibrarySettings::default();
//! let issued = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let due = due_date(issued, settings.loan_duration_days).unwrap();
//! assert_eq!(due, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
//!
//! let returned = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
//! let days = overdue_days(due, returned);
//! assert_eq!(days, 5);
//! assert_eq!(
//!     compute_fine(days, settings.penalty_per_day()).unwrap(),
//!     Money::from_cents(5000)
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod circulation;
pub mod error;
pub mod money;
pub mod notification;
pub mod penalty;
pub mod reporting;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use settings::{EnforcementPolicy, LibrarySettings, SettingsUpdate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of entries kept in the notification log.
///
/// Appending beyond this evicts the oldest entries.
pub const NOTIFICATION_CAPACITY: usize = 50;

/// Maximum ISBN length (ISBN-13 without separators).
pub const MAX_ISBN_LEN: usize = 13;

/// Date format used for every date that leaves the system (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
