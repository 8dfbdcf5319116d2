//! # Domain Types
//!
//! Core domain types used throughout the library back office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐                │
//! │  │   Author     │   │  Publisher   │   │    Member    │                │
//! │  └──────┬───────┘   └──────┬───────┘   │  joined_date │                │
//! │         │  1..n            │ 1..n      └──┬────────┬──┘                │
//! │         ▼                  ▼              │        │                    │
//! │  ┌─────────────────────────────────┐      │        │                    │
//! │  │             Book                │      │        │                    │
//! │  │  isbn (unique)                  │      │        │                    │
//! │  │  quantity / available_quantity  │      │        │                    │
//! │  └──────┬───────────────────┬──────┘      │        │                    │
//! │         │ CASCADE           │ SET NULL    │        │                    │
//! │         ▼                   ▼             ▼        ▼                    │
//! │  ┌──────────────────┐   ┌──────────────────────────────┐               │
//! │  │   Circulation    │   │          Penalty             │               │
//! │  │  issued→returned │   │  amount survives book delete │               │
//! │  └──────────────────┘   └──────────────────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by a database-assigned `i64` row id. Business keys
//! (ISBN, member email) are unique but mutable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Author & Publisher
// =============================================================================

/// A book author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
}

/// An author together with the number of books they wrote.
///
/// Listed on the authors screen, most prolific first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuthorSummary {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub book_count: i64,
}

/// A publishing house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
}

// =============================================================================
// Book
// =============================================================================

/// A title in the catalogue with its copy counts.
///
/// ## Inventory Invariant
/// `0 <= available_quantity <= quantity` after every issue and return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub publisher_id: i64,
    /// International Standard Book Number, unique across the catalogue.
    pub isbn: String,
    /// Total copies owned.
    pub quantity: i64,
    /// Copies currently on the shelf.
    pub available_quantity: i64,
    pub thumbnail_link: Option<String>,
}

impl Book {
    /// Checks if at least one copy is on the shelf.
    #[inline]
    pub fn can_issue(&self) -> bool {
        self.available_quantity > 0
    }

    /// Copies currently out on loan.
    #[inline]
    pub fn on_loan(&self) -> i64 {
        self.quantity - self.available_quantity
    }
}

/// Input for creating or editing a book.
///
/// Author and publisher are optional here so that a missing selection is
/// reported as a validation error instead of a deserialisation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookDraft {
    pub title: String,
    pub author_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub isbn: String,
    pub quantity: i64,
    pub available_quantity: i64,
    pub thumbnail_link: Option<String>,
}

// =============================================================================
// Member
// =============================================================================

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Member {
    pub id: i64,
    pub name: String,
    /// Unique across members.
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Set once at registration, never updated.
    #[ts(as = "String")]
    pub joined_date: NaiveDate,
}

/// Input for registering or editing a member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

// =============================================================================
// Circulation
// =============================================================================

/// Stored status of a loan.
///
/// `Overdue` exists for compatibility with older rows but no transition
/// produces it. Overdue-ness is derived, see [`Circulation::is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CirculationStatus {
    /// Book is out with the member.
    Issued,
    /// Book came back; terminal.
    Returned,
    /// Declared, never assigned.
    Overdue,
}

impl CirculationStatus {
    /// Display label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            CirculationStatus::Issued => "Issued",
            CirculationStatus::Returned => "Returned",
            CirculationStatus::Overdue => "Overdue",
        }
    }
}

impl Default for CirculationStatus {
    fn default() -> Self {
        CirculationStatus::Issued
    }
}

/// One loan of one book to one member.
///
/// ## Lifecycle
/// ```text
///   issue()                 return_book()
///  ────────►  Issued  ─────────────────────►  Returned (terminal)
///               │
///               └── is_overdue(today) = due_date < today   (derived, never stored)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Circulation {
    pub id: i64,
    pub member_id: i64,
    pub book_id: i64,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    /// issue_date + loan duration at the time of issue. Fixed thereafter.
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub return_date: Option<NaiveDate>,
    pub status: CirculationStatus,
    /// Fine charged on return, zero when returned on time.
    pub fine_cents: i64,
    pub remarks: Option<String>,
}

impl Circulation {
    /// Returns the fine as Money.
    #[inline]
    pub fn fine(&self) -> Money {
        Money::from_cents(self.fine_cents)
    }

    /// Checks if the loan is still out past its due date.
    ///
    /// ## Example
    /// ```rust
    /// use akul_core::{Circulation, CirculationStatus};
    /// use chrono::NaiveDate;
    ///
    /// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
    /// let loan = Circulation {
    ///     id: 1, member_id: 1, book_id: 1,
    ///     issue_date: d(1, 1), due_date: d(1, 15), return_date: None,
    ///     status: CirculationStatus::Issued, fine_cents: 0, remarks: None,
    /// };
    /// assert!(!loan.is_overdue(d(1, 15)));
    /// assert!(loan.is_overdue(d(1, 16)));
    /// ```
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.status, self.due_date, today)
    }

    /// Status as shown to operators: issued loans past due read as overdue.
    pub fn effective_status(&self, today: NaiveDate) -> CirculationStatus {
        effective_status(self.status, self.due_date, today)
    }
}

/// Overdue predicate shared by [`Circulation`] and report rows.
pub fn is_overdue(status: CirculationStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == CirculationStatus::Issued && due_date < today
}

/// Derived status shared by [`Circulation`] and report rows.
pub fn effective_status(
    status: CirculationStatus,
    due_date: NaiveDate,
    today: NaiveDate,
) -> CirculationStatus {
    if is_overdue(status, due_date, today) {
        CirculationStatus::Overdue
    } else {
        status
    }
}

// =============================================================================
// Penalty
// =============================================================================

/// Payment status of a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyStatus {
    Paid,
    Unpaid,
}

impl PenaltyStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PenaltyStatus::Paid => "Paid",
            PenaltyStatus::Unpaid => "Unpaid",
        }
    }
}

impl Default for PenaltyStatus {
    fn default() -> Self {
        PenaltyStatus::Unpaid
    }
}

/// A fine owed by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Penalty {
    pub id: i64,
    pub member_id: i64,
    /// Nulled when the book is deleted; the amount stays owed.
    pub book_id: Option<i64>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub days_overdue: i64,
    pub amount_cents: i64,
    pub reason: String,
    pub status: PenaltyStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Penalty {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A penalty joined with the names shown on the penalties screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PenaltyListing {
    pub id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub book_id: Option<i64>,
    pub book_title: Option<String>,
    pub days_overdue: i64,
    pub amount_cents: i64,
    pub reason: String,
    pub status: PenaltyStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Notification
// =============================================================================

/// One line of the rolling notification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline counters for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_members: i64,
    /// Loans with stored status issued (overdue ones included).
    pub issued_count: i64,
    /// Sum of available_quantity over all books.
    pub available_copies: i64,
    pub overdue_count: i64,
    pub unread_notifications: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
