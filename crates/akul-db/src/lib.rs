//! # akul-db: Database Layer for Akul Library
//!
//! This crate provides persistence for the library back office.
//! It uses SQLite for storage with sqlx for async operations, and owns the
//! transactional issue/return workflow.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Akul Library Data Flow                           │
//! │                                                                         │
//! │  Admin command (issue --member 3 --book 7)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     akul-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │ │   │
//! │  │   │               │    │ Circulation    │    │ 001_initial  │ │   │
//! │  │   │ SqlitePool    │◄───│ Penalty        │    │ _schema.sql  │ │   │
//! │  │   │               │    │ Book, Member   │    │              │ │   │
//! │  │   │               │    │ Report, ...    │    │              │ │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘ │   │
//! │  │                                │ plan_issue / plan_return      │   │
//! │  │                                ▼                               │   │
//! │  │                     akul-core (pure rules)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/library.db                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use akul_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/library.db")).await?;
//!
//! let settings = db.settings().get().await?;
//! let recent = db.notifications().list_recent(50).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::author::AuthorRepository;
pub use repository::book::BookRepository;
pub use repository::circulation::{CirculationRepository, ReturnOutcome};
pub use repository::member::MemberRepository;
pub use repository::notification::NotificationRepository;
pub use repository::penalty::PenaltyRepository;
pub use repository::publisher::PublisherRepository;
pub use repository::report::ReportRepository;
pub use repository::settings::SettingsRepository;
