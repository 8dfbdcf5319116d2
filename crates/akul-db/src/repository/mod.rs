//! # Repository Module
//!
//! Database repository implementations for the library back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Admin command                                                         │
//! │       │                                                                 │
//! │       │  db.circulations().return_book(12, today, &policy)             │
//! │       ▼                                                                 │
//! │  CirculationRepository                                                 │
//! │  ├── BEGIN                                                              │
//! │  ├── load rows            ──► akul-core plan_return()                  │
//! │  ├── apply plan (UPDATE / INSERT)                                      │
//! │  ├── notification::append (same transaction)                           │
//! │  └── COMMIT   (any Err before this drops the transaction)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Helpers that must join a caller's transaction take
//! `&mut SqliteConnection` (pass `&mut *tx`).
//!
//! ## Available Repositories
//!
//! - [`SettingsRepository`](settings::SettingsRepository) - Singleton settings row
//! - [`NotificationRepository`](notification::NotificationRepository) - Rolling log of 50
//! - [`AuthorRepository`](author::AuthorRepository) - Authors with book counts
//! - [`PublisherRepository`](publisher::PublisherRepository) - Publishers
//! - [`BookRepository`](book::BookRepository) - Catalogue and inventory
//! - [`MemberRepository`](member::MemberRepository) - Members
//! - [`CirculationRepository`](circulation::CirculationRepository) - Issue and return
//! - [`PenaltyRepository`](penalty::PenaltyRepository) - Penalty ledger
//! - [`ReportRepository`](report::ReportRepository) - Charts, tables, export, dashboard

pub mod author;
pub mod book;
pub mod circulation;
pub mod member;
pub mod notification;
pub mod penalty;
pub mod publisher;
pub mod report;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{Database, DbConfig};
    use akul_core::{Author, Book, BookDraft, Member, MemberDraft, Publisher};
    use chrono::NaiveDate;

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub async fn author(db: &Database, name: &str) -> Author {
        db.authors().create(name, None).await.unwrap()
    }

    pub async fn publisher(db: &Database, name: &str) -> Publisher {
        db.publishers().create(name, None).await.unwrap()
    }

    /// Book with its own author and publisher.
    pub async fn book(db: &Database, title: &str, isbn: &str, copies: i64) -> Book {
        let author = author(db, &format!("{} author", title)).await;
        let publisher = publisher(db, &format!("{} press", title)).await;
        db.books()
            .create(&BookDraft {
                title: title.to_string(),
                author_id: Some(author.id),
                publisher_id: Some(publisher.id),
                isbn: isbn.to_string(),
                quantity: copies,
                available_quantity: copies,
                thumbnail_link: None,
            })
            .await
            .unwrap()
    }

    pub async fn member(db: &Database, name: &str) -> Member {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        db.members()
            .create(
                &MemberDraft {
                    name: name.to_string(),
                    email,
                    phone: "555-0100".to_string(),
                    address: "1 Elm Street".to_string(),
                },
                date(2024, 1, 1),
            )
            .await
            .unwrap()
    }
}
