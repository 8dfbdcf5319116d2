//! # Seed Data Generator
//!
//! Populates the database with a small demo catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/library.db (default)
//! cargo run -p akul-db --bin seed
//!
//! # Specify database path
//! cargo run -p akul-db --bin seed -- --db ./demo.db
//! ```
//!
//! ## Generated Data
//! - One author and publisher per classic below
//! - One book per title, 1-4 copies, ISBN-13 from a fixed range
//! - Members with `<name>@example.com` addresses, joined over the last
//!   six months so the dashboard charts have something to show

use std::path::PathBuf;

use akul_core::{BookDraft, MemberDraft};
use akul_db::{Database, DbConfig};
use chrono::{Duration, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// (title, author, publisher)
const CLASSICS: &[(&str, &str, &str)] = &[
    ("Pride and Prejudice", "Jane Austen", "T. Egerton"),
    ("Emma", "Jane Austen", "John Murray"),
    ("Dune", "Frank Herbert", "Chilton Books"),
    ("Nineteen Eighty-Four", "George Orwell", "Secker & Warburg"),
    ("Animal Farm", "George Orwell", "Secker & Warburg"),
    ("The Hobbit", "J. R. R. Tolkien", "George Allen & Unwin"),
    ("Moby-Dick", "Herman Melville", "Harper & Brothers"),
    ("Middlemarch", "George Eliot", "William Blackwood and Sons"),
    ("Things Fall Apart", "Chinua Achebe", "William Heinemann"),
    ("Beloved", "Toni Morrison", "Alfred A. Knopf"),
];

const MEMBERS: &[&str] = &[
    "Alice Johnson",
    "Bob Smith",
    "Carol Diaz",
    "David Chen",
    "Eve Okafor",
    "Frank Novak",
];

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Akul Library seed data generator")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./data/library.db")]
    db: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,akul=debug,sqlx=warn")),
        )
        .init();

    let args = Args::parse();

    if let Some(parent) = args.db.parent() {
        std::fs::create_dir_all(parent)?;
    }

    println!("🌱 Akul Library Seed Data Generator");
    println!("===================================");
    println!("Database: {}", args.db.display());
    println!();

    let db = Database::new(DbConfig::new(&args.db)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.books().list(None).await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} books", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut authors: Vec<(String, i64)> = Vec::new();
    let mut publishers: Vec<(String, i64)> = Vec::new();
    let mut books = 0;

    for (index, (title, author_name, publisher_name)) in CLASSICS.iter().enumerate() {
        let author_id = match authors.iter().find(|(name, _)| name == author_name) {
            Some((_, id)) => *id,
            None => {
                let author = db.authors().create(author_name, None).await?;
                authors.push((author.name, author.id));
                author.id
            }
        };
        let publisher_id = match publishers.iter().find(|(name, _)| name == publisher_name) {
            Some((_, id)) => *id,
            None => {
                let publisher = db.publishers().create(publisher_name, None).await?;
                publishers.push((publisher.name, publisher.id));
                publisher.id
            }
        };

        let copies = 1 + (index as i64 % 4);
        let draft = BookDraft {
            title: title.to_string(),
            author_id: Some(author_id),
            publisher_id: Some(publisher_id),
            isbn: format!("978000000{:04}", index),
            quantity: copies,
            available_quantity: copies,
            thumbnail_link: None,
        };

        match db.books().create(&draft).await {
            Ok(_) => books += 1,
            Err(e) => eprintln!("Failed to insert {}: {}", title, e),
        }
    }

    let today = Utc::now().date_naive();
    for (index, name) in MEMBERS.iter().enumerate() {
        let email = format!(
            "{}@example.com",
            name.to_lowercase().replace(' ', ".")
        );
        let draft = MemberDraft {
            name: name.to_string(),
            email,
            phone: format!("555-01{:02}", index),
            address: format!("{} Library Lane", index + 1),
        };
        let joined = today - Duration::days(30 * index as i64);
        db.members().create(&draft, joined).await?;
    }

    info!(books, members = MEMBERS.len(), "Seed complete");

    let elapsed = start.elapsed();
    println!();
    println!("✓ Authors:    {}", authors.len());
    println!("✓ Publishers: {}", publishers.len());
    println!("✓ Books:      {}", books);
    println!("✓ Members:    {}", MEMBERS.len());
    println!("  Done in {:?}", elapsed);

    db.close().await;
    Ok(())
}
