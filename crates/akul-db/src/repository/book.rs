//! # Book Repository
//!
//! Catalogue maintenance. Copy counts are only moved by the circulation
//! workflow; here they are set directly from the book form.
//!
//! ## Duplicate ISBN
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(draft)                                                          │
//! │     │                                                                   │
//! │     ├── validate_book_draft   → Rejected(Validation)                    │
//! │     ├── author / publisher    → NotFound                                │
//! │     ├── SELECT isbn           → UniqueViolation { field: "isbn" }       │
//! │     └── INSERT + notification                                           │
//! │                                                                         │
//! │  The UNIQUE index still guards against a concurrent insert; its error  │
//! │  maps to the same UniqueViolation.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use akul_core::notification;
use akul_core::validation::{validate_book_draft, validate_search_query};
use akul_core::{Book, BookDraft};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::notification::append;

const BOOK_COLUMNS: &str =
    "id, title, author_id, publisher_id, isbn, quantity, available_quantity, thumbnail_link";

/// Repository for books.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Adds a title to the catalogue.
    ///
    /// ## Errors
    /// * `Rejected(Validation)` - missing title, author, publisher or ISBN,
    ///   ISBN longer than 13 characters, bad copy counts
    /// * `NotFound` - author or publisher does not exist
    /// * `UniqueViolation` - ISBN already catalogued
    pub async fn create(&self, draft: &BookDraft) -> DbResult<Book> {
        let (author_id, publisher_id) = validate_book_draft(draft)?;
        let title = draft.title.trim();
        let isbn = draft.isbn.trim();

        let mut tx = self.pool.begin().await?;
        ensure_references(&mut tx, author_id, publisher_id).await?;
        ensure_isbn_free(&mut tx, isbn, None).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO books (
                title, author_id, publisher_id, isbn,
                quantity, available_quantity, thumbnail_link
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(title)
        .bind(author_id)
        .bind(publisher_id)
        .bind(isbn)
        .bind(draft.quantity)
        .bind(draft.available_quantity)
        .bind(&draft.thumbnail_link)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        append(&mut tx, &notification::book_added(title)).await?;
        tx.commit().await?;

        info!(book_id = id, isbn = %isbn, "Book created");
        Ok(Book {
            id,
            title: title.to_string(),
            author_id,
            publisher_id,
            isbn: isbn.to_string(),
            quantity: draft.quantity,
            available_quantity: draft.available_quantity,
            thumbnail_link: draft.thumbnail_link.clone(),
        })
    }

    /// Replaces every field of a book with the form values.
    pub async fn update(&self, id: i64, draft: &BookDraft) -> DbResult<Book> {
        let (author_id, publisher_id) = validate_book_draft(draft)?;
        let title = draft.title.trim();
        let isbn = draft.isbn.trim();

        let mut tx = self.pool.begin().await?;
        fetch(&mut tx, id).await?;
        ensure_references(&mut tx, author_id, publisher_id).await?;
        ensure_isbn_free(&mut tx, isbn, Some(id)).await?;

        sqlx::query(
            r#"
            UPDATE books SET
                title = ?2,
                author_id = ?3,
                publisher_id = ?4,
                isbn = ?5,
                quantity = ?6,
                available_quantity = ?7,
                thumbnail_link = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(author_id)
        .bind(publisher_id)
        .bind(isbn)
        .bind(draft.quantity)
        .bind(draft.available_quantity)
        .bind(&draft.thumbnail_link)
        .execute(&mut *tx)
        .await?;

        append(&mut tx, &notification::book_updated(title)).await?;
        tx.commit().await?;

        info!(book_id = id, "Book updated");
        Ok(Book {
            id,
            title: title.to_string(),
            author_id,
            publisher_id,
            isbn: isbn.to_string(),
            quantity: draft.quantity,
            available_quantity: draft.available_quantity,
            thumbnail_link: draft.thumbnail_link.clone(),
        })
    }

    /// Removes a book. Its loans go with it; its penalties stay owed with
    /// the book reference cleared.
    pub async fn delete(&self, id: i64) -> DbResult<Book> {
        let mut tx = self.pool.begin().await?;
        let book = fetch(&mut tx, id).await?;

        sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        append(&mut tx, &notification::book_deleted(&book.title)).await?;
        tx.commit().await?;

        info!(book_id = id, "Book deleted");
        Ok(book)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = ?1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Newest first, optionally narrowed to titles containing `search`
    /// (case-insensitive).
    pub async fn list(&self, search: Option<&str>) -> DbResult<Vec<Book>> {
        let query = validate_search_query(search.unwrap_or_default())?;
        debug!(query = %query, "Listing books");

        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {}
            FROM books
            WHERE ?1 = '' OR instr(lower(title), lower(?1)) > 0
            ORDER BY id DESC
            "#,
            BOOK_COLUMNS
        ))
        .bind(&query)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}

/// Loads a book on the caller's connection.
pub(crate) async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Book> {
    sqlx::query_as::<_, Book>(&format!(
        "SELECT {} FROM books WHERE id = ?1",
        BOOK_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Book", id.to_string()))
}

/// Case-insensitive exact title match, oldest book first.
pub(crate) async fn find_by_title(
    conn: &mut SqliteConnection,
    title: &str,
) -> DbResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(&format!(
        "SELECT {} FROM books WHERE title = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        BOOK_COLUMNS
    ))
    .bind(title.trim())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(book)
}

async fn ensure_references(
    conn: &mut SqliteConnection,
    author_id: i64,
    publisher_id: i64,
) -> DbResult<()> {
    let author: Option<i64> = sqlx::query_scalar("SELECT id FROM authors WHERE id = ?1")
        .bind(author_id)
        .fetch_optional(&mut *conn)
        .await?;
    if author.is_none() {
        return Err(DbError::not_found("Author", author_id.to_string()));
    }

    let publisher: Option<i64> = sqlx::query_scalar("SELECT id FROM publishers WHERE id = ?1")
        .bind(publisher_id)
        .fetch_optional(&mut *conn)
        .await?;
    if publisher.is_none() {
        return Err(DbError::not_found("Publisher", publisher_id.to_string()));
    }

    Ok(())
}

async fn ensure_isbn_free(
    conn: &mut SqliteConnection,
    isbn: &str,
    except_id: Option<i64>,
) -> DbResult<()> {
    let taken: Option<i64> =
        sqlx::query_scalar("SELECT id FROM books WHERE isbn = ?1 AND id IS NOT ?2")
            .bind(isbn)
            .bind(except_id)
            .fetch_optional(&mut *conn)
            .await?;

    match taken {
        Some(_) => Err(DbError::duplicate("isbn", isbn)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{author, book, db, publisher};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let created = book(&db, "Dune", "9780441013593", 3).await;

        let loaded = db.books().get(created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.available_quantity, 3);

        let log = db.notifications().list_recent(1).await.unwrap();
        assert_eq!(log[0].message, "Book 'Dune' added successfully.");
    }

    #[tokio::test]
    async fn test_duplicate_isbn_is_rejected_before_insert() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 1).await;

        let draft = BookDraft {
            title: "Dune (reprint)".to_string(),
            author_id: Some(dune.author_id),
            publisher_id: Some(dune.publisher_id),
            isbn: "9780441013593".to_string(),
            quantity: 1,
            available_quantity: 1,
            thumbnail_link: None,
        };
        match db.books().create(&draft).await {
            Err(DbError::UniqueViolation { field, value }) => {
                assert_eq!(field, "isbn");
                assert_eq!(value, "9780441013593");
            }
            other => panic!("expected duplicate isbn, got {:?}", other),
        }
        assert_eq!(db.books().list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_author_is_validation_error() {
        let db = db().await;
        let press = publisher(&db, "Ace").await;

        let draft = BookDraft {
            title: "Dune".to_string(),
            author_id: None,
            publisher_id: Some(press.id),
            isbn: "9780441013593".to_string(),
            quantity: 1,
            available_quantity: 1,
            thumbnail_link: None,
        };
        assert!(matches!(
            db.books().create(&draft).await,
            Err(DbError::Rejected(_))
        ));

        let draft = BookDraft {
            author_id: Some(999),
            ..draft
        };
        assert!(matches!(
            db.books().create(&draft).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_own_isbn() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 2).await;
        let writer = author(&db, "Someone Else").await;

        let draft = BookDraft {
            title: "Dune".to_string(),
            author_id: Some(writer.id),
            publisher_id: Some(dune.publisher_id),
            isbn: dune.isbn.clone(),
            quantity: 4,
            available_quantity: 4,
            thumbnail_link: Some("https://covers.example.com/dune.jpg".to_string()),
        };
        let updated = db.books().update(dune.id, &draft).await.unwrap();
        assert_eq!(updated.author_id, writer.id);
        assert_eq!(updated.quantity, 4);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_search() {
        let db = db().await;
        book(&db, "Dune", "1", 1).await;
        book(&db, "Emma", "2", 1).await;
        book(&db, "Dune Messiah", "3", 1).await;

        let titles: Vec<String> = db
            .books()
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Dune Messiah", "Emma", "Dune"]);

        let found = db.books().list(Some("dUNE")).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_find_by_title_ignores_case() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 1).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let found = find_by_title(&mut conn, "DUNE").await.unwrap().unwrap();
        assert_eq!(found.id, dune.id);
        assert!(find_by_title(&mut conn, "Dun").await.unwrap().is_none());
    }
}
