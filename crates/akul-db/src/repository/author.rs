//! # Author Repository
//!
//! Deleting an author deletes their books, and with them the books' loans.

use akul_core::notification;
use akul_core::validation::validate_name;
use akul_core::{Author, AuthorSummary};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::notification::append;

/// Repository for authors.
#[derive(Debug, Clone)]
pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    /// Creates a new AuthorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuthorRepository { pool }
    }

    pub async fn create(&self, name: &str, bio: Option<&str>) -> DbResult<Author> {
        validate_name("name", name)?;
        let name = name.trim();

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query("INSERT INTO authors (name, bio) VALUES (?1, ?2)")
            .bind(name)
            .bind(bio)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        append(&mut tx, &notification::author_added(name)).await?;
        tx.commit().await?;

        info!(author_id = id, name = %name, "Author created");
        Ok(Author {
            id,
            name: name.to_string(),
            bio: bio.map(str::to_string),
        })
    }

    pub async fn update(&self, id: i64, name: &str, bio: Option<&str>) -> DbResult<Author> {
        validate_name("name", name)?;
        let name = name.trim();

        let result = sqlx::query("UPDATE authors SET name = ?2, bio = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(bio)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Author", id.to_string()));
        }

        Ok(Author {
            id,
            name: name.to_string(),
            bio: bio.map(str::to_string),
        })
    }

    /// Deletes the author and, by cascade, their books.
    pub async fn delete(&self, id: i64) -> DbResult<Author> {
        let mut tx = self.pool.begin().await?;

        let author = sqlx::query_as::<_, Author>("SELECT id, name, bio FROM authors WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Author", id.to_string()))?;

        sqlx::query("DELETE FROM authors WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        append(&mut tx, &notification::author_deleted(&author.name)).await?;
        tx.commit().await?;

        info!(author_id = id, "Author deleted");
        Ok(author)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>("SELECT id, name, bio FROM authors WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(author)
    }

    /// All authors with their book counts, most books first.
    pub async fn list(&self) -> DbResult<Vec<AuthorSummary>> {
        let authors = sqlx::query_as::<_, AuthorSummary>(
            r#"
            SELECT
                a.id,
                a.name,
                a.bio,
                COUNT(b.id) AS book_count
            FROM authors a
            LEFT JOIN books b ON b.author_id = a.id
            GROUP BY a.id
            ORDER BY book_count DESC, a.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{book, db};
    use crate::DbError;

    #[tokio::test]
    async fn test_list_orders_by_book_count() {
        let db = db().await;
        let lonely = db.authors().create("Lonely Writer", None).await.unwrap();
        let dune = book(&db, "Dune", "9780441013593", 1).await;

        let authors = db.authors().list().await.unwrap();
        assert_eq!(authors[0].id, dune.author_id);
        assert_eq!(authors[0].book_count, 1);
        let last = authors.last().unwrap();
        assert_eq!(last.id, lonely.id);
        assert_eq!(last.book_count, 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_books() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 1).await;

        db.authors().delete(dune.author_id).await.unwrap();
        assert!(db.books().get(dune.id).await.unwrap().is_none());
        assert!(matches!(
            db.authors().delete(dune.author_id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let db = db().await;
        assert!(matches!(
            db.authors().create("  ", None).await,
            Err(DbError::Rejected(_))
        ));
    }
}
