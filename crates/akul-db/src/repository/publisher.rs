//! # Publisher Repository

use akul_core::notification;
use akul_core::validation::validate_name;
use akul_core::Publisher;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::notification::append;

/// Repository for publishers.
#[derive(Debug, Clone)]
pub struct PublisherRepository {
    pool: SqlitePool,
}

impl PublisherRepository {
    /// Creates a new PublisherRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PublisherRepository { pool }
    }

    pub async fn create(&self, name: &str, address: Option<&str>) -> DbResult<Publisher> {
        validate_name("name", name)?;
        let name = name.trim();

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query("INSERT INTO publishers (name, address) VALUES (?1, ?2)")
            .bind(name)
            .bind(address)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        append(&mut tx, &notification::publisher_added(name)).await?;
        tx.commit().await?;

        info!(publisher_id = id, name = %name, "Publisher created");
        Ok(Publisher {
            id,
            name: name.to_string(),
            address: address.map(str::to_string),
        })
    }

    pub async fn update(&self, id: i64, name: &str, address: Option<&str>) -> DbResult<Publisher> {
        validate_name("name", name)?;
        let name = name.trim();

        let result = sqlx::query("UPDATE publishers SET name = ?2, address = ?3 WHERE id = ?1")
            .bind(id)
            .bind(name)
            .bind(address)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Publisher", id.to_string()));
        }

        Ok(Publisher {
            id,
            name: name.to_string(),
            address: address.map(str::to_string),
        })
    }

    /// Deletes the publisher and, by cascade, its books.
    pub async fn delete(&self, id: i64) -> DbResult<Publisher> {
        let mut tx = self.pool.begin().await?;

        let publisher = sqlx::query_as::<_, Publisher>(
            "SELECT id, name, address FROM publishers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Publisher", id.to_string()))?;

        sqlx::query("DELETE FROM publishers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        append(&mut tx, &notification::publisher_deleted(&publisher.name)).await?;
        tx.commit().await?;

        info!(publisher_id = id, "Publisher deleted");
        Ok(publisher)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Publisher>> {
        let publisher = sqlx::query_as::<_, Publisher>(
            "SELECT id, name, address FROM publishers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publisher)
    }

    /// Ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            "SELECT id, name, address FROM publishers ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(publishers)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::db;

    #[tokio::test]
    async fn test_list_by_name_and_rename() {
        let db = db().await;
        let repo = db.publishers();

        let zed = repo.create("Zed Books", None).await.unwrap();
        repo.create("Ace", Some("New York")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ace", "Zed Books"]);

        let renamed = repo.update(zed.id, "Aardvark Press", None).await.unwrap();
        assert_eq!(renamed.name, "Aardvark Press");
        assert_eq!(repo.list().await.unwrap()[0].id, zed.id);
    }
}
