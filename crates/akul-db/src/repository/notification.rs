//! # Notification Log
//!
//! Append-only feedback log shown to operators, capped at
//! [`NOTIFICATION_CAPACITY`] entries.
//!
//! ## Append and Trim
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  append(conn, "Book 'Dune' issued to Alice")                            │
//! │     │                                                                   │
//! │     ├── INSERT (created_at = now, read = 0)                             │
//! │     └── DELETE every row not among the newest 50                       │
//! │         (created_at DESC, id DESC)                                      │
//! │                                                                         │
//! │  Both statements run on the caller's connection, so inside a           │
//! │  transaction the log never exceeds the cap, even transiently.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use akul_core::{Notification, NOTIFICATION_CAPACITY};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository for the notification log.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        NotificationRepository { pool }
    }

    /// Appends a message in its own transaction.
    pub async fn record(&self, message: &str) -> DbResult<Notification> {
        let mut tx = self.pool.begin().await?;
        let entry = append(&mut tx, message).await?;
        tx.commit().await?;
        Ok(entry)
    }

    /// Newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Notification>> {
        let entries = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, message, created_at, read
            FROM notifications
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks every entry read. Returns how many changed.
    pub async fn mark_all_read(&self) -> DbResult<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE read = 0")
            .execute(&self.pool)
            .await?;

        debug!(count = result.rows_affected(), "Marked notifications read");
        Ok(result.rows_affected())
    }

    /// Deletes every entry. Returns how many were removed.
    pub async fn clear_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM notifications")
            .execute(&self.pool)
            .await?;

        debug!(count = result.rows_affected(), "Cleared notifications");
        Ok(result.rows_affected())
    }

    pub async fn unread_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE read = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Appends a message on the caller's connection and trims the log.
pub(crate) async fn append(conn: &mut SqliteConnection, message: &str) -> DbResult<Notification> {
    let now = Utc::now();

    let id = sqlx::query("INSERT INTO notifications (message, created_at, read) VALUES (?1, ?2, 0)")
        .bind(message)
        .bind(now)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

    let trimmed = sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE id NOT IN (
            SELECT id FROM notifications
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
        )
        "#,
    )
    .bind(NOTIFICATION_CAPACITY as i64)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    debug!(id, trimmed, message = %message, "Notification recorded");

    Ok(Notification {
        id,
        message: message.to_string(),
        created_at: now,
        read: false,
    })
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::db;

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let db = db().await;
        let log = db.notifications();

        log.record("first").await.unwrap();
        log.record("second").await.unwrap();

        let entries = log.list_recent(50).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert!(!entries[0].read);
        assert_eq!(log.unread_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_log_keeps_newest_fifty() {
        let db = db().await;
        let log = db.notifications();

        for i in 0..60 {
            log.record(&format!("entry {}", i)).await.unwrap();
        }

        let entries = log.list_recent(100).await.unwrap();
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].message, "entry 59");
        assert_eq!(entries[49].message, "entry 10");
    }

    #[tokio::test]
    async fn test_mark_all_read_and_clear() {
        let db = db().await;
        let log = db.notifications();

        log.record("a").await.unwrap();
        log.record("b").await.unwrap();

        assert_eq!(log.mark_all_read().await.unwrap(), 2);
        assert_eq!(log.unread_count().await.unwrap(), 0);
        assert_eq!(log.mark_all_read().await.unwrap(), 0);

        assert_eq!(log.clear_all().await.unwrap(), 2);
        assert!(log.list_recent(50).await.unwrap().is_empty());
    }
}
