//! # Settings Provider
//!
//! The library settings live in a single row with `id = 1`. Reading when the
//! row is missing creates it from [`LibrarySettings::default`].

use akul_core::notification;
use akul_core::{LibrarySettings, SettingsUpdate};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::repository::notification::append;

/// Repository for the singleton settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Returns the active settings, creating the defaults on first use.
    ///
    /// Always succeeds unless the database itself fails.
    pub async fn get(&self) -> DbResult<LibrarySettings> {
        let mut conn = self.pool.acquire().await?;
        load(&mut conn).await
    }

    /// Overwrites the named fields and records a notification.
    ///
    /// ## Errors
    /// * `Rejected(Validation(OutOfRange))` - a numeric field outside
    ///   [`SettingsUpdate::validate`]'s bounds; nothing is written
    /// * `CheckViolation` - the table's CHECK constraints, which carry the
    ///   same bounds, refused the row
    pub async fn update(&self, update: &SettingsUpdate) -> DbResult<LibrarySettings> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;

        let mut settings = load(&mut tx).await?;
        settings.apply(update);

        sqlx::query(
            r#"
            UPDATE library_settings SET
                library_name = ?1,
                address = ?2,
                contact = ?3,
                loan_duration_days = ?4,
                penalty_per_day_cents = ?5,
                max_penalty_cents = ?6,
                max_books = ?7
            WHERE id = 1
            "#,
        )
        .bind(&settings.library_name)
        .bind(&settings.address)
        .bind(&settings.contact)
        .bind(settings.loan_duration_days)
        .bind(settings.penalty_per_day_cents)
        .bind(settings.max_penalty_cents)
        .bind(settings.max_books)
        .execute(&mut *tx)
        .await?;

        append(&mut tx, &notification::settings_updated()).await?;
        tx.commit().await?;

        info!(
            loan_duration_days = settings.loan_duration_days,
            penalty_per_day = %settings.penalty_per_day(),
            "Settings updated"
        );
        Ok(settings)
    }
}

/// Reads the settings row inside the caller's connection or transaction,
/// inserting the defaults if it does not exist yet.
pub(crate) async fn load(conn: &mut SqliteConnection) -> DbResult<LibrarySettings> {
    let defaults = LibrarySettings::default();

    let inserted = sqlx::query(
        r#"
        INSERT INTO library_settings (
            id, library_name, address, contact,
            loan_duration_days, penalty_per_day_cents, max_penalty_cents, max_books
        ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(&defaults.library_name)
    .bind(&defaults.address)
    .bind(&defaults.contact)
    .bind(defaults.loan_duration_days)
    .bind(defaults.penalty_per_day_cents)
    .bind(defaults.max_penalty_cents)
    .bind(defaults.max_books)
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() > 0 {
        debug!("Created default settings row");
    }

    let settings = sqlx::query_as::<_, LibrarySettings>(
        r#"
        SELECT
            library_name,
            address,
            contact,
            loan_duration_days,
            penalty_per_day_cents,
            max_penalty_cents,
            max_books
        FROM library_settings
        WHERE id = 1
        "#,
    )
    .fetch_one(&mut *conn)
    .await?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::db;
    use crate::DbError;
    use akul_core::{CoreError, Money, ValidationError};

    #[tokio::test]
    async fn test_get_creates_defaults_once() {
        let db = db().await;

        let first = db.settings().get().await.unwrap();
        assert_eq!(first, LibrarySettings::default());

        let second = db.settings().get().await.unwrap();
        assert_eq!(first, second);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM library_settings")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_update_overwrites_named_fields_and_notifies() {
        let db = db().await;

        let updated = db
            .settings()
            .update(&SettingsUpdate {
                loan_duration_days: Some(7),
                penalty_per_day: Some(Money::from_cents(250)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.loan_duration_days, 7);
        assert_eq!(updated.penalty_per_day_cents, 250);
        assert_eq!(updated.max_books, 3);
        assert_eq!(db.settings().get().await.unwrap(), updated);

        let log = db.notifications().list_recent(10).await.unwrap();
        assert_eq!(log[0].message, "Settings updated successfully.");
    }

    #[tokio::test]
    async fn test_update_rejects_zero_loan_duration() {
        let db = db().await;

        let result = db
            .settings()
            .update(&SettingsUpdate {
                loan_duration_days: Some(0),
                ..Default::default()
            })
            .await;
        assert!(matches!(
            result,
            Err(DbError::Rejected(CoreError::Validation(
                ValidationError::OutOfRange { .. }
            )))
        ));

        // Nothing changed, nothing logged
        assert_eq!(db.settings().get().await.unwrap().loan_duration_days, 14);
        assert!(db.notifications().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_rates_and_durations_too_large() {
        let db = db().await;

        let huge_rate = db
            .settings()
            .update(&SettingsUpdate {
                penalty_per_day: Some("92233720368547758".parse().unwrap()),
                ..Default::default()
            })
            .await;
        assert!(matches!(huge_rate, Err(DbError::Rejected(_))));

        let huge_duration = db
            .settings()
            .update(&SettingsUpdate {
                loan_duration_days: Some(1_000_000_000),
                ..Default::default()
            })
            .await;
        assert!(matches!(huge_duration, Err(DbError::Rejected(_))));

        assert_eq!(db.settings().get().await.unwrap(), LibrarySettings::default());
    }

    #[tokio::test]
    async fn test_table_checks_bound_raw_writes() {
        let db = db().await;
        db.settings().get().await.unwrap();

        let err = sqlx::query("UPDATE library_settings SET loan_duration_days = 1000000000")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::CheckViolation { .. }));

        let err = sqlx::query("UPDATE library_settings SET penalty_per_day_cents = 92233720368547758")
            .execute(db.pool())
            .await
            .unwrap_err();
        assert!(matches!(DbError::from(err), DbError::CheckViolation { .. }));
    }
}
