//! # Member Repository
//!
//! Deleting a member deletes their loans and penalties.

use akul_core::notification;
use akul_core::validation::validate_member_draft;
use akul_core::{Member, MemberDraft};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::notification::append;

const MEMBER_COLUMNS: &str = "id, name, email, phone, address, joined_date";

/// Repository for members.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Creates a new MemberRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MemberRepository { pool }
    }

    /// Registers a member joining on `joined_date`.
    ///
    /// ## Errors
    /// * `Rejected(Validation)` - blank name or malformed email
    /// * `UniqueViolation` - email already registered
    pub async fn create(&self, draft: &MemberDraft, joined_date: NaiveDate) -> DbResult<Member> {
        validate_member_draft(draft)?;
        let name = draft.name.trim();
        let email = draft.email.trim();

        let mut tx = self.pool.begin().await?;
        ensure_email_free(&mut tx, email, None).await?;

        let id = sqlx::query(
            r#"
            INSERT INTO members (name, email, phone, address, joined_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(draft.phone.trim())
        .bind(draft.address.trim())
        .bind(joined_date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        append(&mut tx, &notification::member_added(name)).await?;
        tx.commit().await?;

        info!(member_id = id, "Member registered");
        Ok(Member {
            id,
            name: name.to_string(),
            email: email.to_string(),
            phone: draft.phone.trim().to_string(),
            address: draft.address.trim().to_string(),
            joined_date,
        })
    }

    /// Updates name and contact details. The join date never changes.
    pub async fn update(&self, id: i64, draft: &MemberDraft) -> DbResult<Member> {
        validate_member_draft(draft)?;
        let email = draft.email.trim();

        let mut tx = self.pool.begin().await?;
        let existing = fetch(&mut tx, id).await?;
        ensure_email_free(&mut tx, email, Some(id)).await?;

        sqlx::query(
            r#"
            UPDATE members SET
                name = ?2,
                email = ?3,
                phone = ?4,
                address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(email)
        .bind(draft.phone.trim())
        .bind(draft.address.trim())
        .execute(&mut *tx)
        .await?;

        append(&mut tx, &notification::member_updated(draft.name.trim())).await?;
        tx.commit().await?;

        Ok(Member {
            id,
            name: draft.name.trim().to_string(),
            email: email.to_string(),
            phone: draft.phone.trim().to_string(),
            address: draft.address.trim().to_string(),
            joined_date: existing.joined_date,
        })
    }

    pub async fn delete(&self, id: i64) -> DbResult<Member> {
        let mut tx = self.pool.begin().await?;
        let member = fetch(&mut tx, id).await?;

        sqlx::query("DELETE FROM members WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        append(&mut tx, &notification::member_deleted(&member.name)).await?;
        tx.commit().await?;

        info!(member_id = id, "Member deleted");
        Ok(member)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members WHERE id = ?1",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Newest first.
    pub async fn list(&self) -> DbResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members ORDER BY id DESC",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}

/// Loads a member on the caller's connection.
pub(crate) async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Member> {
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("Member", id.to_string()))
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<Member>> {
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {} FROM members WHERE id = ?1",
        MEMBER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(member)
}

/// Exact name match ignoring case, earliest registration first.
///
/// `COLLATE NOCASE` folds ASCII letters only, so "ÉLISE" finds "Élise" but
/// "élise" does not.
pub(crate) async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Member>> {
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {} FROM members WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        MEMBER_COLUMNS
    ))
    .bind(name.trim())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(member)
}

/// Loans the member currently holds.
pub(crate) async fn active_loans(conn: &mut SqliteConnection, member_id: i64) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM circulations WHERE member_id = ?1 AND status = 'issued'",
    )
    .bind(member_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

async fn ensure_email_free(
    conn: &mut SqliteConnection,
    email: &str,
    except_id: Option<i64>,
) -> DbResult<()> {
    let taken: Option<i64> =
        sqlx::query_scalar("SELECT id FROM members WHERE email = ?1 AND id IS NOT ?2")
            .bind(email)
            .bind(except_id)
            .fetch_optional(&mut *conn)
            .await?;

    match taken {
        Some(_) => Err(DbError::duplicate("email", email)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, db, member};

    #[tokio::test]
    async fn test_create_sets_join_date() {
        let db = db().await;
        let alice = member(&db, "Alice").await;

        assert_eq!(alice.joined_date, date(2024, 1, 1));
        let loaded = db.members().get(alice.id).await.unwrap().unwrap();
        assert_eq!(loaded, alice);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = db().await;
        member(&db, "Alice").await;

        let draft = MemberDraft {
            name: "Other Alice".to_string(),
            email: "alice@example.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            db.members().create(&draft, date(2024, 2, 1)).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_join_date() {
        let db = db().await;
        let alice = member(&db, "Alice").await;

        let updated = db
            .members()
            .update(
                alice.id,
                &MemberDraft {
                    name: "Alice Smith".to_string(),
                    email: alice.email.clone(),
                    phone: "555-0199".to_string(),
                    address: alice.address.clone(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.joined_date, alice.joined_date);
        assert_eq!(updated.phone, "555-0199");
    }

    #[tokio::test]
    async fn test_find_by_name_ignores_case() {
        let db = db().await;
        let alice = member(&db, "Alice").await;
        member(&db, "Bob").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let found = find_by_name(&mut conn, "aLiCe").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(find_by_name(&mut conn, "Ali").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_folds_ascii_case_only() {
        let db = db().await;
        let elise = member(&db, "Élise").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let found = find_by_name(&mut conn, "ÉLISE").await.unwrap().unwrap();
        assert_eq!(found.id, elise.id);
        assert!(find_by_name(&mut conn, "élise").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = db().await;
        member(&db, "Alice").await;
        member(&db, "Bob").await;

        let names: Vec<String> = db
            .members()
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Bob", "Alice"]);
    }
}
