//! # Penalty Repository
//!
//! Overdue penalties are written by the return transaction through
//! [`insert`]; this repository adds manual entry, payment and removal.
//!
//! ## Manual Entry
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ManualPenaltyRequest::prepare()   → AmountMissing / Validation         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  for step in lookup:  ById → members.id                                │
//! │                       ByName → members.name COLLATE NOCASE (ASCII)     │
//! │       first hit wins; none → MemberUnresolved                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  book_title given? → books.title COLLATE NOCASE (optional link)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT unpaid penalty + notification                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use akul_core::notification;
use akul_core::penalty::{ManualPenaltyRequest, MemberLookup, NewPenalty};
use akul_core::{CoreError, Member, Penalty, PenaltyListing, PenaltyStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::notification::append;
use crate::repository::{book, member};

const PENALTY_COLUMNS: &str =
    "id, member_id, book_id, due_date, days_overdue, amount_cents, reason, status, created_at";

/// Repository for the penalty ledger.
#[derive(Debug, Clone)]
pub struct PenaltyRepository {
    pool: SqlitePool,
}

impl PenaltyRepository {
    /// Creates a new PenaltyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PenaltyRepository { pool }
    }

    /// Records a penalty entered by an administrator, stamped with the
    /// current wall-clock time.
    ///
    /// ## Errors
    /// * `Rejected(AmountMissing)` / `Rejected(Validation)` - bad amount
    /// * `Rejected(MemberUnresolved)` - no lookup step found a member
    pub async fn create_manual(&self, request: &ManualPenaltyRequest) -> DbResult<Penalty> {
        let prepared = request.prepare()?;

        let mut tx = self.pool.begin().await?;

        let member = resolve_member(&mut tx, &prepared.lookup)
            .await?
            .ok_or_else(|| CoreError::MemberUnresolved {
                input: request.member_label(),
            })?;

        let book_id = match prepared.book_title.as_deref() {
            Some(title) => book::find_by_title(&mut tx, title).await?.map(|b| b.id),
            None => None,
        };

        let new = NewPenalty::manual(member.id, book_id, prepared.amount, prepared.reason);
        let penalty = insert(&mut tx, &new, Utc::now()).await?;
        append(&mut tx, &notification::penalty_added(&member.name, new.amount)).await?;
        tx.commit().await?;

        info!(
            penalty_id = penalty.id,
            member_id = member.id,
            amount = %new.amount,
            "Manual penalty recorded"
        );
        Ok(penalty)
    }

    /// Marks a penalty paid. Marking a paid penalty again is harmless.
    pub async fn mark_paid(&self, id: i64) -> DbResult<Penalty> {
        let mut tx = self.pool.begin().await?;
        let penalty = fetch(&mut tx, id).await?;
        let member = member::fetch(&mut tx, penalty.member_id).await?;

        sqlx::query("UPDATE penalties SET status = 'paid' WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        append(&mut tx, &notification::penalty_paid(&member.name)).await?;
        tx.commit().await?;

        info!(penalty_id = id, "Penalty marked paid");
        Ok(Penalty {
            status: PenaltyStatus::Paid,
            ..penalty
        })
    }

    /// Removes a penalty permanently.
    pub async fn delete(&self, id: i64) -> DbResult<Penalty> {
        let mut tx = self.pool.begin().await?;
        let penalty = fetch(&mut tx, id).await?;
        let member = member::fetch(&mut tx, penalty.member_id).await?;

        sqlx::query("DELETE FROM penalties WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        append(&mut tx, &notification::penalty_deleted(&member.name)).await?;
        tx.commit().await?;

        info!(penalty_id = id, "Penalty deleted");
        Ok(penalty)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Penalty>> {
        let penalty = sqlx::query_as::<_, Penalty>(&format!(
            "SELECT {} FROM penalties WHERE id = ?1",
            PENALTY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(penalty)
    }

    /// Every penalty with member name and book title, newest first.
    pub async fn list(&self) -> DbResult<Vec<PenaltyListing>> {
        let penalties = sqlx::query_as::<_, PenaltyListing>(
            r#"
            SELECT
                p.id,
                p.member_id,
                m.name AS member_name,
                p.book_id,
                b.title AS book_title,
                p.days_overdue,
                p.amount_cents,
                p.reason,
                p.status,
                p.created_at
            FROM penalties p
            INNER JOIN members m ON m.id = p.member_id
            LEFT JOIN books b ON b.id = p.book_id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(penalties)
    }
}

/// Runs the lookup steps in order and returns the first member found.
async fn resolve_member(
    conn: &mut SqliteConnection,
    steps: &[MemberLookup],
) -> DbResult<Option<Member>> {
    for step in steps {
        let found = match step {
            MemberLookup::ById(id) => member::find_by_id(conn, *id).await?,
            MemberLookup::ByName(name) => member::find_by_name(conn, name).await?,
        };
        if let Some(member) = found {
            debug!(?step, member_id = member.id, "Member resolved");
            return Ok(Some(member));
        }
    }
    Ok(None)
}

/// `day` at the current time of day, so a backdated return lands its
/// revenue in that day's chart bucket.
pub(crate) fn recorded_at(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(Utc::now().time()).and_utc()
}

/// Inserts a penalty on the caller's connection.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    new: &NewPenalty,
    created_at: DateTime<Utc>,
) -> DbResult<Penalty> {
    let id = sqlx::query(
        r#"
        INSERT INTO penalties (
            member_id, book_id, due_date, days_overdue,
            amount_cents, reason, status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(new.member_id)
    .bind(new.book_id)
    .bind(new.due_date)
    .bind(new.days_overdue)
    .bind(new.amount.cents())
    .bind(&new.reason)
    .bind(new.status)
    .bind(created_at)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(Penalty {
        id,
        member_id: new.member_id,
        book_id: new.book_id,
        due_date: new.due_date,
        days_overdue: new.days_overdue,
        amount_cents: new.amount.cents(),
        reason: new.reason.clone(),
        status: new.status,
        created_at,
    })
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Penalty> {
    sqlx::query_as::<_, Penalty>(&format!(
        "SELECT {} FROM penalties WHERE id = ?1",
        PENALTY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Penalty", id.to_string()))
}
