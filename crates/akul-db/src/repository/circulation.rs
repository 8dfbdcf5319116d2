//! # Circulation Repository
//!
//! The issue and return transitions. Each runs in one SQLite transaction;
//! any refusal drops the transaction so nothing is written.
//!
//! ## Issue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │  load member, book, settings, member's active loans                    │
//! │  plan_issue()                        → Rejected(LoanLimitReached | …)  │
//! │  UPDATE books                                                           │
//! │     SET available_quantity = available_quantity - 1                     │
//! │     WHERE id = ? AND available_quantity > 0                             │
//! │       └── 0 rows → Rejected(NoCopiesAvailable)                          │
//! │  INSERT circulation (status issued)                                     │
//! │  append notification                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Return
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │  load circulation, book, member, settings                              │
//! │  plan_return()                       → Rejected(AlreadyReturned)        │
//! │  UPDATE circulations … WHERE id = ? AND status = 'issued'              │
//! │       └── 0 rows → Rejected(AlreadyReturned)                            │
//! │  UPDATE books SET available_quantity =                                  │
//! │       MIN(available_quantity + 1, quantity)                             │
//! │  late? INSERT unpaid penalty (created_at on the return date)           │
//! │  append notification                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use akul_core::circulation::{plan_issue, plan_return};
use akul_core::notification;
use akul_core::{Circulation, CirculationStatus, CoreError, EnforcementPolicy, Penalty};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::notification::append;
use crate::repository::settings::load as load_settings;
use crate::repository::{book, member, penalty};

const CIRCULATION_COLUMNS: &str =
    "id, member_id, book_id, issue_date, due_date, return_date, status, fine_cents, remarks";

/// Result of a successful return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnOutcome {
    pub circulation: Circulation,
    /// The unpaid penalty raised by a late return.
    pub penalty: Option<Penalty>,
}

/// Repository for loans.
#[derive(Debug, Clone)]
pub struct CirculationRepository {
    pool: SqlitePool,
}

impl CirculationRepository {
    /// Creates a new CirculationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CirculationRepository { pool }
    }

    /// Lends one copy of a book to a member.
    ///
    /// ## Errors
    /// * `NotFound` - member or book does not exist
    /// * `Rejected(NoCopiesAvailable)` - no copy on the shelf
    /// * `Rejected(LoanLimitReached)` - only with `enforce_loan_limit`
    pub async fn issue(
        &self,
        member_id: i64,
        book_id: i64,
        issue_date: NaiveDate,
        policy: &EnforcementPolicy,
    ) -> DbResult<Circulation> {
        let mut tx = self.pool.begin().await?;

        let member = member::fetch(&mut tx, member_id).await?;
        let book = book::fetch(&mut tx, book_id).await?;
        let settings = load_settings(&mut tx).await?;
        let active = member::active_loans(&mut tx, member_id).await?;

        let plan = plan_issue(&member, &book, active, &settings, policy, issue_date)?;

        let taken = sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = available_quantity - 1
            WHERE id = ?1 AND available_quantity > 0
            "#,
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            warn!(book_id, "Last copy taken by a concurrent issue");
            return Err(CoreError::NoCopiesAvailable {
                book_id,
                title: book.title,
            }
            .into());
        }

        let id = sqlx::query(
            r#"
            INSERT INTO circulations (
                member_id, book_id, issue_date, due_date, status, fine_cents
            ) VALUES (?1, ?2, ?3, ?4, 'issued', 0)
            "#,
        )
        .bind(plan.member_id)
        .bind(plan.book_id)
        .bind(plan.issue_date)
        .bind(plan.due_date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        append(&mut tx, &notification::book_issued(&book.title, &member.name)).await?;
        tx.commit().await?;

        info!(
            circulation_id = id,
            member_id,
            book_id,
            due_date = %plan.due_date,
            "Book issued"
        );

        Ok(Circulation {
            id,
            member_id,
            book_id,
            issue_date: plan.issue_date,
            due_date: plan.due_date,
            return_date: None,
            status: CirculationStatus::Issued,
            fine_cents: 0,
            remarks: None,
        })
    }

    /// Takes a loan back on `today`, charging a fine when late.
    ///
    /// The penalty's `created_at` falls on `today`, not the wall-clock date,
    /// so chart revenue follows the return date.
    ///
    /// ## Errors
    /// * `NotFound` - circulation does not exist
    /// * `Rejected(AlreadyReturned)` - second return of the same loan;
    ///   nothing is written
    pub async fn return_book(
        &self,
        circulation_id: i64,
        today: NaiveDate,
        policy: &EnforcementPolicy,
    ) -> DbResult<ReturnOutcome> {
        let mut tx = self.pool.begin().await?;

        let circulation = fetch(&mut tx, circulation_id).await?;
        let book = book::fetch(&mut tx, circulation.book_id).await?;
        let member = member::fetch(&mut tx, circulation.member_id).await?;
        let settings = load_settings(&mut tx).await?;

        let plan = plan_return(&circulation, &book.title, &settings, policy, today)?;
        let fine = plan.fine();

        let flipped = sqlx::query(
            r#"
            UPDATE circulations
            SET status = 'returned', return_date = ?2, fine_cents = ?3
            WHERE id = ?1 AND status = 'issued'
            "#,
        )
        .bind(circulation_id)
        .bind(plan.return_date)
        .bind(fine.cents())
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            debug!(circulation_id, "Loan returned concurrently");
            return Err(CoreError::AlreadyReturned { circulation_id }.into());
        }

        sqlx::query(
            r#"
            UPDATE books
            SET available_quantity = MIN(available_quantity + 1, quantity)
            WHERE id = ?1
            "#,
        )
        .bind(book.id)
        .execute(&mut *tx)
        .await?;

        let penalty = match &plan.overdue {
            Some(charge) => {
                let penalty =
                    penalty::insert(&mut tx, &charge.penalty, penalty::recorded_at(today))
                        .await?;
                append(
                    &mut tx,
                    &notification::book_returned_overdue(&book.title, &member.name, fine),
                )
                .await?;
                Some(penalty)
            }
            None => {
                append(
                    &mut tx,
                    &notification::book_returned(&book.title, &member.name),
                )
                .await?;
                None
            }
        };

        tx.commit().await?;

        info!(
            circulation_id,
            late = plan.is_late(),
            fine = %fine,
            "Book returned"
        );

        Ok(ReturnOutcome {
            circulation: Circulation {
                return_date: Some(plan.return_date),
                status: CirculationStatus::Returned,
                fine_cents: fine.cents(),
                ..circulation
            },
            penalty,
        })
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Circulation>> {
        let mut conn = self.pool.acquire().await?;
        match fetch(&mut conn, id).await {
            Ok(circulation) => Ok(Some(circulation)),
            Err(DbError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Newest issue first.
    pub async fn list(&self) -> DbResult<Vec<Circulation>> {
        let loans = sqlx::query_as::<_, Circulation>(&format!(
            "SELECT {} FROM circulations ORDER BY issue_date DESC, id DESC",
            CIRCULATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> DbResult<Circulation> {
    sqlx::query_as::<_, Circulation>(&format!(
        "SELECT {} FROM circulations WHERE id = ?1",
        CIRCULATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Circulation", id.to_string()))
}
