//! # Report Repository
//!
//! Read-only queries behind the dashboard, the circulation table and the
//! export. SQL loads the raw rows; bucketing, filtering and sorting happen
//! in `akul_core::reporting`.

use akul_core::reporting::{
    aggregate, buckets, build_report, span, tabulate, ChartSeries, ChartWindow,
    CirculationFilter, CirculationRow, CirculationSort, InventoryRow, ReportDocument,
};
use akul_core::{DashboardStats, Money};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::settings::load as load_settings;

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Issues, new members and penalty revenue per bucket.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let series = db.reports().chart_series(ChartWindow::LastWeek, today).await?;
    /// assert_eq!(series.labels.len(), 7);
    /// ```
    pub async fn chart_series(&self, window: ChartWindow, today: NaiveDate) -> DbResult<ChartSeries> {
        let buckets = buckets(window, today);
        let Some((from, until)) = span(&buckets) else {
            return Ok(ChartSeries::default());
        };

        let issue_dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT issue_date FROM circulations WHERE issue_date >= ?1 AND issue_date < ?2",
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        let join_dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT joined_date FROM members WHERE joined_date >= ?1 AND joined_date < ?2",
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        // Bucketed by the UTC calendar day of creation
        let penalty_rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            r#"
            SELECT created_at, amount_cents
            FROM penalties
            WHERE date(created_at) >= ?1 AND date(created_at) < ?2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        let penalties: Vec<(NaiveDate, Money)> = penalty_rows
            .into_iter()
            .map(|(created_at, cents)| (created_at.date_naive(), Money::from_cents(cents)))
            .collect();

        debug!(
            window = window.as_str(),
            issues = issue_dates.len(),
            members = join_dates.len(),
            penalties = penalties.len(),
            "Chart data loaded"
        );

        Ok(aggregate(&buckets, &issue_dates, &join_dates, &penalties))
    }

    /// Every loan with member name and book title, unfiltered.
    pub async fn circulation_rows(&self) -> DbResult<Vec<CirculationRow>> {
        let rows = sqlx::query_as::<_, CirculationRow>(
            r#"
            SELECT
                c.id,
                m.name AS member_name,
                b.title AS book_title,
                c.issue_date,
                c.due_date,
                c.return_date,
                c.status,
                c.fine_cents
            FROM circulations c
            INNER JOIN members m ON m.id = c.member_id
            INNER JOIN books b ON b.id = c.book_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Filtered and sorted circulation table.
    pub async fn tabulate_circulations(
        &self,
        filter: &CirculationFilter,
        sort: &CirculationSort,
        today: NaiveDate,
    ) -> DbResult<Vec<CirculationRow>> {
        let rows = self.circulation_rows().await?;
        Ok(tabulate(rows, filter, sort, today))
    }

    /// All books with author and publisher names, by title.
    pub async fn inventory(&self) -> DbResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT
                b.title,
                a.name AS author,
                p.name AS publisher,
                b.isbn,
                b.quantity,
                b.available_quantity
            FROM books b
            INNER JOIN authors a ON a.id = b.author_id
            INNER JOIN publishers p ON p.id = b.publisher_id
            ORDER BY b.title COLLATE NOCASE, b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Three-section export: filtered circulations, summary, full inventory.
    pub async fn export_report(
        &self,
        filter: &CirculationFilter,
        sort: &CirculationSort,
        today: NaiveDate,
    ) -> DbResult<ReportDocument> {
        let settings = {
            let mut conn = self.pool.acquire().await?;
            load_settings(&mut conn).await?
        };
        let circulations = self.tabulate_circulations(filter, sort, today).await?;
        let inventory = self.inventory().await?;

        debug!(
            circulations = circulations.len(),
            books = inventory.len(),
            "Building report"
        );
        Ok(build_report(
            &settings.library_name,
            &circulations,
            &inventory,
            today,
        ))
    }

    /// Headline counters for the dashboard.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<DashboardStats> {
        let (total_books, available_copies): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(available_quantity), 0) FROM books")
                .fetch_one(&self.pool)
                .await?;

        let total_members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;

        let (issued_count, overdue_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN due_date < ?1 THEN 1 ELSE 0 END), 0)
            FROM circulations
            WHERE status = 'issued'
            "#,
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        let unread_notifications: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE read = 0")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardStats {
            total_books,
            total_members,
            issued_count,
            available_copies,
            overdue_count,
            unread_notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{book, date, db, member};
    use akul_core::reporting::StatusFilter;
    use akul_core::EnforcementPolicy;

    #[tokio::test]
    async fn test_chart_series_last_week() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 5).await;
        let alice = member(&db, "Alice").await; // joined 2024-01-01
        let policy = EnforcementPolicy::default();
        let today = date(2024, 1, 7);

        db.circulations()
            .issue(alice.id, dune.id, date(2024, 1, 3), &policy)
            .await
            .unwrap();
        db.circulations()
            .issue(alice.id, dune.id, today, &policy)
            .await
            .unwrap();
        // Outside the window
        db.circulations()
            .issue(alice.id, dune.id, date(2023, 12, 1), &policy)
            .await
            .unwrap();

        let series = db
            .reports()
            .chart_series(ChartWindow::LastWeek, today)
            .await
            .unwrap();

        assert_eq!(series.labels.len(), 7);
        assert_eq!(series.labels[6], "Sun");
        assert_eq!(series.issues, vec![0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(series.new_members, vec![1, 0, 0, 0, 0, 0, 0]);
        assert!(series.revenue.iter().all(|r| *r == 0.0));
    }

    #[tokio::test]
    async fn test_chart_series_counts_penalty_revenue_today() {
        let db = db().await;
        member(&db, "Alice").await;
        db.penalties()
            .create_manual(&akul_core::penalty::ManualPenaltyRequest {
                member: Some("Alice".to_string()),
                amount: Some("12.50".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let series = db
            .reports()
            .chart_series(ChartWindow::SixMonths, today)
            .await
            .unwrap();

        assert_eq!(series.revenue.len(), 6);
        assert_eq!(series.revenue[5], 12.5);
    }

    #[tokio::test]
    async fn test_tabulate_and_dashboard() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 2).await;
        let emma = book(&db, "Emma", "9780141439587", 1).await;
        let alice = member(&db, "Alice").await;
        let bob = member(&db, "Bob").await;
        let policy = EnforcementPolicy::default();

        let late = db
            .circulations()
            .issue(alice.id, dune.id, date(2024, 1, 1), &policy)
            .await
            .unwrap();
        db.circulations()
            .issue(bob.id, emma.id, date(2024, 2, 20), &policy)
            .await
            .unwrap();
        let today = date(2024, 3, 1);

        let overdue = CirculationFilter {
            query: None,
            status: Some(StatusFilter::Overdue),
        };
        let rows = db
            .reports()
            .tabulate_circulations(&overdue, &CirculationSort::default(), today)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, late.id);

        let by_book = CirculationFilter {
            query: Some("EMM".to_string()),
            status: None,
        };
        let rows = db
            .reports()
            .tabulate_circulations(&by_book, &CirculationSort::default(), today)
            .await
            .unwrap();
        assert_eq!(rows[0].member_name, "Bob");

        let stats = db.reports().dashboard(today).await.unwrap();
        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.total_members, 2);
        assert_eq!(stats.issued_count, 2);
        assert_eq!(stats.available_copies, 1);
        assert_eq!(stats.overdue_count, 1);
        assert_eq!(stats.unread_notifications, 10);
    }

    #[tokio::test]
    async fn test_export_report_sections() {
        let db = db().await;
        let dune = book(&db, "Dune", "9780441013593", 1).await;
        book(&db, "Abc Primer", "1111111111", 1).await;
        let alice = member(&db, "Alice").await;
        let policy = EnforcementPolicy::default();

        let loan = db
            .circulations()
            .issue(alice.id, dune.id, date(2024, 1, 1), &policy)
            .await
            .unwrap();
        db.circulations()
            .return_book(loan.id, date(2024, 1, 20), &policy)
            .await
            .unwrap();

        let report = db
            .reports()
            .export_report(
                &CirculationFilter::default(),
                &CirculationSort::default(),
                date(2024, 2, 1),
            )
            .await
            .unwrap();

        assert_eq!(report.library_name, "Central City Library");
        assert_eq!(report.sections.len(), 3);
        assert_eq!(
            report.sections[0].rows[0],
            vec!["Alice", "Dune", "2024-01-01", "2024-01-15", "2024-01-20", "Returned", "50.00"]
        );
        assert_eq!(report.sections[1].rows[4], vec!["Total Fines", "50.00"]);
        let titles: Vec<&str> = report.sections[2]
            .rows
            .iter()
            .map(|row| row[0].as_str())
            .collect();
        assert_eq!(titles, vec!["Abc Primer", "Dune"]);
    }
}
