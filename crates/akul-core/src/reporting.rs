//! # Reporting Aggregator
//!
//! Read-side projections: time-bucketed chart series, the filtered and
//! sorted circulation table, and the three-section export document.
//!
//! ## Chart Buckets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  window = 6_months, today = 2024-03-10                                  │
//! │                                                                         │
//! │   Oct      Nov      Dec   │   Jan      Feb      Mar                     │
//! │  [2023-10, 2023-11, 2023-12 | 2024-01, 2024-02, 2024-03]                │
//! │                                                                         │
//! │  Oldest first, contiguous, one bucket per unit even when empty.         │
//! │  Each bucket is a half-open range [start, end).                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database layer loads the raw dates inside the overall range and this
//! module does the bucketing, so the aggregation itself is testable without
//! a database.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{effective_status, is_overdue, CirculationStatus};
use crate::DATE_FORMAT;

// =============================================================================
// Chart Window
// =============================================================================

/// Time span covered by the dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ChartWindow {
    /// Seven daily buckets ending today.
    #[serde(rename = "last_week")]
    LastWeek,
    /// Six monthly buckets ending with the current month.
    #[default]
    #[serde(rename = "6_months")]
    SixMonths,
    /// Twelve monthly buckets ending with the current month.
    #[serde(rename = "last_year")]
    LastYear,
}

impl ChartWindow {
    /// Parses a window name. Unknown names fall back to six months.
    ///
    /// ## Example
    /// ```rust
    /// use akul_core::reporting::ChartWindow;
    ///
    /// assert_eq!(ChartWindow::parse("last_week"), ChartWindow::LastWeek);
    /// assert_eq!(ChartWindow::parse("fortnight"), ChartWindow::SixMonths);
    /// ```
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "last_week" => ChartWindow::LastWeek,
            "last_year" => ChartWindow::LastYear,
            _ => ChartWindow::SixMonths,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartWindow::LastWeek => "last_week",
            ChartWindow::SixMonths => "6_months",
            ChartWindow::LastYear => "last_year",
        }
    }
}

// =============================================================================
// Buckets
// =============================================================================

/// One day or one month of chart data, covering `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Bucket {
    pub label: String,
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl Bucket {
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Builds the buckets for `window`, oldest first, ending with `today`.
pub fn buckets(window: ChartWindow, today: NaiveDate) -> Vec<Bucket> {
    match window {
        ChartWindow::LastWeek => (0..7)
            .rev()
            .map(|back| {
                let day = today - Duration::days(back);
                Bucket {
                    label: day.format("%a").to_string(),
                    start: day,
                    end: day + Duration::days(1),
                }
            })
            .collect(),
        ChartWindow::SixMonths => month_buckets(6, today),
        ChartWindow::LastYear => month_buckets(12, today),
    }
}

fn month_buckets(count: i32, today: NaiveDate) -> Vec<Bucket> {
    // Months counted from year 0 so that stepping back wraps the year.
    let current = today.year() * 12 + today.month0() as i32;

    (0..count)
        .rev()
        .filter_map(|back| {
            let start = month_start(current - back)?;
            let end = month_start(current - back + 1)?;
            Some(Bucket {
                label: start.format("%b").to_string(),
                start,
                end,
            })
        })
        .collect()
}

fn month_start(month_index: i32) -> Option<NaiveDate> {
    let year = month_index.div_euclid(12);
    let month0 = month_index.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// First and last-exclusive date spanned by a bucket list.
pub fn span(buckets: &[Bucket]) -> Option<(NaiveDate, NaiveDate)> {
    Some((buckets.first()?.start, buckets.last()?.end))
}

// =============================================================================
// Chart Series
// =============================================================================

/// Parallel per-bucket series for the dashboard charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    /// Loans issued per bucket.
    pub issues: Vec<i64>,
    /// Members joined per bucket.
    pub new_members: Vec<i64>,
    /// Penalty amounts created per bucket, in major units.
    pub revenue: Vec<f64>,
}

/// Counts raw events into buckets.
///
/// Events outside every bucket are ignored.
///
/// ## Example
/// ```rust
/// use akul_core::money::Money;
/// use akul_core::reporting::{aggregate, buckets, ChartWindow};
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
/// let series = aggregate(
///     &buckets(ChartWindow::SixMonths, today),
///     &[NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()],
///     &[],
///     &[(NaiveDate::from_ymd_opt(2023, 12, 24).unwrap(), Money::from_cents(1250))],
/// );
/// assert_eq!(series.issues, vec![0, 0, 0, 0, 0, 1]);
/// assert_eq!(series.revenue[2], 12.5);
/// ```
pub fn aggregate(
    buckets: &[Bucket],
    issue_dates: &[NaiveDate],
    join_dates: &[NaiveDate],
    penalties: &[(NaiveDate, Money)],
) -> ChartSeries {
    let count_in = |bucket: &Bucket, dates: &[NaiveDate]| {
        dates.iter().filter(|date| bucket.contains(**date)).count() as i64
    };

    let mut series = ChartSeries::default();
    for bucket in buckets {
        series.labels.push(bucket.label.clone());
        series.issues.push(count_in(bucket, issue_dates));
        series.new_members.push(count_in(bucket, join_dates));

        let revenue: Money = penalties
            .iter()
            .filter(|(date, _)| bucket.contains(*date))
            .map(|(_, amount)| *amount)
            .sum();
        series.revenue.push(revenue.to_major_f64());
    }
    series
}

// =============================================================================
// Circulation Table
// =============================================================================

/// A loan joined with member name and book title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CirculationRow {
    pub id: i64,
    pub member_name: String,
    pub book_title: String,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub return_date: Option<NaiveDate>,
    pub status: CirculationStatus,
    pub fine_cents: i64,
}

impl CirculationRow {
    pub fn fine(&self) -> Money {
        Money::from_cents(self.fine_cents)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.status, self.due_date, today)
    }

    /// Status as the table shows it on `today`.
    pub fn effective_status(&self, today: NaiveDate) -> CirculationStatus {
        effective_status(self.status, self.due_date, today)
    }
}

/// Status filter on the circulation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Every stored issued loan, overdue ones included.
    Issued,
    Returned,
    /// Issued and past due.
    Overdue,
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "issued" => Ok(StatusFilter::Issued),
            "returned" => Ok(StatusFilter::Returned),
            "overdue" => Ok(StatusFilter::Overdue),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown status '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CirculationFilter {
    /// Case-insensitive substring of member name or book title.
    pub query: Option<String>,
    pub status: Option<StatusFilter>,
}

impl CirculationFilter {
    pub fn matches(&self, row: &CirculationRow, today: NaiveDate) -> bool {
        let text_ok = match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let needle = query.to_lowercase();
                row.member_name.to_lowercase().contains(&needle)
                    || row.book_title.to_lowercase().contains(&needle)
            }
            _ => true,
        };

        let status_ok = match self.status {
            None => true,
            Some(StatusFilter::Issued) => row.status == CirculationStatus::Issued,
            Some(StatusFilter::Returned) => row.status == CirculationStatus::Returned,
            Some(StatusFilter::Overdue) => row.is_overdue(today),
        };

        text_ok && status_ok
    }
}

/// Column the circulation table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    IssueDate,
    DueDate,
    ReturnDate,
    Member,
    Book,
    Status,
    Fine,
}

/// Sort order for the circulation table. Ties always fall back to id
/// descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CirculationSort {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for CirculationSort {
    fn default() -> Self {
        CirculationSort {
            key: SortKey::IssueDate,
            descending: true,
        }
    }
}

/// Parses `"due_date"` or `"-due_date"`; a leading `-` means descending.
impl FromStr for CirculationSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let key = match name {
            "issue_date" => SortKey::IssueDate,
            "due_date" => SortKey::DueDate,
            "return_date" => SortKey::ReturnDate,
            "member" => SortKey::Member,
            "book" => SortKey::Book,
            "status" => SortKey::Status,
            "fine" => SortKey::Fine,
            other => {
                return Err(ValidationError::InvalidFormat {
                    field: "sort".to_string(),
                    reason: format!("unknown sort key '{}'", other),
                })
            }
        };

        Ok(CirculationSort { key, descending })
    }
}

impl CirculationSort {
    /// Status compares by the label shown on `today`, so overdue loans sort
    /// apart from the ones still in time.
    fn compare(&self, a: &CirculationRow, b: &CirculationRow, today: NaiveDate) -> Ordering {
        let primary = match self.key {
            SortKey::IssueDate => a.issue_date.cmp(&b.issue_date),
            SortKey::DueDate => a.due_date.cmp(&b.due_date),
            SortKey::ReturnDate => a.return_date.cmp(&b.return_date),
            SortKey::Member => a.member_name.to_lowercase().cmp(&b.member_name.to_lowercase()),
            SortKey::Book => a.book_title.to_lowercase().cmp(&b.book_title.to_lowercase()),
            SortKey::Status => a
                .effective_status(today)
                .label()
                .cmp(b.effective_status(today).label()),
            SortKey::Fine => a.fine_cents.cmp(&b.fine_cents),
        };
        let primary = if self.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| b.id.cmp(&a.id))
    }
}

/// Filters then sorts circulation rows.
pub fn tabulate(
    rows: Vec<CirculationRow>,
    filter: &CirculationFilter,
    sort: &CirculationSort,
    today: NaiveDate,
) -> Vec<CirculationRow> {
    let mut rows: Vec<CirculationRow> = rows
        .into_iter()
        .filter(|row| filter.matches(row, today))
        .collect();
    rows.sort_by(|a, b| sort.compare(a, b, today));
    rows
}

// =============================================================================
// Report Document
// =============================================================================

/// A book with resolved author and publisher names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryRow {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub isbn: String,
    pub quantity: i64,
    pub available_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportSection {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The exported circulation report.
///
/// ## Layout
/// ```text
/// Circulation Details  Member | Book | Issue Date | Due Date | Return Date | Status | Fine
/// Summary              Metric | Value
/// Inventory            Title | Author | Publisher | ISBN | Total | Available
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportDocument {
    pub library_name: String,
    #[ts(as = "String")]
    pub generated_on: NaiveDate,
    pub sections: Vec<ReportSection>,
}

pub const CIRCULATION_COLUMNS: [&str; 7] = [
    "Member",
    "Book",
    "Issue Date",
    "Due Date",
    "Return Date",
    "Status",
    "Fine",
];

pub const SUMMARY_COLUMNS: [&str; 2] = ["Metric", "Value"];

pub const INVENTORY_COLUMNS: [&str; 6] =
    ["Title", "Author", "Publisher", "ISBN", "Total", "Available"];

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Builds the export from already filtered and sorted rows.
pub fn build_report(
    library_name: &str,
    circulations: &[CirculationRow],
    inventory: &[InventoryRow],
    today: NaiveDate,
) -> ReportDocument {
    let detail_rows = circulations
        .iter()
        .map(|row| {
            vec![
                row.member_name.clone(),
                row.book_title.clone(),
                row.issue_date.format(DATE_FORMAT).to_string(),
                row.due_date.format(DATE_FORMAT).to_string(),
                row.return_date
                    .map(|date| date.format(DATE_FORMAT).to_string())
                    .unwrap_or_else(|| "-".to_string()),
                effective_status(row.status, row.due_date, today)
                    .label()
                    .to_string(),
                if row.fine_cents == 0 {
                    "-".to_string()
                } else {
                    row.fine().to_string()
                },
            ]
        })
        .collect();

    let count_where = |wanted: CirculationStatus| {
        circulations.iter().filter(|row| row.status == wanted).count()
    };
    let overdue = circulations.iter().filter(|row| row.is_overdue(today)).count();
    let total_fines: Money = circulations.iter().map(CirculationRow::fine).sum();

    let summary_rows = vec![
        vec!["Total Circulations".to_string(), circulations.len().to_string()],
        vec![
            "Currently Issued".to_string(),
            count_where(CirculationStatus::Issued).to_string(),
        ],
        vec![
            "Returned".to_string(),
            count_where(CirculationStatus::Returned).to_string(),
        ],
        vec!["Overdue".to_string(), overdue.to_string()],
        vec!["Total Fines".to_string(), total_fines.to_string()],
    ];

    let inventory_rows = inventory
        .iter()
        .map(|book| {
            vec![
                book.title.clone(),
                book.author.clone(),
                book.publisher.clone(),
                book.isbn.clone(),
                book.quantity.to_string(),
                book.available_quantity.to_string(),
            ]
        })
        .collect();

    ReportDocument {
        library_name: library_name.to_string(),
        generated_on: today,
        sections: vec![
            ReportSection {
                title: "Circulation Details".to_string(),
                columns: columns(&CIRCULATION_COLUMNS),
                rows: detail_rows,
            },
            ReportSection {
                title: "Summary".to_string(),
                columns: columns(&SUMMARY_COLUMNS),
                rows: summary_rows,
            },
            ReportSection {
                title: "Inventory".to_string(),
                columns: columns(&INVENTORY_COLUMNS),
                rows: inventory_rows,
            },
        ],
    }
}

/// Renders the document as aligned plain-text tables.
pub fn render_text(report: &ReportDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.library_name);
    let _ = writeln!(
        out,
        "Circulation Report - {}",
        report.generated_on.format(DATE_FORMAT)
    );

    for section in &report.sections {
        let mut widths: Vec<usize> = section.columns.iter().map(|c| c.chars().count()).collect();
        for row in &section.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", section.title);
        let _ = writeln!(out, "{}", line(&section.columns));
        let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let _ = writeln!(out, "{}", "-".repeat(rule));
        for row in &section.rows {
            let _ = writeln!(out, "{}", line(row));
        }
    }

    out
}

// =============================================================================
// Unit Tests
// =============================================================================
