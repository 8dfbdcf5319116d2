//! # Circulation Commands
//!
//! ```text
//! akul-admin issue --member 3 --book 7 [--date 2024-03-01]
//! akul-admin return 12 [--date 2024-03-20]
//! akul-admin loans list [--query dune] [--status overdue] [--sort -fine]
//! akul-admin loans show 12
//! ```

use akul_core::reporting::{CirculationFilter, CirculationRow, CirculationSort, StatusFilter};
use akul_db::ReturnOutcome;
use tracing::info;

use crate::cli::{LoanCommand, TableArgs};
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::{emit, or_dash, table};

pub async fn issue(
    ctx: &Context,
    member_id: i64,
    book_id: i64,
    date: Option<&str>,
) -> Result<(), ApiError> {
    let issue_date = ctx.date_or_today(date)?;
    let loan = ctx
        .db
        .circulations()
        .issue(member_id, book_id, issue_date, &ctx.policy)
        .await?;

    info!(circulation_id = loan.id, "Issued via admin");
    emit(ctx.format, &loan, |loan| {
        format!(
            "Loan {} issued on {}, due {}",
            loan.id, loan.issue_date, loan.due_date
        )
    })
}

pub async fn return_book(ctx: &Context, id: i64, date: Option<&str>) -> Result<(), ApiError> {
    let return_date = ctx.date_or_today(date)?;
    let outcome = ctx
        .db
        .circulations()
        .return_book(id, return_date, &ctx.policy)
        .await?;

    emit(ctx.format, &outcome, |outcome: &ReturnOutcome| {
        match &outcome.penalty {
            Some(penalty) => format!(
                "Loan {} returned {} days late. Penalty {} of {} recorded.",
                outcome.circulation.id,
                penalty.days_overdue,
                penalty.id,
                penalty.amount()
            ),
            None => format!("Loan {} returned on time.", outcome.circulation.id),
        }
    })
}

pub async fn loans(ctx: &Context, command: LoanCommand) -> Result<(), ApiError> {
    match command {
        LoanCommand::List { table: args } => {
            let (filter, sort) = table_options(&args)?;
            let rows = ctx
                .db
                .reports()
                .tabulate_circulations(&filter, &sort, ctx.today)
                .await?;
            let today = ctx.today;
            emit(ctx.format, &rows, |rows| render_rows(rows, today))
        }
        LoanCommand::Show { id } => {
            let loan = ctx
                .db
                .circulations()
                .get(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Circulation", &id.to_string()))?;
            let today = ctx.today;
            emit(ctx.format, &loan, |loan| {
                format!(
                    "Loan {}: member {} book {}\nIssued {}  Due {}  Returned {}\nStatus {}  Fine {}",
                    loan.id,
                    loan.member_id,
                    loan.book_id,
                    loan.issue_date,
                    loan.due_date,
                    or_dash(loan.return_date),
                    loan.effective_status(today).label(),
                    loan.fine()
                )
            })
        }
    }
}

/// Parses the shared filter and sort flags.
pub fn table_options(args: &TableArgs) -> Result<(CirculationFilter, CirculationSort), ApiError> {
    let status = match args.status.as_deref() {
        Some(status) => Some(status.parse::<StatusFilter>()?),
        None => None,
    };
    let sort = args.sort.parse::<CirculationSort>()?;
    Ok((
        CirculationFilter {
            query: args.query.clone(),
            status,
        },
        sort,
    ))
}

fn render_rows(rows: &[CirculationRow], today: chrono::NaiveDate) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let status = if row.is_overdue(today) {
                "Overdue"
            } else {
                row.status.label()
            };
            vec![
                row.id.to_string(),
                row.member_name.clone(),
                row.book_title.clone(),
                row.issue_date.to_string(),
                row.due_date.to_string(),
                or_dash(row.return_date),
                status.to_string(),
                row.fine().to_string(),
            ]
        })
        .collect();
    table(
        &["ID", "Member", "Book", "Issued", "Due", "Returned", "Status", "Fine"],
        &cells,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;

    #[test]
    fn test_table_options() {
        let args = TableArgs {
            query: Some("dune".to_string()),
            status: Some("Overdue".to_string()),
            sort: "-fine".to_string(),
        };
        let (filter, sort) = table_options(&args).unwrap();
        assert_eq!(filter.status, Some(StatusFilter::Overdue));
        assert!(sort.descending);

        let bad = TableArgs {
            sort: "colour".to_string(),
            ..Default::default()
        };
        assert_eq!(table_options(&bad).unwrap_err().code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_return_unknown_loan() {
        let ctx = context().await;
        let err = return_book(&ctx, 99, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
