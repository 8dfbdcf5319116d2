//! # Reporting Commands
//!
//! ```text
//! akul-admin dashboard
//! akul-admin chart --window last_week
//! akul-admin report --status overdue --sort member -o overdue.txt
//! ```

use std::path::Path;

use akul_core::reporting::{render_text, ChartSeries, ChartWindow};
use akul_core::DashboardStats;
use tracing::{error, info};

use crate::cli::TableArgs;
use crate::commands::circulation::table_options;
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::{emit, table, OutputFormat};

pub async fn dashboard(ctx: &Context) -> Result<(), ApiError> {
    let stats = ctx.db.reports().dashboard(ctx.today).await?;
    emit(ctx.format, &stats, |s: &DashboardStats| {
        let rows = vec![
            vec!["Books".to_string(), s.total_books.to_string()],
            vec!["Members".to_string(), s.total_members.to_string()],
            vec!["Issued".to_string(), s.issued_count.to_string()],
            vec!["Available copies".to_string(), s.available_copies.to_string()],
            vec!["Overdue".to_string(), s.overdue_count.to_string()],
            vec!["Unread notifications".to_string(), s.unread_notifications.to_string()],
        ];
        table(&["Metric", "Value"], &rows)
    })
}

/// Unknown window names fall back to six months.
pub async fn chart(ctx: &Context, window: &str) -> Result<(), ApiError> {
    let window = ChartWindow::parse(window);
    let series = ctx.db.reports().chart_series(window, ctx.today).await?;
    emit(ctx.format, &series, |s: &ChartSeries| {
        let rows: Vec<Vec<String>> = s
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                vec![
                    label.clone(),
                    s.issues[i].to_string(),
                    s.new_members[i].to_string(),
                    format!("{:.2}", s.revenue[i]),
                ]
            })
            .collect();
        table(&["Period", "Issues", "New members", "Revenue"], &rows)
    })
}

pub async fn export(
    ctx: &Context,
    args: &TableArgs,
    output: Option<&Path>,
) -> Result<(), ApiError> {
    let (filter, sort) = table_options(args)?;
    let report = ctx
        .db
        .reports()
        .export_report(&filter, &sort, ctx.today)
        .await?;

    match (output, ctx.format) {
        (Some(path), OutputFormat::Text) => {
            std::fs::write(path, render_text(&report)).map_err(|e| {
                error!(path = %path.display(), "Report write failed: {}", e);
                ApiError::internal(format!("Could not write {}", path.display()))
            })?;
            info!(path = %path.display(), "Report written");
            println!("Report written to {}", path.display());
            Ok(())
        }
        (Some(path), OutputFormat::Json) => {
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(path, json).map_err(|e| {
                error!(path = %path.display(), "Report write failed: {}", e);
                ApiError::internal(format!("Could not write {}", path.display()))
            })?;
            info!(path = %path.display(), "Report written");
            Ok(())
        }
        (None, format) => emit(format, &report, render_text),
    }
}
