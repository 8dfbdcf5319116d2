//! # Command Handlers
//!
//! One module per area. Each handler takes the shared [`Context`] and
//! returns `Result<(), ApiError>` after printing its result.
//!
//! ## Failure Notices
//! Operations an operator triggers from a form (issue, return, penalty
//! entry, book edits, settings) also leave a `Failed to ...` line in the
//! notification log when they are refused, so the log shows both outcomes.

pub mod catalog;
pub mod circulation;
pub mod member;
pub mod notification;
pub mod penalty;
pub mod report;
pub mod settings;

use akul_core::circulation::parse_date;
use akul_core::{notification as messages, EnforcementPolicy};
use akul_db::Database;
use chrono::NaiveDate;
use tracing::warn;

use crate::cli::Command;
use crate::error::ApiError;
use crate::output::OutputFormat;

/// Everything a command needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub db: Database,
    pub policy: EnforcementPolicy,
    pub today: NaiveDate,
    pub format: OutputFormat,
}

impl Context {
    /// `value` parsed as a date, or today when absent.
    pub fn date_or_today(&self, value: Option<&str>) -> Result<NaiveDate, ApiError> {
        match value {
            Some(value) => Ok(parse_date(value)?),
            None => Ok(self.today),
        }
    }
}

/// Routes a parsed command to its handler.
pub async fn dispatch(ctx: &Context, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Issue { member, book, date } => {
            let result = circulation::issue(ctx, member, book, date.as_deref()).await;
            record_failure(ctx, "issue book", result).await
        }
        Command::Return { circulation, date } => {
            let result = circulation::return_book(ctx, circulation, date.as_deref()).await;
            record_failure(ctx, "return book", result).await
        }
        Command::Loans(cmd) => circulation::loans(ctx, cmd).await,
        Command::Penalty(cmd) => {
            let action = penalty::action(&cmd);
            let result = penalty::run(ctx, cmd).await;
            match action {
                Some(action) => record_failure(ctx, action, result).await,
                None => result,
            }
        }
        Command::Book(cmd) => {
            let action = catalog::book_action(&cmd);
            let result = catalog::book(ctx, cmd).await;
            match action {
                Some(action) => record_failure(ctx, action, result).await,
                None => result,
            }
        }
        Command::Author(cmd) => catalog::author(ctx, cmd).await,
        Command::Publisher(cmd) => catalog::publisher(ctx, cmd).await,
        Command::Member(cmd) => member::run(ctx, cmd).await,
        Command::Settings(cmd) => {
            let result = settings::run(ctx, cmd).await;
            record_failure(ctx, "update settings", result).await
        }
        Command::Notifications(cmd) => notification::run(ctx, cmd).await,
        Command::Dashboard => report::dashboard(ctx).await,
        Command::Chart { window } => report::chart(ctx, &window).await,
        Command::Report { table, output } => report::export(ctx, &table, output.as_deref()).await,
    }
}

/// Appends `Failed to <action>: <message>` when `result` is an error.
///
/// Internal failures are not echoed into the log. A log write that itself
/// fails is only traced; the original error is returned either way.
async fn record_failure(
    ctx: &Context,
    action: &str,
    result: Result<(), ApiError>,
) -> Result<(), ApiError> {
    if let Err(err) = &result {
        if is_refusal(err) {
            let message = messages::failed(action, &err.message);
            if let Err(log_err) = ctx.db.notifications().record(&message).await {
                warn!(%log_err, action, "Could not record failure notification");
            }
        }
    }
    result
}

fn is_refusal(err: &ApiError) -> bool {
    use crate::error::ErrorCode;
    !matches!(
        err.code,
        ErrorCode::DatabaseError | ErrorCode::Internal | ErrorCode::ConfigError
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use akul_db::DbConfig;

    pub async fn context() -> Context {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Context {
            db,
            policy: EnforcementPolicy::default(),
            today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            format: OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::context;
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[tokio::test]
    async fn test_refused_issue_leaves_failure_notice() {
        let ctx = context().await;
        let cli = Cli::parse_from(["akul-admin", "issue", "--member", "1", "--book", "1"]);

        let err = dispatch(&ctx, cli.command).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);

        let log = ctx.db.notifications().list_recent(1).await.unwrap();
        assert_eq!(log[0].message, "Failed to issue book: Member not found: 1");
    }

    #[tokio::test]
    async fn test_bad_date_is_validation_error() {
        let ctx = context().await;
        let err = ctx.date_or_today(Some("01/02/2024")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert_eq!(ctx.date_or_today(None).unwrap(), ctx.today);
    }
}
