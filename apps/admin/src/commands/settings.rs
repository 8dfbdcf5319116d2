//! Library settings commands.

use akul_core::{LibrarySettings, Money, SettingsUpdate};

use crate::cli::SettingsCommand;
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::emit;

pub async fn run(ctx: &Context, command: SettingsCommand) -> Result<(), ApiError> {
    let settings = match command {
        SettingsCommand::Show => ctx.db.settings().get().await?,
        SettingsCommand::Set {
            library_name,
            address,
            contact,
            loan_duration_days,
            penalty_per_day,
            max_penalty,
            max_books,
        } => {
            let update = SettingsUpdate {
                library_name,
                address,
                contact,
                loan_duration_days,
                penalty_per_day: parse_money(penalty_per_day.as_deref())?,
                max_penalty: parse_money(max_penalty.as_deref())?,
                max_books,
            };
            ctx.db.settings().update(&update).await?
        }
    };

    emit(ctx.format, &settings, render)
}

fn parse_money(value: Option<&str>) -> Result<Option<Money>, ApiError> {
    match value {
        Some(value) => Ok(Some(value.parse::<Money>()?)),
        None => Ok(None),
    }
}

fn render(settings: &LibrarySettings) -> String {
    format!(
        "Library:         {}\n\
         Address:         {}\n\
         Contact:         {}\n\
         Loan duration:   {} days\n\
         Penalty per day: {}\n\
         Max penalty:     {}\n\
         Max books:       {}",
        settings.library_name,
        settings.address,
        settings.contact,
        settings.loan_duration_days,
        settings.penalty_per_day(),
        settings.max_penalty(),
        settings.max_books
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;

    fn set(penalty_per_day: Option<&str>, loan_duration_days: Option<i64>) -> SettingsCommand {
        SettingsCommand::Set {
            library_name: None,
            address: None,
            contact: None,
            loan_duration_days,
            penalty_per_day: penalty_per_day.map(str::to_string),
            max_penalty: None,
            max_books: None,
        }
    }

    #[tokio::test]
    async fn test_set_penalty_rate() {
        let ctx = context().await;
        run(&ctx, set(Some("2.50"), Some(21))).await.unwrap();

        let settings = ctx.db.settings().get().await.unwrap();
        assert_eq!(settings.penalty_per_day_cents, 250);
        assert_eq!(settings.loan_duration_days, 21);
    }

    #[tokio::test]
    async fn test_bad_amount_changes_nothing() {
        let ctx = context().await;
        let before = ctx.db.settings().get().await.unwrap();

        let err = run(&ctx, set(Some("ten"), Some(30))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(ctx.db.settings().get().await.unwrap(), before);
    }
}
