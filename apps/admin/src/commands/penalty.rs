//! Penalty ledger commands.

use akul_core::penalty::ManualPenaltyRequest;
use akul_core::{Money, Penalty, PenaltyListing};

use crate::cli::PenaltyCommand;
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::{emit, or_dash, table};

/// Label used for the failure notice, if the command writes.
pub fn action(command: &PenaltyCommand) -> Option<&'static str> {
    match command {
        PenaltyCommand::Add { .. } => Some("add penalty"),
        PenaltyCommand::Pay { .. } => Some("mark penalty paid"),
        PenaltyCommand::Delete { .. } => Some("delete penalty"),
        PenaltyCommand::List => None,
    }
}

pub async fn run(ctx: &Context, command: PenaltyCommand) -> Result<(), ApiError> {
    match command {
        PenaltyCommand::Add {
            member,
            fallback_name,
            amount,
            reason,
            book,
        } => {
            let request = ManualPenaltyRequest {
                member,
                fallback_name,
                amount,
                reason,
                book_title: book,
            };
            let penalty = ctx.db.penalties().create_manual(&request).await?;
            emit(ctx.format, &penalty, |p: &Penalty| {
                format!(
                    "Penalty {} of {} recorded for member {}",
                    p.id,
                    p.amount(),
                    p.member_id
                )
            })
        }
        PenaltyCommand::Pay { id } => {
            let penalty = ctx.db.penalties().mark_paid(id).await?;
            emit(ctx.format, &penalty, |p| format!("Penalty {} marked paid", p.id))
        }
        PenaltyCommand::Delete { id } => {
            let penalty = ctx.db.penalties().delete(id).await?;
            emit(ctx.format, &penalty, |p| format!("Penalty {} deleted", p.id))
        }
        PenaltyCommand::List => {
            let penalties = ctx.db.penalties().list().await?;
            emit(ctx.format, &penalties, |list| render(list))
        }
    }
}

fn render(penalties: &[PenaltyListing]) -> String {
    let rows: Vec<Vec<String>> = penalties
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.member_name.clone(),
                or_dash(p.book_title.as_deref()),
                p.days_overdue.to_string(),
                Money::from_cents(p.amount_cents).to_string(),
                p.status.label().to_string(),
                p.reason.clone(),
            ]
        })
        .collect();
    table(
        &["ID", "Member", "Book", "Days", "Amount", "Status", "Reason"],
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::commands::dispatch;
    use crate::cli::Command;
    use crate::error::ErrorCode;
    use akul_core::MemberDraft;

    #[tokio::test]
    async fn test_missing_amount_is_logged() {
        let ctx = context().await;
        ctx.db
            .members()
            .create(
                &MemberDraft {
                    name: "Alice".to_string(),
                    email: "alice@example.com".to_string(),
                    ..Default::default()
                },
                ctx.today,
            )
            .await
            .unwrap();

        let err = dispatch(
            &ctx,
            Command::Penalty(PenaltyCommand::Add {
                member: Some("Alice".to_string()),
                fallback_name: None,
                amount: None,
                reason: None,
                book: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        let log = ctx.db.notifications().list_recent(1).await.unwrap();
        assert_eq!(log[0].message, "Failed to add penalty: Penalty amount is required");
        assert!(ctx.db.penalties().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_member_code() {
        let ctx = context().await;
        let err = run(
            &ctx,
            PenaltyCommand::Add {
                member: Some("Nobody".to_string()),
                fallback_name: None,
                amount: Some("5".to_string()),
                reason: None,
                book: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::MemberUnresolved);
    }
}
