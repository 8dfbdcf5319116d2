//! Notification log commands.

use akul_core::Notification;
use serde_json::json;

use crate::cli::NotificationCommand;
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::{emit, table};

pub async fn run(ctx: &Context, command: NotificationCommand) -> Result<(), ApiError> {
    match command {
        NotificationCommand::List { limit } => {
            let entries = ctx.db.notifications().list_recent(limit).await?;
            emit(ctx.format, &entries, |list: &Vec<Notification>| {
                let rows: Vec<Vec<String>> = list
                    .iter()
                    .map(|n| {
                        vec![
                            n.created_at.format("%Y-%m-%d %H:%M").to_string(),
                            if n.read { " " } else { "*" }.to_string(),
                            n.message.clone(),
                        ]
                    })
                    .collect();
                table(&["Time", "New", "Message"], &rows)
            })
        }
        NotificationCommand::ReadAll => {
            let marked = ctx.db.notifications().mark_all_read().await?;
            emit(ctx.format, &json!({ "marked": marked }), |_| {
                format!("{} notifications marked read", marked)
            })
        }
        NotificationCommand::Clear => {
            let cleared = ctx.db.notifications().clear_all().await?;
            emit(ctx.format, &json!({ "cleared": cleared }), |_| {
                format!("{} notifications cleared", cleared)
            })
        }
        NotificationCommand::Unread => {
            let unread = ctx.db.notifications().unread_count().await?;
            emit(ctx.format, &json!({ "unread": unread }), |_| unread.to_string())
        }
    }
}
