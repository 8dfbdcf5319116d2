//! Member commands. The join date is set to today on registration and
//! never edited.

use akul_core::{Member, MemberDraft};

use crate::cli::MemberCommand;
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::{emit, table};

pub async fn run(ctx: &Context, command: MemberCommand) -> Result<(), ApiError> {
    match command {
        MemberCommand::Add {
            name,
            email,
            phone,
            address,
        } => {
            let draft = MemberDraft {
                name,
                email,
                phone,
                address,
            };
            let member = ctx.db.members().create(&draft, ctx.today).await?;
            emit(ctx.format, &member, |m| format!("Member {} '{}' registered", m.id, m.name))
        }
        MemberCommand::Update {
            id,
            name,
            email,
            phone,
            address,
        } => {
            let existing = ctx
                .db
                .members()
                .get(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Member", &id.to_string()))?;
            let draft = MemberDraft {
                name: name.unwrap_or(existing.name),
                email: email.unwrap_or(existing.email),
                phone: phone.unwrap_or(existing.phone),
                address: address.unwrap_or(existing.address),
            };
            let member = ctx.db.members().update(id, &draft).await?;
            emit(ctx.format, &member, |m| format!("Member {} updated", m.id))
        }
        MemberCommand::Delete { id } => {
            let member = ctx.db.members().delete(id).await?;
            emit(ctx.format, &member, |m| {
                format!("Member {} '{}' deleted with their loans and penalties", m.id, m.name)
            })
        }
        MemberCommand::Show { id } => {
            let member = ctx
                .db
                .members()
                .get(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Member", &id.to_string()))?;
            emit(ctx.format, &member, |m| render(std::slice::from_ref(m)))
        }
        MemberCommand::List => {
            let members = ctx.db.members().list().await?;
            emit(ctx.format, &members, |list| render(list))
        }
    }
}

fn render(members: &[Member]) -> String {
    let rows: Vec<Vec<String>> = members
        .iter()
        .map(|m| {
            vec![
                m.id.to_string(),
                m.name.clone(),
                m.email.clone(),
                m.phone.clone(),
                m.joined_date.to_string(),
            ]
        })
        .collect();
    table(&["ID", "Name", "Email", "Phone", "Joined"], &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;

    #[tokio::test]
    async fn test_add_uses_context_today_and_update_keeps_it() {
        let ctx = context().await;
        run(
            &ctx,
            MemberCommand::Add {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: String::new(),
                address: String::new(),
            },
        )
        .await
        .unwrap();

        run(
            &ctx,
            MemberCommand::Update {
                id: 1,
                name: None,
                email: None,
                phone: Some("555-0101".to_string()),
                address: None,
            },
        )
        .await
        .unwrap();

        let alice = ctx.db.members().get(1).await.unwrap().unwrap();
        assert_eq!(alice.joined_date, ctx.today);
        assert_eq!(alice.phone, "555-0101");
        assert_eq!(alice.email, "alice@example.com");
    }
}
