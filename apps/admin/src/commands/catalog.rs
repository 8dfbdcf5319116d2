//! # Catalogue Commands
//!
//! Books, authors and publishers. Deleting an author or publisher removes
//! their books too, so those commands print what went with them.

use akul_core::{AuthorSummary, Book, BookDraft, Publisher};

use crate::cli::{AuthorCommand, BookCommand, PublisherCommand};
use crate::commands::Context;
use crate::error::ApiError;
use crate::output::{emit, or_dash, table};

/// Label used for the failure notice, if the command writes.
pub fn book_action(command: &BookCommand) -> Option<&'static str> {
    match command {
        BookCommand::Add { .. } => Some("add book"),
        BookCommand::Update { .. } => Some("update book"),
        BookCommand::Delete { .. } => Some("delete book"),
        BookCommand::Show { .. } | BookCommand::List { .. } => None,
    }
}

pub async fn book(ctx: &Context, command: BookCommand) -> Result<(), ApiError> {
    match command {
        BookCommand::Add {
            title,
            author,
            publisher,
            isbn,
            quantity,
            available,
            thumbnail,
        } => {
            let draft = BookDraft {
                title,
                author_id: Some(author),
                publisher_id: Some(publisher),
                isbn,
                quantity,
                available_quantity: available.unwrap_or(quantity),
                thumbnail_link: thumbnail,
            };
            let book = ctx.db.books().create(&draft).await?;
            emit(ctx.format, &book, |b| format!("Book {} '{}' added", b.id, b.title))
        }
        BookCommand::Update {
            id,
            title,
            author,
            publisher,
            isbn,
            quantity,
            available,
            thumbnail,
        } => {
            let existing = ctx
                .db
                .books()
                .get(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Book", &id.to_string()))?;

            let draft = BookDraft {
                title: title.unwrap_or(existing.title),
                author_id: Some(author.unwrap_or(existing.author_id)),
                publisher_id: Some(publisher.unwrap_or(existing.publisher_id)),
                isbn: isbn.unwrap_or(existing.isbn),
                quantity: quantity.unwrap_or(existing.quantity),
                available_quantity: available.unwrap_or(existing.available_quantity),
                thumbnail_link: thumbnail.or(existing.thumbnail_link),
            };
            let book = ctx.db.books().update(id, &draft).await?;
            emit(ctx.format, &book, |b| format!("Book {} '{}' updated", b.id, b.title))
        }
        BookCommand::Delete { id } => {
            let book = ctx.db.books().delete(id).await?;
            emit(ctx.format, &book, |b| format!("Book {} '{}' deleted", b.id, b.title))
        }
        BookCommand::Show { id } => {
            let book = ctx
                .db
                .books()
                .get(id)
                .await?
                .ok_or_else(|| ApiError::not_found("Book", &id.to_string()))?;
            emit(ctx.format, &book, |b| render_books(std::slice::from_ref(b)))
        }
        BookCommand::List { search } => {
            let books = ctx.db.books().list(search.as_deref()).await?;
            emit(ctx.format, &books, |list| render_books(list))
        }
    }
}

pub async fn author(ctx: &Context, command: AuthorCommand) -> Result<(), ApiError> {
    match command {
        AuthorCommand::Add { name, bio } => {
            let author = ctx.db.authors().create(&name, bio.as_deref()).await?;
            emit(ctx.format, &author, |a| format!("Author {} '{}' added", a.id, a.name))
        }
        AuthorCommand::Update { id, name, bio } => {
            let author = ctx.db.authors().update(id, &name, bio.as_deref()).await?;
            emit(ctx.format, &author, |a| format!("Author {} updated", a.id))
        }
        AuthorCommand::Delete { id } => {
            let author = ctx.db.authors().delete(id).await?;
            emit(ctx.format, &author, |a| {
                format!("Author {} '{}' deleted with their books", a.id, a.name)
            })
        }
        AuthorCommand::List => {
            let authors = ctx.db.authors().list().await?;
            emit(ctx.format, &authors, |list: &Vec<AuthorSummary>| {
                let rows: Vec<Vec<String>> = list
                    .iter()
                    .map(|a| vec![a.id.to_string(), a.name.clone(), a.book_count.to_string()])
                    .collect();
                table(&["ID", "Name", "Books"], &rows)
            })
        }
    }
}

pub async fn publisher(ctx: &Context, command: PublisherCommand) -> Result<(), ApiError> {
    match command {
        PublisherCommand::Add { name, address } => {
            let publisher = ctx
                .db
                .publishers()
                .create(&name, address.as_deref())
                .await?;
            emit(ctx.format, &publisher, |p| {
                format!("Publisher {} '{}' added", p.id, p.name)
            })
        }
        PublisherCommand::Update { id, name, address } => {
            let publisher = ctx
                .db
                .publishers()
                .update(id, &name, address.as_deref())
                .await?;
            emit(ctx.format, &publisher, |p| format!("Publisher {} updated", p.id))
        }
        PublisherCommand::Delete { id } => {
            let publisher = ctx.db.publishers().delete(id).await?;
            emit(ctx.format, &publisher, |p| {
                format!("Publisher {} '{}' deleted with their books", p.id, p.name)
            })
        }
        PublisherCommand::List => {
            let publishers = ctx.db.publishers().list().await?;
            emit(ctx.format, &publishers, |list: &Vec<Publisher>| {
                let rows: Vec<Vec<String>> = list
                    .iter()
                    .map(|p| vec![p.id.to_string(), p.name.clone(), or_dash(p.address.as_deref())])
                    .collect();
                table(&["ID", "Name", "Address"], &rows)
            })
        }
    }
}

fn render_books(books: &[Book]) -> String {
    let rows: Vec<Vec<String>> = books
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.title.clone(),
                b.isbn.clone(),
                b.available_quantity.to_string(),
                b.quantity.to_string(),
            ]
        })
        .collect();
    table(&["ID", "Title", "ISBN", "Available", "Total"], &rows)
}
