//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "akul-admin",
    version,
    about = "Akul Library back-office administration"
)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lend a book to a member
    Issue {
        #[arg(long)]
        member: i64,
        #[arg(long)]
        book: i64,
        /// Issue date, defaults to today
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },

    /// Return a loan
    Return {
        /// Circulation id
        circulation: i64,
        /// Return date, defaults to today
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },

    /// Loan table
    #[command(subcommand)]
    Loans(LoanCommand),

    /// Penalty ledger
    #[command(subcommand)]
    Penalty(PenaltyCommand),

    #[command(subcommand)]
    Book(BookCommand),

    #[command(subcommand)]
    Author(AuthorCommand),

    #[command(subcommand)]
    Publisher(PublisherCommand),

    #[command(subcommand)]
    Member(MemberCommand),

    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Notification log
    #[command(subcommand)]
    Notifications(NotificationCommand),

    /// Headline counters
    Dashboard,

    /// Issues, new members and revenue per bucket
    Chart {
        /// last_week, 6_months or last_year
        #[arg(long, default_value = "6_months")]
        window: String,
    },

    /// Circulation report with summary and inventory
    Report {
        #[command(flatten)]
        table: TableArgs,
        /// Write the text report to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Filter and sort options shared by the loan table and the report.
#[derive(Debug, Clone, Default, Args)]
pub struct TableArgs {
    /// Substring of member name or book title
    #[arg(long, short)]
    pub query: Option<String>,
    /// issued, returned or overdue
    #[arg(long)]
    pub status: Option<String>,
    /// Sort key, prefix with '-' for descending
    #[arg(long, default_value = "-issue_date", allow_hyphen_values = true)]
    pub sort: String,
}

#[derive(Debug, Subcommand)]
pub enum LoanCommand {
    List {
        #[command(flatten)]
        table: TableArgs,
    },
    Show {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum PenaltyCommand {
    /// Record a manual penalty
    Add {
        /// Member id or name
        #[arg(long)]
        member: Option<String>,
        /// Name tried when the member input matches nobody
        #[arg(long)]
        fallback_name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        reason: Option<String>,
        /// Title of the related book
        #[arg(long)]
        book: Option<String>,
    },
    Pay {
        id: i64,
    },
    Delete {
        id: i64,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: i64,
        #[arg(long)]
        publisher: i64,
        #[arg(long)]
        isbn: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
        /// Defaults to the quantity
        #[arg(long)]
        available: Option<i64>,
        #[arg(long)]
        thumbnail: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<i64>,
        #[arg(long)]
        publisher: Option<i64>,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        available: Option<i64>,
        #[arg(long)]
        thumbnail: Option<String>,
    },
    Delete {
        id: i64,
    },
    Show {
        id: i64,
    },
    List {
        /// Case-insensitive title search
        #[arg(long, short)]
        search: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AuthorCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        bio: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Deletes the author and their books
    Delete {
        id: i64,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum PublisherCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Option<String>,
    },
    /// Deletes the publisher and their books
    Delete {
        id: i64,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Deletes the member with their loans and penalties
    Delete {
        id: i64,
    },
    Show {
        id: i64,
    },
    List,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        library_name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        loan_duration_days: Option<i64>,
        /// Decimal amount, e.g. 10.50
        #[arg(long)]
        penalty_per_day: Option<String>,
        #[arg(long)]
        max_penalty: Option<String>,
        #[arg(long)]
        max_books: Option<i64>,
    },
}

#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    List {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    ReadAll,
    Clear,
    Unread,
}
