//! # Akul Admin
//!
//! Operator CLI for the library back office.
//!
//! ## Module Organization
//! ```text
//! akul_admin/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap argument definitions
//! ├── config.rs       ◄─── Environment configuration
//! ├── output.rs       ◄─── Text tables / JSON
//! ├── commands/
//! │   ├── mod.rs      ◄─── Context, dispatch, failure notices
//! │   ├── circulation.rs
//! │   ├── penalty.rs
//! │   ├── catalog.rs  ◄─── Books, authors, publishers
//! │   ├── member.rs
//! │   ├── settings.rs
//! │   ├── notification.rs
//! │   └── report.rs   ◄─── Dashboard, charts, export
//! └── error.rs        ◄─── ApiError for every command
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info,akul=debug,sqlx=warn (override with RUST_LOG)      │
//! │                                                                         │
//! │  2. Load AdminConfig from AKUL_* variables                              │
//! │                                                                         │
//! │  3. Connect to Database                                                 │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  4. Dispatch the command, print the result                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use akul_core::circulation::parse_date;
use akul_db::{Database, DbConfig};
use chrono::Utc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use commands::Context;
use config::AdminConfig;
use error::ApiError;
use output::OutputFormat;

/// Runs one parsed command line to completion.
pub async fn run(cli: Cli) -> Result<(), ApiError> {
    let config = AdminConfig::load()?;
    debug!(?config, "Configuration loaded");

    let today = match cli.today.as_deref() {
        Some(value) => parse_date(value)?,
        None => Utc::now().date_naive(),
    };

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            tracing::error!(path = %parent.display(), "Cannot create data directory: {}", e);
            ApiError::internal(format!("Cannot create {}", parent.display()))
        })?;
    }

    let db = Database::new(
        DbConfig::new(&config.db_path).max_connections(config.max_connections),
    )
    .await?;
    info!(path = %config.db_path.display(), "Database ready");

    let ctx = Context {
        db,
        policy: config.policy,
        today,
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
    };

    let result = commands::dispatch(&ctx, cli.command).await;
    ctx.db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays clean for `--json` output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,akul=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
