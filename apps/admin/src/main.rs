//! # Akul Admin Entry Point
//!
//! ```bash
//! akul-admin issue --member 3 --book 7
//! akul-admin return 12 --date 2024-03-20
//! akul-admin --json report --status overdue
//! AKUL_DB_PATH=./data/library.db akul-admin dashboard
//! ```
//!
//! A failed command prints its `ApiError` as JSON on stderr and exits 1.

use std::process::ExitCode;

use akul_admin::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    akul_admin::init_tracing();

    match akul_admin::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match serde_json::to_string(&err) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", err),
            }
            ExitCode::FAILURE
        }
    }
}
