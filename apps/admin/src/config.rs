//! Admin process configuration.
//!
//! Loaded from environment variables with fallback to defaults. Library
//! settings (loan duration, fines) live in the database, not here.

use std::env;
use std::path::PathBuf;

use akul_core::EnforcementPolicy;
use directories::ProjectDirs;
use serde::Serialize;

/// Process configuration for the admin CLI.
#[derive(Debug, Clone, Serialize)]
pub struct AdminConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Which stored limits the circulation workflow applies
    pub policy: EnforcementPolicy,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AKUL_DB_PATH` | platform data dir + `library.db` |
    /// | `AKUL_MAX_CONNECTIONS` | `5` |
    /// | `AKUL_CAP_FINES` | `false` |
    /// | `AKUL_ENFORCE_LOAN_LIMIT` | `false` |
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup("AKUL_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };

        let max_connections: u32 = lookup("AKUL_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("AKUL_MAX_CONNECTIONS".to_string()))?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("AKUL_MAX_CONNECTIONS".to_string()));
        }

        let policy = EnforcementPolicy {
            cap_fines: flag(&lookup, "AKUL_CAP_FINES")?,
            enforce_loan_limit: flag(&lookup, "AKUL_ENFORCE_LOAN_LIMIT")?,
        };

        Ok(AdminConfig {
            db_path,
            max_connections,
            policy,
        })
    }
}

fn flag<F>(lookup: &F, name: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(false),
        Some(value) => match value.trim().to_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            _ => Err(ConfigError::InvalidValue(name.to_string())),
        },
    }
}

/// Platform data directory:
/// - **macOS**: `~/Library/Application Support/org.akul.library/library.db`
/// - **Windows**: `%APPDATA%\akul\library\data\library.db`
/// - **Linux**: `~/.local/share/library/library.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("org", "akul", "library").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("library.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine the platform data directory; set AKUL_DB_PATH")]
    NoDataDir,
}
