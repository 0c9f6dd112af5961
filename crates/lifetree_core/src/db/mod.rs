//! Family person store: connection bootstrap and schema migrations.
//!
//! # Responsibility
//! - Open the person store from a file or in memory.
//! - Bring the `persons` schema up to date before any record access.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Every failure names the bootstrap stage it happened in.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Person store failures, tagged by stage.
#[derive(Debug)]
pub enum DbError {
    /// The store location could not be opened.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// A connection pragma or setting was rejected.
    Configure(rusqlite::Error),
    /// A migration script failed; the whole migration run was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The store was written by a newer build.
    UnsupportedSchemaVersion {
        store_version: u32,
        latest_supported: u32,
    },
    /// Any other SQLite failure on an open store.
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "store_open_failed",
            Self::Configure(_) => "store_configure_failed",
            Self::Migration { .. } => "store_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "store_schema_too_new",
            Self::Sqlite(_) => "store_sqlite_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { location, source } => {
                write!(f, "cannot open family store at {location}: {source}")
            }
            Self::Configure(err) => write!(f, "cannot configure family store: {err}"),
            Self::Migration { version, source } => {
                write!(f, "family store migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                store_version,
                latest_supported,
            } => write!(
                f,
                "family store schema version {store_version} is newer than supported {latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Configure(err) | Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
