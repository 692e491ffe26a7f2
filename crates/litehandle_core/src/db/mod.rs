//! SQLite handle lifecycle, bootstrap and pragma helpers.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections on demand and close them again.
//! - Run an init script exactly when a database is empty at open time.
//! - Expose transaction, vacuum, catalog and pragma helpers over the handle.
//!
//! # Invariants
//! - A handle holds a live connection if and only if it is open.
//! - A database holding at least one table is never re-initialized.
//! - Pragma names come from a fixed allow-list, never from raw strings.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod config;
mod handle;
mod inspect;
mod location;
mod pragma;
mod scoped;
mod script;
mod sql;

pub use config::{ConnectionConfig, JournalMode, Synchronous, TempStore, TextEncoding};
pub use handle::SqliteDb;
pub use inspect::{CheckMode, ForeignKeyViolation, IntegrityReport};
pub use location::DbLocation;
pub use pragma::{Pragma, PragmaError};
pub use scoped::OpenGuard;
pub use script::{ScriptEncoding, ScriptError};

pub type DbResult<T> = Result<T, DbError>;

/// Coarse error category, independent of the carried details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    Connection,
    NotOpen,
    Script,
    Statement,
    InvalidPragma,
}

#[derive(Debug)]
pub enum DbError {
    /// The database file or memory instance could not be opened, configured or closed.
    Connection {
        location: String,
        source: rusqlite::Error,
    },
    /// The init (or any other) script file could not be read or decoded.
    ScriptRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An operation needing a live connection ran on a closed handle.
    NotOpen,
    Script(ScriptError),
    /// A single ad-hoc statement failed at the engine level.
    Statement {
        sql: String,
        source: rusqlite::Error,
    },
    InvalidPragma(PragmaError),
    /// A connection setting is outside what the engine accepts.
    InvalidConfig {
        field: &'static str,
        message: String,
    },
}

impl DbError {
    pub fn kind(&self) -> DbErrorKind {
        match self {
            Self::Connection { .. } | Self::ScriptRead { .. } | Self::InvalidConfig { .. } => {
                DbErrorKind::Connection
            }
            Self::NotOpen => DbErrorKind::NotOpen,
            Self::Script(_) => DbErrorKind::Script,
            Self::Statement { .. } => DbErrorKind::Statement,
            Self::InvalidPragma(_) => DbErrorKind::InvalidPragma,
        }
    }

    pub(crate) fn statement(sql: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Statement {
            sql: sql.into(),
            source,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection { location, source } => {
                write!(f, "cannot open database `{location}`: {source}")
            }
            Self::ScriptRead { path, source } => {
                write!(f, "cannot read script `{}`: {source}", path.display())
            }
            Self::NotOpen => write!(f, "database handle is not open"),
            Self::Script(err) => write!(f, "{err}"),
            Self::Statement { sql, source } => write!(f, "statement `{sql}` failed: {source}"),
            Self::InvalidPragma(err) => write!(f, "{err}"),
            Self::InvalidConfig { field, message } => {
                write!(f, "invalid connection setting `{field}`: {message}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::ScriptRead { source, .. } => Some(source),
            Self::NotOpen => None,
            Self::Script(err) => Some(err),
            Self::Statement { source, .. } => Some(source),
            Self::InvalidPragma(err) => Some(err),
            Self::InvalidConfig { .. } => None,
        }
    }
}

impl From<ScriptError> for DbError {
    fn from(value: ScriptError) -> Self {
        Self::Script(value)
    }
}

impl From<PragmaError> for DbError {
    fn from(value: PragmaError) -> Self {
        Self::InvalidPragma(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DbError, DbErrorKind, PragmaError};
    use std::error::Error;
    use std::path::PathBuf;

    #[test]
    fn script_read_counts_as_connection_failure() {
        let err = DbError::ScriptRead {
            path: PathBuf::from("missing.sql"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), DbErrorKind::Connection);
        assert!(err.to_string().contains("missing.sql"));
        assert!(err.source().is_some());
    }

    #[test]
    fn not_open_has_no_source() {
        let err = DbError::NotOpen;
        assert_eq!(err.kind(), DbErrorKind::NotOpen);
        assert!(err.source().is_none());
    }

    #[test]
    fn pragma_errors_convert() {
        let err: DbError = PragmaError::Unknown("bogus".to_string()).into();
        assert_eq!(err.kind(), DbErrorKind::InvalidPragma);
        assert!(err.to_string().contains("bogus"));
    }
}
