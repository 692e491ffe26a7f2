//! Reopenable SQLite database handle with first-open bootstrap.
//! The engine does the heavy lifting; this crate only sequences calls into it.

pub mod db;
pub mod logging;

pub use db::{
    CheckMode, ConnectionConfig, DbError, DbErrorKind, DbLocation, DbResult, ForeignKeyViolation,
    IntegrityReport, JournalMode, OpenGuard, Pragma, PragmaError, ScriptEncoding, ScriptError,
    SqliteDb, Synchronous, TempStore, TextEncoding,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use rusqlite::TransactionBehavior;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns the version of the linked SQLite library.
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}
