//! Reopenable database handle with first-open bootstrap.
//!
//! # Responsibility
//! - Hold configuration while closed; own one live connection while open.
//! - On open: connect, apply pragmas, then run the init script if the
//!   database has no tables yet.
//!
//! # Invariants
//! - `conn` is `Some` exactly while the handle is open.
//! - A partially opened connection is dropped before any error propagates.
//! - `close` on a closed handle is a no-op.

use super::config::{ConnectionConfig, JournalMode, Synchronous, TempStore, TextEncoding};
use super::location::DbLocation;
use super::pragma::{Pragma, PragmaError};
use super::script::{read_script, run_script, ScriptEncoding};
use super::sql::{
    BEGIN_DEFERRED_SQL, BEGIN_EXCLUSIVE_SQL, BEGIN_IMMEDIATE_SQL, COMMIT_SQL, COUNT_TABLES_SQL,
    ROLLBACK_SQL, TABLE_NAMES_SQL, VACUUM_SQL,
};
use super::{DbError, DbResult};
use crate::logging::sanitize_message;
use log::{debug, error, info, warn};
use rusqlite::types::{FromSql, Value};
use rusqlite::{Connection, Params, ToSql, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Instant;

const LOGGED_SQL_CHARS: usize = 120;

/// Wrapper of one SQLite connection that can be closed and reopened.
///
/// Construction performs no I/O; call [`SqliteDb::open`] (or
/// [`SqliteDb::open_scoped`] / [`SqliteDb::with_open`]) to connect.
pub struct SqliteDb {
    location: DbLocation,
    init_script: Option<PathBuf>,
    config: ConnectionConfig,
    transaction_behavior: TransactionBehavior,
    conn: Option<Connection>,
}

impl SqliteDb {
    /// Creates a closed handle for `location` with default settings.
    ///
    /// Performs no I/O: the file is created or opened by [`SqliteDb::open`].
    pub fn new(location: impl Into<DbLocation>) -> Self {
        Self {
            location: location.into(),
            init_script: None,
            config: ConnectionConfig::default(),
            transaction_behavior: TransactionBehavior::Deferred,
            conn: None,
        }
    }

    /// Creates a closed handle for a transient in-memory database. Performs no I/O.
    pub fn in_memory() -> Self {
        Self::new(DbLocation::Memory)
    }

    /// Script run once, when the database holds no tables at open time.
    ///
    /// Must be UTF-8 and small enough to be read wholly into memory.
    pub fn with_init_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.init_script = Some(path.into());
        self
    }

    /// Pragmas and busy timeout applied on every open.
    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Locking mode for [`SqliteDb::start_transaction`]; `Deferred` by default.
    pub fn with_transaction_behavior(mut self, behavior: TransactionBehavior) -> Self {
        self.transaction_behavior = behavior;
        self
    }

    /// Database file path, or the in-memory marker.
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    pub fn init_script(&self) -> Option<&Path> {
        self.init_script.as_deref()
    }

    /// Settings applied on the next open.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_in_memory(&self) -> bool {
        self.location.is_memory()
    }

    /// `true` while the handle owns a live connection.
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Connects and bootstraps the database.
    ///
    /// Opening an already open handle does nothing.
    ///
    /// # Errors
    /// - `Connection` when the file cannot be opened or configured.
    /// - `InvalidConfig` when a connection setting is out of range.
    /// - `ScriptRead` when the init script cannot be read.
    /// - `Script` when an init script statement fails.
    pub fn open(&mut self) -> DbResult<()> {
        if self.conn.is_some() {
            debug!(
                "event=db_open module=db status=skipped mode={} reason=already_open",
                self.location.mode()
            );
            return Ok(());
        }

        let started_at = Instant::now();
        let mode = self.location.mode();
        info!("event=db_open module=db status=start mode={mode}");

        match self.connect_and_bootstrap() {
            Ok((conn, initialized)) => {
                self.conn = Some(conn);
                info!(
                    "event=db_open module=db status=ok mode={mode} initialized={initialized} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode={mode} duration_ms={} error_kind={:?} error={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                Err(err)
            }
        }
    }

    // The connection only escapes on success; any early return drops (closes) it.
    fn connect_and_bootstrap(&self) -> DbResult<(Connection, bool)> {
        self.config.validate()?;
        let conn = match &self.location {
            DbLocation::Memory => Connection::open_in_memory(),
            DbLocation::File(path) => Connection::open(path),
        }
        .map_err(|source| self.connection_error(source))?;

        self.config
            .apply(&conn)
            .map_err(|source| self.connection_error(source))?;

        let Some(script_path) = self.init_script.as_deref() else {
            return Ok((conn, false));
        };
        if count_tables(&conn)? > 0 {
            return Ok((conn, false));
        }

        let script = read_script(script_path, ScriptEncoding::Utf8)?;
        let executed = run_script(&conn, Some(script_path), &script)?;
        info!(
            "event=db_init_script module=db status=ok statements={} script={}",
            executed,
            script_path.display()
        );
        Ok((conn, true))
    }

    /// Closes the connection. Closing a closed handle does nothing.
    ///
    /// The handle is closed afterwards even when the engine reports an error.
    pub fn close(&mut self) -> DbResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!(
                    "event=db_close module=db status=ok mode={}",
                    self.location.mode()
                );
                Ok(())
            }
            Err((_conn, source)) => {
                warn!(
                    "event=db_close module=db status=error mode={} error={}",
                    self.location.mode(),
                    source
                );
                Err(self.connection_error(source))
            }
        }
    }

    /// Live connection for statements not covered by the helpers.
    pub fn connection(&self) -> DbResult<&Connection> {
        self.conn.as_ref().ok_or(DbError::NotOpen)
    }

    /// Returns `true` if the database contains no user tables.
    pub fn is_empty(&self) -> DbResult<bool> {
        Ok(count_tables(self.connection()?)? == 0)
    }

    /// Executes a single statement and returns the number of changed rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> DbResult<usize> {
        self.connection()?
            .execute(sql, params)
            .map_err(|source| statement_error(sql, source))
    }

    /// Executes several `;`-separated statements that take no parameters.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.connection()?
            .execute_batch(sql)
            .map_err(|source| statement_error(sql, source))
    }

    /// Runs a query expected to return one row and reads its first column.
    pub fn query_scalar<T: FromSql, P: Params>(&self, sql: &str, params: P) -> DbResult<T> {
        self.connection()?
            .query_row(sql, params, |row| row.get(0))
            .map_err(|source| statement_error(sql, source))
    }

    /// Reads a script file and runs its statements in order.
    ///
    /// The file is read wholly into memory. The first failing statement
    /// aborts the rest and is reported as [`DbError::Script`].
    pub fn execute_script(
        &self,
        path: impl AsRef<Path>,
        encoding: ScriptEncoding,
    ) -> DbResult<usize> {
        let conn = self.connection()?;
        let path = path.as_ref();
        let script = read_script(path, encoding)?;
        Ok(run_script(conn, Some(path), &script)?)
    }

    /// Runs the statements of an in-memory script in order.
    pub fn execute_script_str(&self, sql: &str) -> DbResult<usize> {
        Ok(run_script(self.connection()?, None, sql)?)
    }

    pub fn transaction_behavior(&self) -> TransactionBehavior {
        self.transaction_behavior
    }

    /// Locking mode used by later [`SqliteDb::start_transaction`] calls.
    pub fn set_transaction_behavior(&mut self, behavior: TransactionBehavior) {
        self.transaction_behavior = behavior;
    }

    /// Begins a transaction. Nesting is rejected by the engine.
    pub fn start_transaction(&self) -> DbResult<()> {
        let sql = match self.transaction_behavior {
            TransactionBehavior::Immediate => BEGIN_IMMEDIATE_SQL,
            TransactionBehavior::Exclusive => BEGIN_EXCLUSIVE_SQL,
            _ => BEGIN_DEFERRED_SQL,
        };
        self.run_control(sql)
    }

    pub fn commit(&self) -> DbResult<()> {
        self.run_control(COMMIT_SQL)
    }

    pub fn rollback(&self) -> DbResult<()> {
        self.run_control(ROLLBACK_SQL)
    }

    pub fn in_transaction(&self) -> DbResult<bool> {
        Ok(!self.connection()?.is_autocommit())
    }

    /// Rebuilds the database file to reclaim free pages.
    ///
    /// Blocks until the engine finishes; this can take long on large files.
    /// Fails inside an open transaction.
    pub fn vacuum(&self) -> DbResult<()> {
        let started_at = Instant::now();
        self.run_control(VACUUM_SQL)?;
        info!(
            "event=db_vacuum module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Names of all user tables, in catalog order (no sorting applied).
    pub fn table_names(&self) -> DbResult<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(TABLE_NAMES_SQL)
            .map_err(|source| statement_error(TABLE_NAMES_SQL, source))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|source| statement_error(TABLE_NAMES_SQL, source))?;
        Ok(names)
    }

    /// Reads the current value of an allow-listed pragma.
    pub fn pragma(&self, pragma: Pragma) -> DbResult<Value> {
        self.connection()?
            .pragma_query_value(None, pragma.name(), |row| row.get::<_, Value>(0))
            .map_err(|source| statement_error(format!("PRAGMA {pragma}"), source))
    }

    /// Writes an allow-listed pragma. The value is rendered as a SQL literal
    /// by the engine bindings, never spliced in as raw text.
    pub fn set_pragma<V: ToSql>(&self, pragma: Pragma, value: V) -> DbResult<()> {
        if !pragma.is_writable() {
            return Err(PragmaError::ReadOnly(pragma).into());
        }
        let conn = self.connection()?;
        let result = if pragma.reports_on_write() {
            conn.pragma_update_and_check(None, pragma.name(), value, |row| {
                row.get::<_, Value>(0)
            })
            .map(|_| ())
        } else {
            conn.pragma_update(None, pragma.name(), value)
        };
        result.map_err(|source| statement_error(format!("PRAGMA {pragma} = ?"), source))
    }

    /// Like [`SqliteDb::pragma`], for names coming from outside the program.
    pub fn pragma_by_name(&self, name: &str) -> DbResult<Value> {
        self.pragma(name.parse()?)
    }

    /// Like [`SqliteDb::set_pragma`], for names coming from outside the program.
    pub fn set_pragma_by_name<V: ToSql>(&self, name: &str, value: V) -> DbResult<()> {
        self.set_pragma(name.parse()?, value)
    }

    pub fn journal_mode(&self) -> DbResult<JournalMode> {
        let value = self.pragma_text(Pragma::JournalMode)?;
        JournalMode::from_engine(&value)
            .ok_or_else(|| unexpected_value(Pragma::JournalMode, value))
    }

    /// Switches journal mode and returns the mode the engine actually chose.
    ///
    /// In-memory databases stay in `memory` mode regardless of the request.
    pub fn set_journal_mode(&self, mode: JournalMode) -> DbResult<JournalMode> {
        let value: String = self
            .connection()?
            .pragma_update_and_check(None, Pragma::JournalMode.name(), mode.as_sql(), |row| {
                row.get(0)
            })
            .map_err(|source| statement_error("PRAGMA journal_mode = ?", source))?;
        JournalMode::from_engine(&value)
            .ok_or_else(|| unexpected_value(Pragma::JournalMode, value))
    }

    pub fn synchronous(&self) -> DbResult<Synchronous> {
        let value = self.pragma_integer(Pragma::Synchronous)?;
        Synchronous::from_engine(value)
            .ok_or_else(|| unexpected_value(Pragma::Synchronous, value.to_string()))
    }

    pub fn set_synchronous(&self, level: Synchronous) -> DbResult<()> {
        self.set_pragma(Pragma::Synchronous, level.as_sql())
    }

    pub fn temp_store(&self) -> DbResult<TempStore> {
        let value = self.pragma_integer(Pragma::TempStore)?;
        TempStore::from_engine(value)
            .ok_or_else(|| unexpected_value(Pragma::TempStore, value.to_string()))
    }

    pub fn encoding(&self) -> DbResult<TextEncoding> {
        let value = self.pragma_text(Pragma::Encoding)?;
        TextEncoding::from_engine(&value).ok_or_else(|| unexpected_value(Pragma::Encoding, value))
    }

    pub fn foreign_keys_enabled(&self) -> DbResult<bool> {
        Ok(self.pragma_integer(Pragma::ForeignKeys)? != 0)
    }

    pub fn cache_size(&self) -> DbResult<i64> {
        self.pragma_integer(Pragma::CacheSize)
    }

    fn pragma_integer(&self, pragma: Pragma) -> DbResult<i64> {
        match self.pragma(pragma)? {
            Value::Integer(value) => Ok(value),
            other => Err(unexpected_value(pragma, format!("{other:?}"))),
        }
    }

    fn pragma_text(&self, pragma: Pragma) -> DbResult<String> {
        match self.pragma(pragma)? {
            Value::Text(value) => Ok(value),
            other => Err(unexpected_value(pragma, format!("{other:?}"))),
        }
    }

    fn run_control(&self, sql: &'static str) -> DbResult<()> {
        let conn = self.connection()?;
        debug!(
            "event=db_statement module=db status=start sql={}",
            sanitize_message(sql, LOGGED_SQL_CHARS)
        );
        conn.execute_batch(sql)
            .map_err(|source| statement_error(sql, source))
    }

    fn connection_error(&self, source: rusqlite::Error) -> DbError {
        DbError::Connection {
            location: self.location.to_string(),
            source,
        }
    }
}

impl std::fmt::Debug for SqliteDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDb")
            .field("location", &self.location)
            .field("init_script", &self.init_script)
            .field("open", &self.is_open())
            .finish()
    }
}

fn count_tables(conn: &Connection) -> DbResult<i64> {
    conn.query_row(COUNT_TABLES_SQL, [], |row| row.get(0))
        .map_err(|source| statement_error(COUNT_TABLES_SQL, source))
}

fn statement_error(sql: impl Into<String>, source: rusqlite::Error) -> DbError {
    let sql = sql.into();
    debug!(
        "event=db_statement module=db status=error sql={} error={}",
        sanitize_message(&sql, LOGGED_SQL_CHARS),
        source
    );
    DbError::statement(sql, source)
}

fn unexpected_value(pragma: Pragma, value: String) -> DbError {
    PragmaError::UnexpectedValue { pragma, value }.into()
}
