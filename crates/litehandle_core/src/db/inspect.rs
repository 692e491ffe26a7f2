//! Read-only inspection helpers: consistency checks, file size and column listing.

use super::handle::SqliteDb;
use super::sql::{COLUMN_NAMES_SQL, DB_SIZE_SQL};
use super::{DbError, DbResult};
use log::{info, warn};

const INTEGRITY_OK: &str = "ok";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// `quick_check`: skips index content verification.
    #[default]
    Quick,
    /// `integrity_check`: full verification, proportional to file size.
    Full,
}

impl CheckMode {
    fn pragma_name(self) -> &'static str {
        match self {
            Self::Quick => "quick_check",
            Self::Full => "integrity_check",
        }
    }
}

/// A row referencing a missing parent, as reported by `foreign_key_check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyViolation {
    pub table: String,
    /// `None` for `WITHOUT ROWID` tables.
    pub rowid: Option<i64>,
    pub parent: String,
    pub constraint_index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntegrityReport {
    /// Engine messages describing storage problems; empty when healthy.
    pub problems: Vec<String>,
    pub foreign_key_violations: Vec<ForeignKeyViolation>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty() && self.foreign_key_violations.is_empty()
    }
}

impl SqliteDb {
    /// Runs the engine's consistency check and the foreign key check.
    pub fn check(&self, mode: CheckMode) -> DbResult<IntegrityReport> {
        let conn = self.connection()?;
        let mut report = IntegrityReport::default();

        conn.pragma_query(None, mode.pragma_name(), |row| {
            let message: String = row.get(0)?;
            if message != INTEGRITY_OK {
                report.problems.push(message);
            }
            Ok(())
        })
        .map_err(|source| DbError::statement(format!("PRAGMA {}", mode.pragma_name()), source))?;

        conn.pragma_query(None, "foreign_key_check", |row| {
            report.foreign_key_violations.push(ForeignKeyViolation {
                table: row.get(0)?,
                rowid: row.get(1)?,
                parent: row.get(2)?,
                constraint_index: row.get(3)?,
            });
            Ok(())
        })
        .map_err(|source| DbError::statement("PRAGMA foreign_key_check", source))?;

        if report.is_ok() {
            info!("event=db_check module=db status=ok mode={mode:?}");
        } else {
            warn!(
                "event=db_check module=db status=failed mode={mode:?} problems={} foreign_key_violations={}",
                report.problems.len(),
                report.foreign_key_violations.len()
            );
        }
        Ok(report)
    }

    /// Size of the main database file in bytes (`page_count * page_size`).
    ///
    /// Pages still sitting in the WAL sidecar are counted once checkpointed.
    pub fn db_size(&self) -> DbResult<u64> {
        let bytes: i64 = self.query_scalar(DB_SIZE_SQL, [])?;
        Ok(u64::try_from(bytes).unwrap_or_default())
    }

    /// Column names of `table` in declaration order; empty when the table is unknown.
    pub fn column_names(&self, table: &str) -> DbResult<Vec<String>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(COLUMN_NAMES_SQL)
            .map_err(|source| DbError::statement(COLUMN_NAMES_SQL, source))?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|source| DbError::statement(COLUMN_NAMES_SQL, source))?;
        Ok(names)
    }

    /// Result column names `sql` would produce, without running it.
    pub fn query_column_names(&self, sql: &str) -> DbResult<Vec<String>> {
        let stmt = self
            .connection()?
            .prepare(sql)
            .map_err(|source| DbError::statement(sql, source))?;
        Ok(stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}
