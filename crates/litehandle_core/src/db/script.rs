//! Multi-statement script loading and execution.
//!
//! Scripts are read wholly into memory, so they are expected to be small
//! (schema plus seed data). Statements are split by SQLite's own parser and
//! run in file order; the first failure stops the script.

use super::{DbError, DbResult};
use rusqlite::{Batch, Connection, Statement};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const UTF8_BOM: char = '\u{feff}';

/// Text encoding of a script file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptEncoding {
    /// Strict UTF-8; a leading byte-order mark is skipped.
    #[default]
    Utf8,
    /// ISO-8859-1, every byte maps to the code point of the same value.
    Latin1,
}

impl ScriptEncoding {
    fn decode(self, bytes: Vec<u8>) -> std::io::Result<String> {
        match self {
            Self::Utf8 => {
                let text = String::from_utf8(bytes)
                    .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
                Ok(match text.strip_prefix(UTF8_BOM) {
                    Some(stripped) => stripped.to_string(),
                    None => text,
                })
            }
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// A script statement failed; later statements were not run.
#[derive(Debug)]
pub struct ScriptError {
    /// Source file, `None` for scripts passed as text.
    pub path: Option<PathBuf>,
    /// Zero-based position of the failing statement in the script.
    pub statement_index: usize,
    /// SQL text of the failing statement when the engine could prepare it.
    pub statement: Option<String>,
    pub source: rusqlite::Error,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "script `{}`", path.display())?,
            None => write!(f, "script")?,
        }
        write!(f, " failed at statement #{}", self.statement_index + 1)?;
        if let Some(statement) = &self.statement {
            write!(f, " (`{statement}`)")?;
        }
        write!(f, ": {}", self.source)
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Reads a whole script file into memory.
pub(crate) fn read_script(path: &Path, encoding: ScriptEncoding) -> DbResult<String> {
    std::fs::read(path)
        .and_then(|bytes| encoding.decode(bytes))
        .map_err(|source| DbError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs every statement of `sql` in order and returns how many were executed.
pub(crate) fn run_script(
    conn: &Connection,
    path: Option<&Path>,
    sql: &str,
) -> Result<usize, ScriptError> {
    let failure = |statement_index: usize, statement: Option<String>, source| ScriptError {
        path: path.map(Path::to_path_buf),
        statement_index,
        statement,
        source,
    };

    let mut batch = Batch::new(conn, sql);
    let mut executed = 0;
    loop {
        let mut stmt = match batch.next() {
            Ok(Some(stmt)) => stmt,
            Ok(None) => break,
            Err(err) => return Err(failure(executed, None, err)),
        };
        if let Err(err) = run_statement(&mut stmt) {
            return Err(failure(executed, stmt.expanded_sql(), err));
        }
        executed += 1;
    }

    Ok(executed)
}

// Row-returning statements (SELECT, some PRAGMAs) are drained and discarded.
fn run_statement(stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
    let mut rows = stmt.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}
