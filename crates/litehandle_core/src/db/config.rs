//! Connection configuration applied on every open.
//!
//! # Invariants
//! - `encoding` is applied first; SQLite ignores it once the file has content.
//! - Defaults favour durability: WAL journal, `synchronous = EXTRA`, foreign keys on.

use super::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CACHE_SIZE: i64 = -100_000;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub encoding: TextEncoding,
    pub journal_mode: JournalMode,
    /// Positive values count pages, negative values count KiB.
    pub cache_size: i64,
    pub synchronous: Synchronous,
    pub temp_store: TempStore,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            journal_mode: JournalMode::Wal,
            cache_size: DEFAULT_CACHE_SIZE,
            synchronous: Synchronous::Extra,
            temp_store: TempStore::Memory,
            foreign_keys: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl ConnectionConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Rejects values the engine cannot represent.
    ///
    /// SQLite takes the busy timeout as a signed 32-bit millisecond count.
    pub fn validate(&self) -> DbResult<()> {
        if i32::try_from(self.busy_timeout_ms).is_err() {
            return Err(DbError::InvalidConfig {
                field: "busy_timeout_ms",
                message: format!(
                    "{} ms exceeds the maximum of {} ms",
                    self.busy_timeout_ms,
                    i32::MAX
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn apply(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.pragma_update(None, "encoding", self.encoding.as_sql())?;
        let effective_mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            self.journal_mode.as_sql(),
            |row| row.get(0),
        )?;
        conn.pragma_update(None, "cache_size", self.cache_size)?;
        conn.pragma_update(None, "synchronous", self.synchronous.as_sql())?;
        conn.pragma_update(None, "temp_store", self.temp_store.as_sql())?;
        conn.pragma_update(None, "foreign_keys", self.foreign_keys)?;
        conn.busy_timeout(self.busy_timeout())?;

        debug!(
            "event=db_configure module=db status=ok journal_mode={} requested_journal_mode={}",
            effective_mode,
            self.journal_mode.as_sql()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }

    pub(crate) fn from_engine(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "delete" => Some(Self::Delete),
            "truncate" => Some(Self::Truncate),
            "persist" => Some(Self::Persist),
            "memory" => Some(Self::Memory),
            "wal" => Some(Self::Wal),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Synchronous {
    Off,
    Normal,
    Full,
    Extra,
}

impl Synchronous {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
            Self::Extra => "EXTRA",
        }
    }

    pub(crate) fn from_engine(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Normal),
            2 => Some(Self::Full),
            3 => Some(Self::Extra),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempStore {
    Default,
    File,
    Memory,
}

impl TempStore {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::File => "FILE",
            Self::Memory => "MEMORY",
        }
    }

    pub(crate) fn from_engine(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Default),
            1 => Some(Self::File),
            2 => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "UTF-8")]
    Utf8,
    #[serde(rename = "UTF-16le")]
    Utf16Le,
    #[serde(rename = "UTF-16be")]
    Utf16Be,
}

impl TextEncoding {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16le",
            Self::Utf16Be => "UTF-16be",
        }
    }

    pub(crate) fn from_engine(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "utf-16le" => Some(Self::Utf16Le),
            "utf-16be" => Some(Self::Utf16Be),
            _ => None,
        }
    }
}
