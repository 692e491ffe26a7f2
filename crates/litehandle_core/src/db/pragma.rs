//! Allow-listed pragma names for scalar get/set access.
//!
//! SQLite cannot bind a pragma *name* as a parameter, so every name reaching
//! the engine must come from [`Pragma`]. Free-form names are parsed through
//! [`Pragma::from_str`] and rejected when unknown.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pragma {
    ApplicationId,
    AutoVacuum,
    BusyTimeout,
    CacheSize,
    DataVersion,
    Encoding,
    ForeignKeys,
    FreelistCount,
    JournalMode,
    JournalSizeLimit,
    PageCount,
    PageSize,
    QueryOnly,
    RecursiveTriggers,
    Synchronous,
    TempStore,
    UserVersion,
    WalAutocheckpoint,
}

const ALL_PRAGMAS: &[Pragma] = &[
    Pragma::ApplicationId,
    Pragma::AutoVacuum,
    Pragma::BusyTimeout,
    Pragma::CacheSize,
    Pragma::DataVersion,
    Pragma::Encoding,
    Pragma::ForeignKeys,
    Pragma::FreelistCount,
    Pragma::JournalMode,
    Pragma::JournalSizeLimit,
    Pragma::PageCount,
    Pragma::PageSize,
    Pragma::QueryOnly,
    Pragma::RecursiveTriggers,
    Pragma::Synchronous,
    Pragma::TempStore,
    Pragma::UserVersion,
    Pragma::WalAutocheckpoint,
];

impl Pragma {
    /// Every pragma accepted by the handle.
    pub fn all() -> &'static [Pragma] {
        ALL_PRAGMAS
    }

    /// Engine-level name as written in `PRAGMA <name>`.
    pub fn name(self) -> &'static str {
        match self {
            Self::ApplicationId => "application_id",
            Self::AutoVacuum => "auto_vacuum",
            Self::BusyTimeout => "busy_timeout",
            Self::CacheSize => "cache_size",
            Self::DataVersion => "data_version",
            Self::Encoding => "encoding",
            Self::ForeignKeys => "foreign_keys",
            Self::FreelistCount => "freelist_count",
            Self::JournalMode => "journal_mode",
            Self::JournalSizeLimit => "journal_size_limit",
            Self::PageCount => "page_count",
            Self::PageSize => "page_size",
            Self::QueryOnly => "query_only",
            Self::RecursiveTriggers => "recursive_triggers",
            Self::Synchronous => "synchronous",
            Self::TempStore => "temp_store",
            Self::UserVersion => "user_version",
            Self::WalAutocheckpoint => "wal_autocheckpoint",
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(
            self,
            Self::DataVersion | Self::FreelistCount | Self::PageCount
        )
    }

    /// Writing these makes the engine answer with the effective value.
    pub(crate) fn reports_on_write(self) -> bool {
        matches!(
            self,
            Self::BusyTimeout | Self::JournalMode | Self::JournalSizeLimit
        )
    }
}

impl Display for Pragma {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pragma {
    type Err = PragmaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ALL_PRAGMAS
            .iter()
            .copied()
            .find(|pragma| pragma.name() == normalized)
            .ok_or_else(|| PragmaError::Unknown(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PragmaError {
    /// Name is not on the allow-list.
    Unknown(String),
    ReadOnly(Pragma),
    /// The engine answered with a value outside the typed accessor's range.
    UnexpectedValue { pragma: Pragma, value: String },
}

impl Display for PragmaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "pragma `{name}` is not supported"),
            Self::ReadOnly(pragma) => write!(f, "pragma `{pragma}` is read-only"),
            Self::UnexpectedValue { pragma, value } => {
                write!(f, "pragma `{pragma}` returned unexpected value `{value}`")
            }
        }
    }
}

impl Error for PragmaError {}
