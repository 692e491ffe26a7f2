use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Target of a [`super::SqliteDb`]: a file on disk or a transient memory instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DbLocation {
    /// Memory-resident database, discarded when the connection closes.
    #[default]
    Memory,
    File(PathBuf),
}

impl DbLocation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Memory => None,
            Self::File(path) => Some(path),
        }
    }

    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, ":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<PathBuf> for DbLocation {
    fn from(value: PathBuf) -> Self {
        Self::File(value)
    }
}

impl From<&str> for DbLocation {
    fn from(value: &str) -> Self {
        Self::File(PathBuf::from(value))
    }
}

impl From<&Path> for DbLocation {
    fn from(value: &Path) -> Self {
        Self::File(value.to_path_buf())
    }
}
