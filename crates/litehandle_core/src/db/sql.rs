//! Statement templates shared by the handle. Immutable for the process lifetime.

/// User tables only; `sqlite_` names are reserved for engine bookkeeping.
pub(crate) const COUNT_TABLES_SQL: &str = "SELECT count(*)
FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\';";

pub(crate) const TABLE_NAMES_SQL: &str = "SELECT name
FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\';";

pub(crate) const COLUMN_NAMES_SQL: &str = "SELECT name FROM pragma_table_info(?1) ORDER BY cid;";

pub(crate) const DB_SIZE_SQL: &str =
    "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size();";

pub(crate) const BEGIN_DEFERRED_SQL: &str = "BEGIN DEFERRED TRANSACTION;";
pub(crate) const BEGIN_IMMEDIATE_SQL: &str = "BEGIN IMMEDIATE TRANSACTION;";
pub(crate) const BEGIN_EXCLUSIVE_SQL: &str = "BEGIN EXCLUSIVE TRANSACTION;";
pub(crate) const COMMIT_SQL: &str = "COMMIT;";
pub(crate) const ROLLBACK_SQL: &str = "ROLLBACK;";
pub(crate) const VACUUM_SQL: &str = "VACUUM;";
