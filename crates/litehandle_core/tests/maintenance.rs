use litehandle_core::{CheckMode, DbErrorKind, Pragma, SqliteDb, TransactionBehavior};
use rusqlite::types::Value;

fn open_memory() -> SqliteDb {
    let mut db = SqliteDb::in_memory();
    db.open().unwrap();
    db
}

#[test]
fn commit_persists_and_rollback_discards() {
    let db = open_memory();
    db.execute("CREATE TABLE t(x INTEGER)", []).unwrap();

    db.start_transaction().unwrap();
    db.execute("INSERT INTO t VALUES (1)", []).unwrap();
    db.commit().unwrap();

    db.start_transaction().unwrap();
    db.execute("INSERT INTO t VALUES (2)", []).unwrap();
    assert!(db.in_transaction().unwrap());
    db.rollback().unwrap();

    let total: i64 = db.query_scalar("SELECT sum(x) FROM t", []).unwrap();
    assert_eq!(total, 1);
    assert!(!db.in_transaction().unwrap());
}

#[test]
fn nested_transaction_is_rejected_by_engine() {
    let db = open_memory();
    db.start_transaction().unwrap();

    let err = db.start_transaction().unwrap_err();
    assert_eq!(err.kind(), DbErrorKind::Statement);
    db.rollback().unwrap();
}

#[test]
fn commit_without_transaction_is_statement_error() {
    let db = open_memory();
    assert_eq!(db.commit().unwrap_err().kind(), DbErrorKind::Statement);
}

#[test]
fn exclusive_behavior_can_be_switched_at_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SqliteDb::new(dir.path().join("tx.db"));
    db.open().unwrap();
    db.set_transaction_behavior(TransactionBehavior::Exclusive);

    db.start_transaction().unwrap();
    db.execute("CREATE TABLE t(x)", []).unwrap();
    db.commit().unwrap();
    assert_eq!(db.table_names().unwrap(), vec!["t".to_string()]);
}

#[test]
fn vacuum_reclaims_free_pages() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SqliteDb::new(dir.path().join("vacuum.db"));
    db.open().unwrap();
    db.execute_script_str(
        "CREATE TABLE blobs(data BLOB);
         WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 200)
         INSERT INTO blobs SELECT zeroblob(4096) FROM n;
         DELETE FROM blobs;",
    )
    .unwrap();
    assert_ne!(db.pragma(Pragma::FreelistCount).unwrap(), Value::Integer(0));

    db.vacuum().unwrap();

    assert_eq!(db.pragma(Pragma::FreelistCount).unwrap(), Value::Integer(0));
}

#[test]
fn vacuum_inside_transaction_fails() {
    let db = open_memory();
    db.start_transaction().unwrap();
    assert_eq!(db.vacuum().unwrap_err().kind(), DbErrorKind::Statement);
}

#[test]
fn db_size_grows_with_content() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SqliteDb::new(dir.path().join("size.db"));
    db.open().unwrap();
    let empty_size = db.db_size().unwrap();

    db.execute("CREATE TABLE t(x)", []).unwrap();
    let page_size: i64 = db.query_scalar("PRAGMA page_size", []).unwrap();

    let size = db.db_size().unwrap();
    assert!(size > empty_size);
    assert_eq!(size % page_size as u64, 0);
}

#[test]
fn check_reports_foreign_key_violations() {
    let db = open_memory();
    db.execute_batch(
        "CREATE TABLE parent(id INTEGER PRIMARY KEY);
         CREATE TABLE child(parent_id INTEGER REFERENCES parent(id));",
    )
    .unwrap();
    assert!(db.check(CheckMode::Full).unwrap().is_ok());

    db.set_pragma(Pragma::ForeignKeys, false).unwrap();
    db.execute("INSERT INTO child(parent_id) VALUES (7)", [])
        .unwrap();

    let report = db.check(CheckMode::Quick).unwrap();
    assert!(!report.is_ok());
    assert!(report.problems.is_empty());
    assert_eq!(report.foreign_key_violations.len(), 1);
    let violation = &report.foreign_key_violations[0];
    assert_eq!(violation.table, "child");
    assert_eq!(violation.parent, "parent");
    assert_eq!(violation.rowid, Some(1));
}

#[test]
fn column_names_of_table_and_query() {
    let db = open_memory();
    db.execute("CREATE TABLE points(x INTEGER, y INTEGER)", [])
        .unwrap();

    assert_eq!(db.column_names("points").unwrap(), vec!["x", "y"]);
    assert!(db
        .column_names("UNEXISTING_TABLE____Aaaaaa")
        .unwrap()
        .is_empty());
    assert_eq!(
        db.query_column_names("SELECT * FROM points").unwrap(),
        vec!["x", "y"]
    );
}

#[test]
fn inspection_requires_open_handle() {
    let db = SqliteDb::in_memory();
    assert_eq!(db.db_size().unwrap_err().kind(), DbErrorKind::NotOpen);
    assert_eq!(
        db.check(CheckMode::Quick).unwrap_err().kind(),
        DbErrorKind::NotOpen
    );
    assert_eq!(
        db.column_names("points").unwrap_err().kind(),
        DbErrorKind::NotOpen
    );
}
