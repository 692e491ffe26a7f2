use litehandle_core::{DbErrorKind, DbLocation, SqliteDb};
use std::collections::HashSet;

#[test]
fn in_memory_handle_starts_closed() {
    let db = SqliteDb::in_memory();

    assert!(!db.is_open());
    assert!(db.is_in_memory());
    assert_eq!(db.location(), &DbLocation::Memory);
    assert!(matches!(db.connection(), Err(err) if err.kind() == DbErrorKind::NotOpen));
}

#[test]
fn file_handle_starts_closed_without_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lazy.db");

    let db = SqliteDb::new(path.as_path()).with_init_script(dir.path().join("init.sql"));

    assert!(!db.is_open());
    assert!(!db.is_in_memory());
    assert_eq!(db.init_script(), Some(dir.path().join("init.sql").as_path()));
    assert!(!path.exists());
}

#[test]
fn open_in_memory_flips_emptiness_after_create_table() {
    let mut db = SqliteDb::in_memory();
    db.open().unwrap();

    assert!(db.is_open());
    assert!(db.is_empty().unwrap());
    db.execute("CREATE TABLE a(x INTEGER)", []).unwrap();
    assert!(!db.is_empty().unwrap());

    db.close().unwrap();
    assert!(!db.is_open());
}

#[test]
fn open_on_new_file_without_script_is_empty_and_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.db");
    let mut db = SqliteDb::new(path.as_path());

    db.open().unwrap();
    assert!(db.is_empty().unwrap());
    db.execute("CREATE TABLE aaa(x INTEGER)", []).unwrap();
    assert!(!db.is_empty().unwrap());
    assert!(path.is_file());
    db.close().unwrap();
}

#[test]
fn close_is_idempotent() {
    let mut db = SqliteDb::in_memory();
    db.close().unwrap();

    db.open().unwrap();
    db.close().unwrap();
    db.close().unwrap();
    assert!(!db.is_open());
}

#[test]
fn file_data_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SqliteDb::new(dir.path().join("persist.db"));

    db.open().unwrap();
    db.execute_batch("CREATE TABLE notes(body TEXT); INSERT INTO notes VALUES ('kept');")
        .unwrap();
    db.close().unwrap();

    db.open().unwrap();
    let body: String = db.query_scalar("SELECT body FROM notes", []).unwrap();
    assert_eq!(body, "kept");
}

#[test]
fn memory_data_is_discarded_on_close() {
    let mut db = SqliteDb::in_memory();
    db.open().unwrap();
    db.execute("CREATE TABLE transient(x)", []).unwrap();
    db.close().unwrap();

    db.open().unwrap();
    assert!(db.is_empty().unwrap());
}

#[test]
fn unopenable_location_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SqliteDb::new(dir.path().join("missing").join("nested").join("db.sqlite"));

    let err = db.open().unwrap_err();
    assert_eq!(err.kind(), DbErrorKind::Connection);
    assert!(!db.is_open());
}

#[test]
fn corrupt_file_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.db");
    std::fs::write(&path, vec![0xA5_u8; 4096]).unwrap();
    let mut db = SqliteDb::new(path.as_path());

    let err = db.open().unwrap_err();

    assert_eq!(err.kind(), DbErrorKind::Connection);
    assert!(err.to_string().contains("not a database"));
    assert!(!db.is_open());
}

#[test]
fn scoped_open_closes_on_exit() {
    let dir = tempfile::tempdir().unwrap();
    let mut db = SqliteDb::new(dir.path().join("scoped.db"));

    let count = db
        .with_open(|db| {
            db.execute_batch("CREATE TABLE t(x); INSERT INTO t VALUES (1), (2);")?;
            db.query_scalar::<i64, _>("SELECT count(*) FROM t", [])
        })
        .unwrap();

    assert_eq!(count, 2);
    assert!(!db.is_open());
}

#[test]
fn scoped_open_closes_on_early_error_return() {
    let mut db = SqliteDb::in_memory();

    let err = db
        .with_open(|db| {
            db.execute("INSERT INTO missing_table VALUES (1)", [])?;
            Ok(())
        })
        .unwrap_err();

    assert_eq!(err.kind(), DbErrorKind::Statement);
    assert!(!db.is_open());
}

#[test]
fn table_names_contains_created_tables() {
    let mut db = SqliteDb::in_memory();
    db.open().unwrap();
    assert!(db.table_names().unwrap().is_empty());

    db.execute("CREATE TABLE t1(x)", []).unwrap();
    db.execute("CREATE TABLE t2(y)", []).unwrap();

    let names: HashSet<String> = db.table_names().unwrap().into_iter().collect();
    let expected: HashSet<String> = ["t1", "t2"].into_iter().map(String::from).collect();
    assert_eq!(names, expected);
}

#[test]
fn engine_tables_are_not_listed() {
    let mut db = SqliteDb::in_memory();
    db.open().unwrap();
    db.execute(
        "CREATE TABLE counters(id INTEGER PRIMARY KEY AUTOINCREMENT, v INTEGER)",
        [],
    )
    .unwrap();
    db.execute("INSERT INTO counters(v) VALUES (1)", []).unwrap();

    assert_eq!(db.table_names().unwrap(), vec!["counters".to_string()]);
}
