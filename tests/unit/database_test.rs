//! Unit tests for the bookmarksync database layer (connection + migrations).

use bookmarksync::database::migrations::{self, CURRENT_SCHEMA_VERSION};
use bookmarksync::database::Database;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_record_table_without_secondary_index() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='bookmark_records'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 1, "bookmark_records should exist after migrations");

    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND tbl_name='bookmark_records' AND sql IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(indexes, 0, "bookmark_records should carry no secondary index");
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(
        migrations::get_schema_version(db.connection()),
        CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    migrations::run_all(db.connection()).expect("second run should be a no-op");

    let rows: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, CURRENT_SCHEMA_VERSION as i64);
}

#[test]
fn test_record_ids_are_not_unique() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    for _ in 0..2 {
        conn.execute(
            "INSERT INTO bookmark_records (id, fields) VALUES ('dup', '{\"title\":\"Twice\"}')",
            [],
        )
        .expect("duplicate ids are allowed in a verbatim snapshot");
    }
}

#[test]
fn test_open_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmarks.db");
    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO bookmark_records (id, fields) VALUES ('1', '{\"title\":\"A\"}')",
                [],
            )
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let fields: String = db
        .connection()
        .query_row("SELECT fields FROM bookmark_records WHERE id = '1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fields, r#"{"title":"A"}"#);
}
