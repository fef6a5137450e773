//! Unit tests for the durable stores behind the reconciler.
//!
//! JSON and SQLite backends are exercised through the `DurableStore` trait
//! so both honour the same load/save contract.

use bookmarksync::services::durable_store::{
    open_store, DurableStore, JsonFileStore, MemoryStore, SqliteStore,
};
use bookmarksync::types::bookmark::BookmarkRecord;
use bookmarksync::types::settings::StoreBackend;
use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;

fn sample_records() -> Vec<BookmarkRecord> {
    let mut bar = BookmarkRecord::new("1", "Bookmarks bar", None);
    bar.fields.insert("parentId".to_string(), json!("0"));
    bar.fields.insert(
        "children".to_string(),
        json!([{"id": "5", "title": "Docs", "url": "https://docs.rs"}]),
    );
    vec![
        bar,
        BookmarkRecord::new("7", "Rust", Some("https://www.rust-lang.org")),
        BookmarkRecord::new("3", "", Some("https://example.com")),
    ]
}

fn store_in(dir: &TempDir, backend: StoreBackend) -> Box<dyn DurableStore> {
    let path = dir.path().join(backend.default_file_name());
    open_store(backend, &path).expect("store should open")
}

#[rstest]
#[case(StoreBackend::Json)]
#[case(StoreBackend::Sqlite)]
fn test_fresh_store_loads_empty(#[case] backend: StoreBackend) {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, backend);
    assert!(store.load().unwrap().is_empty());
}

#[rstest]
#[case(StoreBackend::Json)]
#[case(StoreBackend::Sqlite)]
fn test_save_then_reopen_preserves_order_and_extras(#[case] backend: StoreBackend) {
    let dir = TempDir::new().unwrap();
    {
        let mut store = store_in(&dir, backend);
        store.save(&sample_records()).unwrap();
    }
    let store = store_in(&dir, backend);
    assert_eq!(store.load().unwrap(), sample_records());
}

#[rstest]
#[case(StoreBackend::Json)]
#[case(StoreBackend::Sqlite)]
fn test_save_replaces_previous_contents(#[case] backend: StoreBackend) {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir, backend);
    store.save(&sample_records()).unwrap();
    store
        .save(&[BookmarkRecord::new("9", "Only", None)])
        .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "9");
}

#[rstest]
#[case(StoreBackend::Json)]
#[case(StoreBackend::Sqlite)]
fn test_duplicate_ids_are_stored_verbatim(#[case] backend: StoreBackend) {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir, backend);
    let records = vec![
        BookmarkRecord::new("1", "First", None),
        BookmarkRecord::new("1", "Second", None),
    ];
    store.save(&records).unwrap();
    assert_eq!(store.load().unwrap(), records);
}

#[test]
fn test_json_store_document_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    let mut store = JsonFileStore::new(&path);
    store
        .save(&[BookmarkRecord::new("7", "Rust", Some("https://www.rust-lang.org"))])
        .unwrap();

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        raw,
        json!({"bookmarks": [{"id": "7", "title": "Rust", "url": "https://www.rust-lang.org"}]})
    );
    assert!(!dir.path().join("db.json.tmp").exists());
}

#[test]
fn test_json_store_reads_existing_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{"bookmarks":[{"id":"1","title":"Kept","dateAdded":1700000000000}]}"#,
    )
    .unwrap();

    let loaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(loaded[0].title(), Some("Kept"));
    assert_eq!(loaded[0].fields["dateAdded"], json!(1_700_000_000_000i64));
}

#[test]
fn test_json_store_empty_file_is_empty_collection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "").unwrap();
    assert!(JsonFileStore::new(&path).load().unwrap().is_empty());
}

#[test]
fn test_json_store_rejects_corrupt_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(JsonFileStore::new(&path).load().is_err());
}

#[test]
fn test_json_store_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("db.json");
    let mut store = JsonFileStore::new(&path);
    store.save(&sample_records()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_sqlite_in_memory_round_trip() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.save(&sample_records()).unwrap();
    assert_eq!(store.load().unwrap(), sample_records());
}

#[test]
fn test_memory_store_failing_keeps_last_state() {
    let mut store = MemoryStore::failing();
    assert!(store.save(&sample_records()).is_err());
    assert!(store.saved().is_empty());
    assert_eq!(store.save_count(), 0);
}
