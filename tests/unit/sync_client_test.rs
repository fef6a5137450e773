//! Tests for the client side against a live sync server: the transport,
//! fire-and-forget dispatch, and the startup upload plus replay.

use std::sync::Arc;
use std::time::Duration;

use bookmarksync::managers::local_tree::{BookmarkTreeWriter, LocalTree};
use bookmarksync::managers::reconciler::Reconciler;
use bookmarksync::services::change_translator::ChangeEventTranslator;
use bookmarksync::services::durable_store::{DurableStore, MemoryStore};
use bookmarksync::services::sync_client::SyncClient;
use bookmarksync::services::sync_transport::HttpTransport;
use bookmarksync::sync_handler::build_router;
use bookmarksync::types::bookmark::{BookmarkNode, BookmarkRecord};
use bookmarksync::types::errors::TransportError;
use bookmarksync::types::settings::SYNCED_FOLDER_NAME;
use bookmarksync::types::sync::{FullSnapshot, MutationEvent, SyncAction};

async fn spawn_test_server<S: DurableStore + 'static>(reconciler: Arc<Reconciler<S>>) -> String {
    let app = build_router(reconciler, 1024 * 1024);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

fn transport(base: &str) -> HttpTransport {
    HttpTransport::new(base, Duration::from_secs(5)).unwrap()
}

/// A base URL nothing listens on.
async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn host_tree() -> LocalTree {
    let mut tree = LocalTree::new();
    let bar = tree.create_node(Some("0"), "Bookmarks bar", None).unwrap();
    tree.create_node(Some(&bar), "Rust", Some("https://www.rust-lang.org"))
        .unwrap();
    let reading = tree.create_node(Some(&bar), "Reading", None).unwrap();
    tree.create_node(Some(&reading), "Book", Some("https://doc.rust-lang.org/book/"))
        .unwrap();
    tree.create_node(Some("0"), "Other bookmarks", None).unwrap();
    tree
}

#[tokio::test]
async fn send_action_reaches_reconciler() {
    let reconciler = Arc::new(Reconciler::open(MemoryStore::new()).unwrap());
    let base = spawn_test_server(Arc::clone(&reconciler)).await;

    transport(&base)
        .send_action(&SyncAction::Created(BookmarkRecord::new(
            "1",
            "A",
            Some("https://a.example"),
        )))
        .await
        .unwrap();
    assert_eq!(reconciler.get("1").unwrap().title(), Some("A"));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let reconciler = Arc::new(Reconciler::open(MemoryStore::failing()).unwrap());
    let base = spawn_test_server(reconciler).await;

    let err = transport(&base)
        .send_snapshot(&FullSnapshot { bookmarks: Vec::new() })
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status(500, _)));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let err = transport(&dead_base_url().await)
        .send_action(&SyncAction::Removed("1".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

#[tokio::test]
async fn dispatch_delivers_in_background() {
    let reconciler = Arc::new(Reconciler::open(MemoryStore::new()).unwrap());
    let base = spawn_test_server(Arc::clone(&reconciler)).await;

    let translator = ChangeEventTranslator::new(transport(&base));
    translator.handle(MutationEvent::Created {
        id: "42".to_string(),
        node: BookmarkNode::leaf("42", "Rust", "https://www.rust-lang.org"),
    });

    for _ in 0..50 {
        if reconciler.get("42").is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("dispatched action never reached the server");
}

#[tokio::test]
async fn initial_sync_uploads_and_replays() {
    let reconciler = Arc::new(Reconciler::open(MemoryStore::new()).unwrap());
    let base = spawn_test_server(Arc::clone(&reconciler)).await;
    let client = SyncClient::new(transport(&base), SYNCED_FOLDER_NAME);

    let mut tree = host_tree();
    let before = tree.node_count();
    let report = client.initial_sync(&mut tree).await;

    assert!(report.uploaded());
    assert_eq!(report.snapshot_roots, 1);

    // The server holds the root-wrapped snapshot as a single record.
    let records = reconciler.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "0");
    assert!(records[0].fields.contains_key("children"));

    let summary = report.import.as_ref().unwrap();
    assert_eq!(summary.folders, 3);
    assert_eq!(summary.leaves, 2);
    // Every original node plus the synced folder and its copies.
    assert_eq!(tree.node_count(), before * 2 + 1);

    let folder_id = report.synced_folder_id.unwrap();
    let folder = tree.find(&folder_id).unwrap();
    assert_eq!(folder.title, SYNCED_FOLDER_NAME);
    let titles: Vec<&str> = folder.child_nodes().iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Bookmarks bar", "Other bookmarks"]);
}

#[tokio::test]
async fn replay_runs_even_when_upload_fails() {
    let client = SyncClient::new(transport(&dead_base_url().await), SYNCED_FOLDER_NAME);

    let mut tree = host_tree();
    let report = client.initial_sync(&mut tree).await;

    assert!(!report.uploaded());
    assert!(matches!(report.upload_error, Some(TransportError::Network(_))));
    assert_eq!(report.import.unwrap().total(), 5);
    assert!(report.synced_folder_id.is_some());
}

#[test]
fn dispatch_without_runtime_drops_the_action() {
    let transport = HttpTransport::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    assert!(matches!(
        transport.spawn_action(SyncAction::Removed("1".to_string())),
        Err(TransportError::NoRuntime)
    ));

    let translator = ChangeEventTranslator::new(transport);
    translator.handle(MutationEvent::Removed {
        id: "1".to_string(),
        remove_info: Default::default(),
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dispatch_from_plain_thread_uses_captured_runtime() {
    let reconciler = Arc::new(Reconciler::open(MemoryStore::new()).unwrap());
    let base = spawn_test_server(Arc::clone(&reconciler)).await;

    let translator = ChangeEventTranslator::new(transport(&base));
    std::thread::spawn(move || {
        translator.handle(MutationEvent::Created {
            id: "7".to_string(),
            node: BookmarkNode::leaf("7", "Tokio", "https://tokio.rs"),
        });
    })
    .join()
    .expect("dispatch outside the runtime context should not panic");

    for _ in 0..50 {
        if reconciler.get("7").is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("action dispatched from a plain thread never reached the server");
}

#[tokio::test]
async fn spawned_action_reports_its_outcome() {
    let reconciler = Arc::new(Reconciler::open(MemoryStore::new()).unwrap());
    let base = spawn_test_server(Arc::clone(&reconciler)).await;

    let handle = transport(&base)
        .spawn_action(SyncAction::Created(BookmarkRecord::new("3", "C", None)))
        .unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(reconciler.get("3").unwrap().title(), Some("C"));
}
