//! Live query behaviour over both backends.
#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use watchtrack_core::NewVideo;
use watchtrack_storage::{LiveQuery, StorageBackend, VideoStore};

fn video(name: &str, episode: u32, user_id: &str) -> NewVideo {
    NewVideo::new(name, episode, user_id).unwrap()
}

async fn next_names(query: &mut LiveQuery<StorageBackend>) -> Vec<String> {
    let snapshot = tokio::time::timeout(Duration::from_secs(5), query.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let mut names: Vec<String> = snapshot.into_iter().map(|v| v.name).collect();
    names.sort();
    names
}

async fn exercise(store: Arc<StorageBackend>) {
    store.create_video(&video("Dark", 1, "u1")).await.unwrap();

    let mut query = LiveQuery::new(Arc::clone(&store), "u1");
    assert_eq!(next_names(&mut query).await, vec!["Dark"]);

    // Another user's writes do not wake this query.
    store.create_video(&video("Lost", 1, "u2")).await.unwrap();
    store.create_video(&video("Arcane", 3, "u1")).await.unwrap();
    assert_eq!(next_names(&mut query).await, vec!["Arcane", "Dark"]);

    let pending = tokio::time::timeout(Duration::from_millis(100), query.next()).await;
    assert!(pending.is_err(), "no further change should be delivered");
}

#[tokio::test]
async fn memory_backend_redelivers_full_list_on_change() {
    exercise(Arc::new(StorageBackend::new_memory())).await;
}

#[tokio::test]
async fn sqlite_backend_redelivers_full_list_on_change() {
    let dir = TempDir::new().unwrap();
    let backend = StorageBackend::new_sqlite(&dir.path().join("live.db"), 2).unwrap();
    exercise(Arc::new(backend)).await;
}

#[tokio::test]
async fn sqlite_write_from_another_client_is_delivered() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.db");
    let watching = Arc::new(
        StorageBackend::open_sqlite(&path, 2, Some(Duration::from_millis(20))).unwrap(),
    );
    let writer = StorageBackend::new_sqlite(&path, 1).unwrap();

    let mut query = LiveQuery::new(Arc::clone(&watching), "u1");
    assert!(next_names(&mut query).await.is_empty());

    writer.create_video(&video("Dark", 1, "u1")).await.unwrap();
    assert_eq!(next_names(&mut query).await, vec!["Dark"]);

    // The other client's write to a different user re-reads but delivers nothing.
    writer.create_video(&video("Lost", 1, "u2")).await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(200), query.next()).await;
    assert!(pending.is_err());
}

#[tokio::test]
async fn sqlite_without_polling_ignores_other_clients() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("isolated.db");
    let watching = Arc::new(StorageBackend::open_sqlite(&path, 2, None).unwrap());
    let writer = StorageBackend::new_sqlite(&path, 1).unwrap();

    let mut query = LiveQuery::new(Arc::clone(&watching), "u1");
    assert!(next_names(&mut query).await.is_empty());

    writer.create_video(&video("Dark", 1, "u1")).await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(200), query.next()).await;
    assert!(pending.is_err());
}

#[tokio::test]
async fn unchanged_reread_is_not_delivered() {
    let store = Arc::new(StorageBackend::new_memory());
    let created = store.create_video(&video("Dark", 4, "u1")).await.unwrap();
    let mut query = LiveQuery::new(Arc::clone(&store), "u1");
    assert_eq!(next_names(&mut query).await, vec!["Dark"]);

    store.update_episode("u1", &created.id, 4).await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(100), query.next()).await;
    assert!(pending.is_err());

    store.update_episode("u1", &created.id, 5).await.unwrap();
    let snapshot = query.next().await.unwrap().unwrap();
    assert_eq!(snapshot[0].episode, 5);
}

#[tokio::test]
async fn burst_of_writes_is_coalesced() {
    let store = Arc::new(StorageBackend::new_memory());
    let mut query = LiveQuery::new(Arc::clone(&store), "u1");
    assert!(next_names(&mut query).await.is_empty());

    for name in ["A", "B", "C"] {
        store.create_video(&video(name, 0, "u1")).await.unwrap();
    }
    assert_eq!(next_names(&mut query).await, vec!["A", "B", "C"]);

    let pending = tokio::time::timeout(Duration::from_millis(100), query.next()).await;
    assert!(pending.is_err());
}

#[tokio::test]
async fn offline_store_surfaces_error_then_recovers() {
    let store = Arc::new(StorageBackend::new_memory());
    let memory = store.as_memory().unwrap().clone();
    let mut query = LiveQuery::new(Arc::clone(&store), "u1");

    memory.set_offline(true);
    let first = query.next().await.unwrap();
    assert!(first.unwrap_err().is_transient());

    memory.set_offline(false);
    store.create_video(&video("Dark", 1, "u1")).await.unwrap();
    assert_eq!(next_names(&mut query).await, vec!["Dark"]);
}
