//! Mutation dispatcher behaviour against the in-memory and SQLite stores.
#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;

use tempfile::TempDir;
use watchtrack_core::FeatureFlags;
use watchtrack_service::{
    AddOutcome, AppEvent, ErrorChannel, ImportMode, ImportSummary, MutationDispatcher,
    ServiceError,
};
use watchtrack_storage::StorageBackend;

fn dispatcher_on(storage: &Arc<StorageBackend>, user_id: &str) -> MutationDispatcher {
    MutationDispatcher::new(Arc::clone(storage), user_id, FeatureFlags::default(), ErrorChannel::new())
}

fn memory() -> Arc<StorageBackend> {
    Arc::new(StorageBackend::new_memory())
}

#[tokio::test]
async fn same_name_in_other_case_updates_instead_of_creating() {
    let dir = TempDir::new().unwrap();
    let sqlite = Arc::new(StorageBackend::new_sqlite(&dir.path().join("t.db"), 2).unwrap());
    for storage in [memory(), sqlite] {
        let dispatcher = dispatcher_on(&storage, "u1");

        let first = dispatcher.add_or_update("Arcane", 3).await.unwrap();
        assert!(matches!(first, AddOutcome::Created(_)));
        let second = dispatcher.add_or_update("arcane", 5).await.unwrap();
        assert!(matches!(second, AddOutcome::Updated { episode: 5, .. }));

        let videos = dispatcher.list().await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].name, "Arcane");
        assert_eq!(videos[0].episode, 5);
    }
}

#[tokio::test]
async fn blank_name_never_reaches_the_store() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");

    let err = dispatcher.add_or_update("   ", 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(dispatcher.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_and_delete_single_records() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");
    let AddOutcome::Created(video) = dispatcher.add_or_update("Dark", 1).await.unwrap() else {
        panic!("expected a new record");
    };

    dispatcher.update_episode(&video.id, 8).await.unwrap();
    assert_eq!(dispatcher.list().await.unwrap()[0].episode, 8);

    assert!(dispatcher.delete(&video.id).await.unwrap());
    assert!(!dispatcher.delete(&video.id).await.unwrap());
    assert!(dispatcher.update_episode(&video.id, 9).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn delete_all_clears_only_this_user() {
    let storage = memory();
    let mine = dispatcher_on(&storage, "u1");
    let theirs = dispatcher_on(&storage, "u2");
    for name in ["Dark", "Lost", "Arcane"] {
        mine.add_or_update(name, 1).await.unwrap();
    }
    theirs.add_or_update("Dark", 4).await.unwrap();

    assert_eq!(mine.delete_all().await.unwrap(), 3);
    assert!(mine.list().await.unwrap().is_empty());
    assert_eq!(theirs.list().await.unwrap().len(), 1);
    assert_eq!(mine.delete_all().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_delete_all_leaves_every_record() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");
    for name in ["Dark", "Lost", "Arcane"] {
        dispatcher.add_or_update(name, 1).await.unwrap();
    }

    storage.as_memory().unwrap().set_reject_commits(true);
    let err = dispatcher.delete_all().await.unwrap_err();
    assert!(err.is_transient());
    storage.as_memory().unwrap().set_reject_commits(false);
    assert_eq!(dispatcher.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn delete_all_is_refused_when_switched_off() {
    let storage = memory();
    let dispatcher = MutationDispatcher::new(
        Arc::clone(&storage),
        "u1",
        FeatureFlags { is_delete_all_enabled: false },
        ErrorChannel::new(),
    );
    dispatcher.add_or_update("Dark", 1).await.unwrap();

    let err = dispatcher.delete_all().await.unwrap_err();
    assert!(matches!(err, ServiceError::FeatureDisabled(_)));
    assert_eq!(dispatcher.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn import_keeps_well_formed_entry_and_skips_malformed_one() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");

    let summary = dispatcher
        .bulk_import(r#"[{"name": "Dark", "episode": 4}, {"name": 7, "episode": "x"}]"#, ImportMode::Append)
        .await
        .unwrap();

    assert_eq!(summary, ImportSummary { added: 1, updated: 0, skipped: 1 });
    let videos = dispatcher.list().await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].name, "Dark");
    assert_eq!(videos[0].episode, 4);
}

#[tokio::test]
async fn append_import_duplicates_existing_names() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");
    dispatcher.add_or_update("Dark", 1).await.unwrap();

    dispatcher.bulk_import(r#"[{"name": "Dark", "episode": 2}]"#, ImportMode::Append).await.unwrap();
    assert_eq!(dispatcher.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn merge_import_updates_existing_and_collapses_repeats() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");
    dispatcher.add_or_update("Dark", 1).await.unwrap();

    let doc = r#"[
        {"name": "dark", "episode": 6},
        {"name": "Lost", "episode": 2},
        {"name": "LOST", "episode": 3}
    ]"#;
    let summary = dispatcher.bulk_import(doc, ImportMode::Merge).await.unwrap();
    assert_eq!(summary, ImportSummary { added: 1, updated: 1, skipped: 0 });

    let mut videos = dispatcher.list().await.unwrap();
    videos.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(videos.len(), 2);
    assert_eq!((videos[0].name.as_str(), videos[0].episode), ("Dark", 6));
    assert_eq!((videos[1].name.as_str(), videos[1].episode), ("LOST", 3));
}

#[tokio::test]
async fn non_array_import_is_an_error() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");
    let err = dispatcher.bulk_import(r#"{"name": "Dark"}"#, ImportMode::Append).await.unwrap_err();
    assert!(matches!(err, ServiceError::Interchange(_)));
}

#[tokio::test]
async fn rejected_import_writes_nothing() {
    let storage = memory();
    let dispatcher = dispatcher_on(&storage, "u1");
    storage.as_memory().unwrap().set_reject_commits(true);

    let doc = r#"[{"name": "Dark", "episode": 1}, {"name": "Lost", "episode": 2}]"#;
    assert!(dispatcher.bulk_import(doc, ImportMode::Append).await.is_err());
    storage.as_memory().unwrap().set_reject_commits(false);
    assert!(dispatcher.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn export_round_trips_through_import() {
    let storage = memory();
    let source = dispatcher_on(&storage, "u1");
    assert!(matches!(
        source.export().await.unwrap_err(),
        ServiceError::Interchange(watchtrack_core::InterchangeError::NothingToExport)
    ));
    source.add_or_update("Dark", 3).await.unwrap();
    source.add_or_update("Lost", 0).await.unwrap();

    let exported = source.export().await.unwrap();
    assert!(exported.contains("  {"), "two-space indentation expected");

    let target = dispatcher_on(&storage, "u2");
    let summary = target.bulk_import(&exported, ImportMode::Merge).await.unwrap();
    assert_eq!(summary.added, 2);
}

#[tokio::test]
async fn add_with_caller_id_creates_under_that_id() {
    let dispatcher = dispatcher_on(&memory(), "u1");
    let outcome = dispatcher.add_or_update_with_id("client-1", "Dark", 2).await.unwrap();
    assert!(matches!(outcome, AddOutcome::Created(ref v) if v.id == "client-1"));

    // An existing name wins over the caller's id.
    let outcome = dispatcher.add_or_update_with_id("client-2", "DARK", 3).await.unwrap();
    assert_eq!(outcome, AddOutcome::Updated { id: "client-1".to_owned(), episode: 3 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detached_writes_apply_in_call_order() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(StorageBackend::new_sqlite(&dir.path().join("order.db"), 4).unwrap());
    let dispatcher = dispatcher_on(&storage, "u1");
    dispatcher.add_or_update("Dark", 0).await.unwrap();
    let id = dispatcher.list().await.unwrap()[0].id.clone();

    let mut pending = Vec::new();
    for episode in 1..=50 {
        pending.push(dispatcher.spawn_update_episode(&id, episode));
    }
    // Clones share the queue.
    pending.push(dispatcher.clone().spawn_update_episode(&id, 51));
    for write in pending {
        write.await.unwrap();
    }

    assert_eq!(dispatcher.list().await.unwrap()[0].episode, 51);
}

#[tokio::test]
async fn detached_write_failure_is_published() {
    let storage = memory();
    let errors = ErrorChannel::new();
    let mut events = errors.subscribe();
    let dispatcher =
        MutationDispatcher::new(Arc::clone(&storage), "u1", FeatureFlags::default(), errors);

    storage.as_memory().unwrap().set_offline(true);
    dispatcher.spawn_add_or_update("Dark", 1).await.unwrap();

    let event = events.try_recv().unwrap();
    assert!(matches!(event, AppEvent::WriteFailed { operation: "add", .. }));
}
