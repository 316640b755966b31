use super::{create_test_storage, new_video};

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn create_assigns_id_and_keeps_fields() {
    let (storage, _dir) = create_test_storage();
    let created = storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();

    assert!(!created.id.is_empty());
    let fetched = storage.get_video("u1", &created.id).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.user_id, "u1");
    assert_eq!(fetched.episode, 3);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn create_with_id_keeps_caller_id_and_replaces_on_repeat() {
    let (storage, _dir) = create_test_storage();
    let created = storage.create_video_with_id("client-1", &new_video("Dark", 1, "u1")).unwrap();
    assert_eq!(created.id, "client-1");

    storage.update_episode("u1", "client-1", 2).unwrap();
    assert_eq!(storage.get_video("u1", "client-1").unwrap().unwrap().episode, 2);

    storage.create_video_with_id("client-1", &new_video("Dark", 7, "u1")).unwrap();
    let videos = storage.list_videos("u1").unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].episode, 7);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn list_is_scoped_to_user_and_ordered_by_creation() {
    let (storage, _dir) = create_test_storage();
    let first = storage.create_video(&new_video("Dark", 1, "u1")).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = storage.create_video(&new_video("Arcane", 2, "u1")).unwrap();
    storage.create_video(&new_video("Severance", 4, "u2")).unwrap();

    let ids: Vec<String> = storage.list_videos("u1").unwrap().into_iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(storage.list_videos("u2").unwrap().len(), 1);
    assert!(storage.list_videos("nobody").unwrap().is_empty());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn find_by_name_ignores_case_and_whitespace() {
    let (storage, _dir) = create_test_storage();
    let created = storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();

    let found = storage.find_video_by_name("u1", "  ARCANE ").unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert!(storage.find_video_by_name("u2", "arcane").unwrap().is_none());
    assert!(storage.find_video_by_name("u1", "arc").unwrap().is_none());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn update_episode_overwrites_counter() {
    let (storage, _dir) = create_test_storage();
    let created = storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();

    storage.update_episode("u1", &created.id, 9).unwrap();
    let fetched = storage.get_video("u1", &created.id).unwrap().unwrap();
    assert_eq!(fetched.episode, 9);
    assert_eq!(fetched.created_at, created.created_at);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn update_episode_on_missing_record_is_not_found() {
    let (storage, _dir) = create_test_storage();
    let created = storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();

    let err = storage.update_episode("u1", "missing", 1).unwrap_err();
    assert!(err.is_not_found());
    // Another user's id is not reachable either.
    let err = storage.update_episode("u2", &created.id, 1).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn delete_reports_whether_a_record_was_removed() {
    let (storage, _dir) = create_test_storage();
    let created = storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();

    assert!(storage.delete_video("u1", &created.id).unwrap());
    assert!(!storage.delete_video("u1", &created.id).unwrap());
    assert!(storage.get_video("u1", &created.id).unwrap().is_none());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn writes_publish_changes_for_the_owner() {
    let (storage, _dir) = create_test_storage();
    let mut rx = storage.changes().subscribe();

    let created = storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();
    assert_eq!(rx.try_recv().unwrap().user_id.as_deref(), Some("u1"));

    storage.update_episode("u1", &created.id, 4).unwrap();
    assert_eq!(rx.try_recv().unwrap().user_id.as_deref(), Some("u1"));

    storage.delete_video("u1", &created.id).unwrap();
    assert_eq!(rx.try_recv().unwrap().user_id.as_deref(), Some("u1"));

    // Deleting nothing is not a change.
    storage.delete_video("u1", &created.id).unwrap();
    assert!(rx.try_recv().is_err());
}
