//! Test utilities and module declarations for storage tests.

use crate::Storage;
use tempfile::TempDir;
use watchtrack_core::NewVideo;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::open(&db_path, 2, None).unwrap();
    (storage, temp_dir)
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn new_video(name: &str, episode: u32, user_id: &str) -> NewVideo {
    NewVideo::new(name, episode, user_id).unwrap()
}

mod video_tests;

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn reopening_database_keeps_records() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("reopen.db");
    {
        let storage = Storage::new(&db_path, 1).unwrap();
        storage.create_video(&new_video("Arcane", 3, "u1")).unwrap();
    }
    let storage = Storage::new(&db_path, 1).unwrap();
    let videos = storage.list_videos("u1").unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].name, "Arcane");
}
