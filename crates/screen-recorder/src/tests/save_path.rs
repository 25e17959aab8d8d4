use crate::SavePathPolicy;

use screen_recorder_core::{Container, FILE_NAME_PREFIX};

/// WHAT: Configured directory is created and used with the default name
/// WHY: First recording must work on a fresh machine
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_configured_dir_when_choosing_then_created_and_named() {
    // Given
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("nested").join("videos");
    let policy = SavePathPolicy::new(Some(dir.clone()));

    // When
    let path = policy.choose(Container::Webm).unwrap();

    // Then
    assert!(dir.is_dir());
    assert_eq!(path.parent().unwrap(), dir);
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(FILE_NAME_PREFIX));
    assert!(name.ends_with(".webm"));
}

/// WHAT: An uncreatable directory cancels instead of failing
/// WHY: Cancellation starts nothing and leaves no partial state
#[test]
#[allow(clippy::unwrap_used)]
fn given_directory_under_a_file_when_choosing_then_cancelled() {
    // Given: The "directory" would sit beneath a regular file
    let root = tempfile::tempdir().unwrap();
    let file = root.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();
    let policy = SavePathPolicy::new(Some(file.join("videos")));

    // When / Then
    assert!(policy.choose(Container::Mp4).is_none());
}

/// WHAT: Configured directory wins over platform folders
/// WHY: "Open Recordings Folder" must open where files are written
#[test]
#[allow(clippy::unwrap_used)]
fn given_configured_dir_when_asking_recordings_dir_then_returned() {
    let root = tempfile::tempdir().unwrap();
    let policy = SavePathPolicy::new(Some(root.path().to_path_buf()));

    assert_eq!(policy.recordings_dir().unwrap(), root.path());
}
