use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use hotfolder::{Copier, FileEventKind, FolderWatcher, HotfolderError};

const DEBOUNCE: Duration = Duration::from_millis(50);
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_watcher_reports_file_creation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let watcher = FolderWatcher::new(temp_dir.path(), DEBOUNCE).expect("Failed to create watcher");

    let test_file = temp_dir.path().join("report.txt");
    fs::write(&test_file, "hello").expect("Failed to write test file");

    let event = watcher
        .recv_timeout(EVENT_TIMEOUT)
        .expect("Timed out waiting for file event");

    assert_eq!(
        event.path.canonicalize().unwrap(),
        test_file.canonicalize().unwrap()
    );
    assert!(matches!(
        event.kind,
        FileEventKind::Created | FileEventKind::Modified
    ));
}

#[test]
fn test_watcher_reports_modification() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let test_file = temp_dir.path().join("report.txt");
    fs::write(&test_file, "hello").expect("Failed to write test file");

    let watcher = FolderWatcher::new(temp_dir.path(), DEBOUNCE).expect("Failed to create watcher");

    // Let the subscription settle before changing the file
    std::thread::sleep(Duration::from_millis(200));
    fs::write(&test_file, "hello world").expect("Failed to modify test file");

    let mut found_modification = false;
    for _ in 0..10 {
        match watcher.recv_timeout(Duration::from_millis(500)) {
            Ok(event) => {
                if matches!(event.kind, FileEventKind::Modified)
                    && event.path.canonicalize().unwrap() == test_file.canonicalize().unwrap()
                {
                    found_modification = true;
                    break;
                }
            }
            Err(_) => break,
        }
    }

    assert!(found_modification, "Did not receive modification event");
}

#[test]
fn test_watcher_ignores_directory_creation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let watcher = FolderWatcher::new(temp_dir.path(), DEBOUNCE).expect("Failed to create watcher");

    let sub_dir = temp_dir.path().join("nested");
    fs::create_dir(&sub_dir).expect("Failed to create subdirectory");

    std::thread::sleep(Duration::from_millis(200));
    let test_file = temp_dir.path().join("after-dir.txt");
    fs::write(&test_file, "payload").expect("Failed to write test file");

    // Every forwarded event must be for the file, never the directory
    let mut saw_file_event = false;
    for _ in 0..10 {
        match watcher.recv_timeout(Duration::from_millis(500)) {
            Ok(event) => {
                assert_ne!(
                    event.path.canonicalize().unwrap_or_else(|_| event.path.clone()),
                    sub_dir.canonicalize().unwrap(),
                    "directory event should have been filtered out"
                );
                if event.path.canonicalize().unwrap() == test_file.canonicalize().unwrap() {
                    saw_file_event = true;
                    break;
                }
            }
            Err(_) => break,
        }
    }

    assert!(saw_file_event, "Did not receive the file event");
}

#[test]
fn test_watch_requires_existing_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("01-04");

    match FolderWatcher::new(&missing, DEBOUNCE) {
        Err(HotfolderError::InvalidPath(path)) => assert_eq!(path, missing),
        Err(other) => panic!("Expected InvalidPath error, got {other:?}"),
        Ok(_) => panic!("Watching a missing directory should fail"),
    }
}

/// Drive the watch-to-copy pipeline the way the control loop does, until
/// the predicate holds or the attempts run out.
fn pump_until<F>(watcher: &FolderWatcher, copier: &Copier, mut predicate: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..50 {
        if predicate() {
            return true;
        }
        if let Ok(event) = watcher.recv_timeout(Duration::from_millis(100)) {
            copier.handle_event(&event);
        }
    }
    predicate()
}

fn file_contains(path: &Path, expected: &str) -> bool {
    fs::read_to_string(path).map(|c| c == expected).unwrap_or(false)
}

#[test]
fn test_changed_files_are_mirrored_to_destination() {
    let source_dir = TempDir::new().expect("Failed to create temp dir");
    let dest_dir = TempDir::new().expect("Failed to create temp dir");

    let watcher = FolderWatcher::new(source_dir.path(), DEBOUNCE).expect("Failed to create watcher");
    let copier = Copier::new(dest_dir.path());

    let source = source_dir.path().join("report.txt");
    let mirrored = dest_dir.path().join("report.txt");

    fs::write(&source, "hello").expect("Failed to write source file");
    assert!(
        pump_until(&watcher, &copier, || file_contains(&mirrored, "hello")),
        "Copy of the created file never appeared"
    );

    // Second write well past the debounce window; the mirror must be
    // overwritten, not appended to
    std::thread::sleep(Duration::from_millis(200));
    fs::write(&source, "hello world").expect("Failed to modify source file");
    assert!(
        pump_until(&watcher, &copier, || file_contains(&mirrored, "hello world")),
        "Copy was not overwritten with the new content"
    );
}

#[test]
fn test_missing_destination_does_not_stop_the_pipeline() {
    let source_dir = TempDir::new().expect("Failed to create temp dir");
    let dest_parent = TempDir::new().expect("Failed to create temp dir");
    let dest = dest_parent.path().join("inbox");

    let watcher = FolderWatcher::new(source_dir.path(), DEBOUNCE).expect("Failed to create watcher");
    let copier = Copier::new(&dest);

    // First event fails per-event (destination absent) but must not panic
    let source = source_dir.path().join("first.txt");
    fs::write(&source, "lost").expect("Failed to write source file");
    if let Ok(event) = watcher.recv_timeout(EVENT_TIMEOUT) {
        copier.handle_event(&event);
    }
    assert!(!dest.exists());

    // Once the destination exists, later events copy normally
    fs::create_dir(&dest).expect("Failed to create destination");
    std::thread::sleep(Duration::from_millis(200));
    let second = source_dir.path().join("second.txt");
    fs::write(&second, "kept").expect("Failed to write source file");

    assert!(
        pump_until(&watcher, &copier, || {
            file_contains(&dest.join("second.txt"), "kept")
        }),
        "Pipeline did not recover after the destination appeared"
    );
}

#[test]
fn test_watcher_restarts_cleanly_after_teardown() {
    let source_dir = TempDir::new().expect("Failed to create temp dir");

    let watcher = FolderWatcher::new(source_dir.path(), DEBOUNCE).expect("Failed to create watcher");
    drop(watcher);

    // A fresh watcher on the same path starts from a clean channel
    let watcher = FolderWatcher::new(source_dir.path(), DEBOUNCE).expect("Failed to recreate watcher");
    fs::write(source_dir.path().join("fresh.txt"), "x").expect("Failed to write test file");

    let event = watcher
        .recv_timeout(EVENT_TIMEOUT)
        .expect("Restarted watcher should still deliver events");
    assert_eq!(
        event.path.file_name().and_then(|n| n.to_str()),
        Some("fresh.txt")
    );
}
