// Integration tests for the transfer executor

use std::fs;

use force_transfer::error::TransferError;
use force_transfer::transfer::{TransferJob, TransferMode, execute};
use tempfile::TempDir;

fn job(temp: &TempDir, mode: TransferMode) -> TransferJob {
    let source = temp.path().join("source.mkv");
    fs::write(&source, "episode content").unwrap();
    TransferJob {
        source,
        destination: temp.path().join("Show - S01E01.mkv"),
        mode,
    }
}

#[test]
fn test_copy_keeps_source() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::Copy);

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert!(job.source.exists());
    assert_eq!(fs::read_to_string(&job.destination).unwrap(), "episode content");

    let source_modified = fs::metadata(&job.source).unwrap().modified().unwrap();
    let copy_modified = fs::metadata(&job.destination).unwrap().modified().unwrap();
    assert_eq!(source_modified, copy_modified);
}

#[test]
fn test_move_removes_source() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::Move);

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert!(!job.source.exists());
    assert_eq!(fs::read_to_string(&job.destination).unwrap(), "episode content");
}

#[test]
fn test_hard_link_shares_content() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::HardLink);

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);

    fs::write(&job.source, "rewritten").unwrap();
    assert_eq!(fs::read_to_string(&job.destination).unwrap(), "rewritten");
    assert!(!fs::symlink_metadata(&job.destination).unwrap().file_type().is_symlink());
}

#[cfg(unix)]
#[test]
fn test_symlink_points_at_source() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::Symlink);

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);

    let meta = fs::symlink_metadata(&job.destination).unwrap();
    assert!(meta.file_type().is_symlink());
    assert_eq!(fs::read_link(&job.destination).unwrap(), job.source);
    assert_eq!(fs::read_to_string(&job.destination).unwrap(), "episode content");
}

#[test]
fn test_existing_destination_is_replaced() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::Copy);
    fs::write(&job.destination, "stale").unwrap();

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(fs::read_to_string(&job.destination).unwrap(), "episode content");

    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 2);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_destination_is_replaced() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::Symlink);
    std::os::unix::fs::symlink(temp.path().join("gone.mkv"), &job.destination).unwrap();

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(fs::read_link(&job.destination).unwrap(), job.source);
}

#[test]
fn test_missing_source_is_reported() {
    let temp = TempDir::new().unwrap();
    let job = TransferJob {
        source: temp.path().join("missing.mkv"),
        destination: temp.path().join("Show - S01E01.mkv"),
        mode: TransferMode::HardLink,
    };

    let outcome = execute(&job);
    assert!(!outcome.succeeded());
    assert!(matches!(outcome.error, Some(TransferError::HardLink { .. })));
}

#[test]
fn test_move_onto_itself_keeps_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Show - S01E01.mkv");
    fs::write(&path, "episode content").unwrap();
    let job = TransferJob {
        source: path.clone(),
        destination: path.clone(),
        mode: TransferMode::Move,
    };

    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(fs::read_to_string(&path).unwrap(), "episode content");
}

#[test]
fn test_copy_onto_itself_is_refused() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("Show - S01E01.mkv");
    fs::write(&path, "episode content").unwrap();
    let job = TransferJob {
        source: path.clone(),
        destination: temp.path().join(".").join("Show - S01E01.mkv"),
        mode: TransferMode::Copy,
    };

    let outcome = execute(&job);
    assert!(matches!(outcome.error, Some(TransferError::SameFile { .. })));
    assert_eq!(fs::read_to_string(&path).unwrap(), "episode content");
}

#[test]
fn test_hard_link_rerun_replaces_existing_link() {
    let temp = TempDir::new().unwrap();
    let job = job(&temp, TransferMode::HardLink);

    assert!(execute(&job).succeeded());
    let outcome = execute(&job);
    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(fs::read_to_string(&job.destination).unwrap(), "episode content");
}
