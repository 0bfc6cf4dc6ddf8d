// Integration tests for listing, numbering and target paths

use std::fs;
use std::path::Path;

use force_transfer::config::RunConfig;
use force_transfer::episode::EpisodeExtractor;
use force_transfer::rename_engine::{
    RenameEngine, SourceFile, assign_episodes, duplicate_episodes, ensure_season_directory,
    episode_filename,
};
use force_transfer::transfer::TransferMode;
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), name).unwrap();
}

#[test]
fn test_extractor_examples() {
    let extractor = EpisodeExtractor::new();
    assert_eq!(extractor.extract("Show.S01E07.1080p"), Some(7));
    assert_eq!(extractor.extract("Show.1080p.03"), Some(3));
    assert_eq!(extractor.extract("Show.Special"), None);
    assert_eq!(extractor.extract("[Sub] Show - EP05 [720p]"), Some(5));
    assert_eq!(extractor.extract("Show x265 1999 12"), Some(12));
}

#[test]
fn test_oversized_marker_falls_back_to_digit_runs() {
    let extractor = EpisodeExtractor::new();
    assert_eq!(extractor.extract("E99999999999 05"), Some(5));
    assert_eq!(extractor.extract("Show 2024"), None);
    assert_eq!(extractor.extract("Show 1080 264"), None);
}

#[test]
fn test_full_width_episode_numbers() {
    let extractor = EpisodeExtractor::new();
    assert_eq!(extractor.extract("猪猪侠 第３集"), Some(3));
    assert_eq!(extractor.extract("猪猪侠 ０５"), Some(5));
}

#[test]
fn test_scan_filters_and_sorts() {
    let temp = TempDir::new().unwrap();
    touch(temp.path(), "b.MKV");
    touch(temp.path(), "a.mp4");
    touch(temp.path(), "notes.txt");
    touch(temp.path(), "c.srt");
    fs::create_dir(temp.path().join("extras.mkv")).unwrap();

    let engine = RenameEngine::new(RunConfig::builder().source(temp.path()).build());
    let files = engine.scan_directory().unwrap();

    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.mp4", "b.MKV", "c.srt"]);
    assert_eq!(files[1].extension, ".mkv");
    assert_eq!(files[1].stem, "b");
}

#[test]
fn test_fallback_numbering_in_name_order() {
    let extractor = EpisodeExtractor::new();
    let files = ["C.mp4", "A.mp4", "B.mp4"]
        .iter()
        .map(|name| SourceFile::from_path(&Path::new("/in").join(name)).unwrap())
        .collect();

    let assignments = assign_episodes(&extractor, files);
    let episodes: Vec<(String, u32)> = assignments
        .iter()
        .map(|a| (a.source.name.clone(), a.episode))
        .collect();
    assert_eq!(
        episodes,
        vec![
            ("A.mp4".to_string(), 1),
            ("B.mp4".to_string(), 2),
            ("C.mp4".to_string(), 3)
        ]
    );
    assert!(assignments.iter().all(|a| a.inferred));
}

#[test]
fn test_fallback_counter_ignores_inferred_numbers() {
    // "Opening" has no number and takes fallback 1, colliding with "ep01"
    let extractor = EpisodeExtractor::new();
    let files = ["ep01.mkv", "ep02.mkv", "Opening.mkv"]
        .iter()
        .map(|name| SourceFile::from_path(&Path::new("/in").join(name)).unwrap())
        .collect();

    let assignments = assign_episodes(&extractor, files);
    let by_name: Vec<(&str, u32, bool)> = assignments
        .iter()
        .map(|a| (a.source.name.as_str(), a.episode, a.inferred))
        .collect();
    assert_eq!(
        by_name,
        vec![
            ("Opening.mkv", 1, true),
            ("ep01.mkv", 1, false),
            ("ep02.mkv", 2, false)
        ]
    );
    assert_eq!(duplicate_episodes(&assignments), vec![1]);
}

#[test]
fn test_no_duplicates_for_clean_names() {
    let extractor = EpisodeExtractor::new();
    let files = ["Show E01.mkv", "Show E02.mkv", "Show E03.mkv"]
        .iter()
        .map(|name| SourceFile::from_path(&Path::new("/in").join(name)).unwrap())
        .collect();

    let assignments = assign_episodes(&extractor, files);
    assert!(duplicate_episodes(&assignments).is_empty());
}

#[test]
fn test_season_directory_is_created_once() {
    let temp = TempDir::new().unwrap();
    let first = ensure_season_directory(temp.path(), "Show", 2).unwrap();
    touch(&first, "keep.nfo");

    let second = ensure_season_directory(temp.path(), "Show", 2).unwrap();
    assert_eq!(first, second);
    assert!(second.ends_with("Show/Season 2"));
    assert!(second.join("keep.nfo").exists());
}

#[test]
fn test_plan_jobs_use_template() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("in");
    fs::create_dir(&source).unwrap();
    touch(&source, "Show.S01E03.WEB.mkv");
    touch(&source, "Show.S01E03.WEB.ASS");

    let config = RunConfig::builder()
        .source(&source)
        .target(temp.path().join("lib"))
        .media_name("Show")
        .season(3)
        .mode(TransferMode::Copy)
        .build();
    let engine = RenameEngine::new(config);
    let assignments = engine.assign_episodes(engine.scan_directory().unwrap());
    let jobs = engine.plan_jobs(&assignments);

    let destinations: Vec<String> = jobs
        .iter()
        .map(|job| job.destination.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(destinations, vec!["Show - S03E03.ass", "Show - S03E03.mkv"]);
    assert!(jobs.iter().all(|job| job.mode == TransferMode::Copy));
    assert!(jobs[0].destination.starts_with(temp.path().join("lib/Show/Season 3")));
    assert_eq!(episode_filename("Show", 3, 3, ".mkv"), "Show - S03E03.mkv");
}
