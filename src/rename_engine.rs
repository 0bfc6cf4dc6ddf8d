use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RunConfig;
use crate::episode::EpisodeExtractor;
use crate::error::RunError;
use crate::transfer::TransferJob;

/// Extensions picked up from the source directory, compared case-insensitively.
pub const MEDIA_EXTENSIONS: [&str; 12] = [
    ".strm", ".mp4", ".mkv", ".ts", ".avi", ".rmvb", ".wmv", ".mov", ".flv", ".ass", ".srt",
    ".nfo",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
    pub stem: String,
    /// Lowercased, with the leading dot.
    pub extension: String,
}

impl SourceFile {
    /// Builds an entry for `path` if its extension is on the allow-list.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let stem = path.file_stem()?.to_string_lossy().to_string();
        let extension = format!(".{}", path.extension()?.to_string_lossy().to_lowercase());

        if !MEDIA_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            name,
            stem,
            extension,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeAssignment {
    pub source: SourceFile,
    pub episode: u32,
    /// True when the number came from the fallback counter rather than the name.
    pub inferred: bool,
}

#[derive(Debug)]
pub struct RenameEngine {
    config: RunConfig,
    extractor: EpisodeExtractor,
}

impl RenameEngine {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            extractor: EpisodeExtractor::new(),
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Lists eligible files in the source directory, sorted by name.
    pub fn scan_directory(&self) -> Result<Vec<SourceFile>, RunError> {
        let source_dir = &self.config.source_path;
        let entries = fs::read_dir(source_dir).map_err(|source| RunError::ListSource {
            path: source_dir.clone(),
            source,
        })?;

        let mut files: Vec<SourceFile> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(err) => {
                    tracing::warn!(
                        source = %source_dir.display(),
                        error = %err,
                        "skipping unreadable directory entry"
                    );
                    None
                }
            })
            .filter(|path| path.is_file())
            .filter_map(|path| SourceFile::from_path(&path))
            .collect();
        sort_by_name(&mut files);

        Ok(files)
    }

    pub fn assign_episodes(&self, files: Vec<SourceFile>) -> Vec<EpisodeAssignment> {
        assign_episodes(&self.extractor, files)
    }

    pub fn season_directory(&self) -> PathBuf {
        season_directory(
            &self.config.target_path,
            &self.config.media_name,
            self.config.season,
        )
    }

    pub fn plan_jobs(&self, assignments: &[EpisodeAssignment]) -> Vec<TransferJob> {
        plan_jobs(assignments, &self.season_directory(), &self.config)
    }
}

pub fn sort_by_name(files: &mut [SourceFile]) {
    files.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Numbers files in name order. Files with no recognizable episode get the
/// next value of a counter that starts at 1 and ignores inferred numbers.
pub fn assign_episodes(
    extractor: &EpisodeExtractor,
    mut files: Vec<SourceFile>,
) -> Vec<EpisodeAssignment> {
    sort_by_name(&mut files);

    let mut fallback = 1;
    files
        .into_iter()
        .map(|source| match extractor.extract(&source.stem) {
            Some(episode) => EpisodeAssignment {
                source,
                episode,
                inferred: false,
            },
            None => {
                let episode = fallback;
                fallback += 1;
                EpisodeAssignment {
                    source,
                    episode,
                    inferred: true,
                }
            }
        })
        .collect()
}

/// Episode numbers handed out more than once, ascending.
pub fn duplicate_episodes(assignments: &[EpisodeAssignment]) -> Vec<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for assignment in assignments {
        *counts.entry(assignment.episode).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(episode, _)| episode)
        .collect()
}

pub fn season_directory(target_root: &Path, media_name: &str, season: u32) -> PathBuf {
    target_root
        .join(media_name)
        .join(format!("Season {season}"))
}

/// Creates the season directory and any missing parents; existing ones are left alone.
pub fn ensure_season_directory(
    target_root: &Path,
    media_name: &str,
    season: u32,
) -> Result<PathBuf, RunError> {
    let dir = season_directory(target_root, media_name, season);
    fs::create_dir_all(&dir).map_err(|source| RunError::SeasonDirectory {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

pub fn episode_filename(media_name: &str, season: u32, episode: u32, extension: &str) -> String {
    format!("{media_name} - S{season:02}E{episode:02}{extension}")
}

pub fn plan_jobs(
    assignments: &[EpisodeAssignment],
    season_dir: &Path,
    config: &RunConfig,
) -> Vec<TransferJob> {
    assignments
        .iter()
        .map(|assignment| TransferJob {
            source: assignment.source.path.clone(),
            destination: season_dir.join(episode_filename(
                &config.media_name,
                config.season,
                assignment.episode,
                &assignment.source.extension,
            )),
            mode: config.mode,
        })
        .collect()
}
