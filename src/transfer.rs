use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, TransferError};

/// How a source file ends up at its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    Move,
    Copy,
    HardLink,
    #[default]
    Symlink,
}

impl TransferMode {
    pub const ALL: [TransferMode; 4] = [
        TransferMode::Symlink,
        TransferMode::HardLink,
        TransferMode::Copy,
        TransferMode::Move,
    ];

    /// Spelling used in config files and in the run summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
            Self::HardLink => "link",
            Self::Symlink => "softlink",
        }
    }
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move" => Ok(Self::Move),
            "copy" => Ok(Self::Copy),
            "link" | "hardlink" => Ok(Self::HardLink),
            "softlink" | "symlink" => Ok(Self::Symlink),
            _ => Err(ConfigError::UnknownTransferType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: TransferMode,
}

#[derive(Debug)]
pub struct TransferOutcome {
    pub job: TransferJob,
    pub error: Option<TransferError>,
}

impl TransferOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Performs one job and reports how it went.
///
/// Whatever already sits at the destination is deleted first, without backup.
/// Re-running a configuration therefore replaces earlier results, and a file a
/// user placed there by hand under the same name is lost.
///
/// A source that already is its destination is never touched: a move is a
/// no-op and every other mode reports [`TransferError::SameFile`].
pub fn execute(job: &TransferJob) -> TransferOutcome {
    let error = if is_same_entry(&job.source, &job.destination) {
        match job.mode {
            TransferMode::Move => None,
            _ => Some(TransferError::SameFile {
                path: job.destination.clone(),
            }),
        }
    } else {
        remove_existing(&job.destination)
            .and_then(|()| perform(job))
            .err()
    };

    TransferOutcome {
        job: job.clone(),
        error,
    }
}

/// Whether both paths name the same directory entry. Links to the source are
/// separate entries and do not count.
fn is_same_entry(a: &Path, b: &Path) -> bool {
    if a.file_name() != b.file_name() {
        return false;
    }
    match (canonical_parent(a), canonical_parent(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn canonical_parent(path: &Path) -> Option<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok()
}

fn remove_existing(destination: &Path) -> Result<(), TransferError> {
    // symlink_metadata so a dangling link at the destination is replaced too
    match fs::symlink_metadata(destination) {
        Ok(_) => fs::remove_file(destination).map_err(|source| TransferError::RemoveExisting {
            path: destination.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(TransferError::RemoveExisting {
            path: destination.to_path_buf(),
            source,
        }),
    }
}

fn perform(job: &TransferJob) -> Result<(), TransferError> {
    let from = job.source.as_path();
    let to = job.destination.as_path();

    match job.mode {
        TransferMode::Move => move_file(from, to).map_err(|source| TransferError::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
        TransferMode::Copy => copy_with_times(from, to).map_err(|source| TransferError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
        TransferMode::HardLink => {
            fs::hard_link(from, to).map_err(|source| TransferError::HardLink {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
        }
        TransferMode::Symlink => symlink(from, to).map_err(|source| TransferError::Symlink {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
    }
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // EXDEV: rename cannot cross filesystems
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices || err.raw_os_error() == Some(18) => {
            copy_with_times(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

/// Copies contents and permissions, then carries over access and modification times.
fn copy_with_times(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;

    let metadata = fs::metadata(from)?;
    let times = fs::FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    // the copy may carry a read-only mode; changing times only needs ownership
    fs::File::open(to)?.set_times(times)
}

fn symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = std::path::absolute(from)?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, to)
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_file(target, to)
    }
}
