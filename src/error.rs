use std::path::PathBuf;

use thiserror::Error;

/// Problems with the configuration file itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON config: {0}")]
    Parse(String),

    #[error("unknown transfer type: {0} (expected softlink, link, copy or move)")]
    UnknownTransferType(String),

    #[error("failed to write config file at {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a whole run before any file is processed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0} is empty, nothing to organize")]
    MissingField(&'static str),

    #[error("source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("source path is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("failed to create season directory {path}")]
    SeasonDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list source directory {path}")]
    ListSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Whether the run was rejected by validation rather than by the filesystem.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::SourceMissing(_) | Self::SourceNotDirectory(_)
        )
    }
}

/// A failure isolated to a single file.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to remove existing destination {path}: {source}")]
    RemoveExisting {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is both source and destination")]
    SameFile { path: PathBuf },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to hard link {from} to {to}: {source}")]
    HardLink {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to symlink {from} to {to}: {source}")]
    Symlink {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
