//! Error types for fmig

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or executing a migration run.
///
/// Configuration variants stop the run before the filesystem is touched.
/// I/O variants are scoped to a single candidate and carry the path plus the
/// underlying OS error so the caller can log them and carry on.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("No migration configured: enable file or folder filters in the config file or on the command line")]
    NoMigrationConfigured,

    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source path is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read metadata for {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not scan {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not move {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot migrate folder {} into itself ({})", from.display(), to.display())]
    IntoItself { from: PathBuf, to: PathBuf },

    #[error("Could not remove {} after copying it: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MigrationError>;
