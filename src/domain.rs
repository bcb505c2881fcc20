//! Core data model: candidates, run statistics and migration outcomes.

pub mod aggregate;
pub mod filter;
pub mod migration;
pub mod pattern;

pub use filter::FilterSpec;
pub use migration::{MigrationOutcome, Migrator, TransferMode};
pub use pattern::{CaseSensitivity, NamePattern};

use crate::error::{MigrationError, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Bytes per megabyte (binary).
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Converts a byte count to binary megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Whether a candidate is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Folder => write!(f, "folder"),
        }
    }
}

/// Splits a file name into stem and extension.
///
/// Leading dots belong to the stem, so `.bashrc` has no extension. The
/// extension keeps its dot: `a.tar.gz` gives `("a.tar", ".gz")`.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// A directory entry discovered in the source directory.
///
/// Size and content facts are not captured here; they are resolved on
/// demand while a size or type axis is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

impl MatchCandidate {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self { path, name, kind }
    }

    /// Builds a candidate by classifying `path` on disk (symlinks followed).
    ///
    /// Returns `None` for entries that are neither regular files nor
    /// directories (FIFOs, sockets, device nodes).
    pub fn from_path(path: &Path) -> Result<Option<Self>> {
        let metadata = fs::metadata(path).map_err(|source| MigrationError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        let kind = if metadata.is_dir() {
            EntryKind::Folder
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            return Ok(None);
        };
        Ok(Some(Self::new(path, kind)))
    }

    /// Name used for pattern matching: the stem for files, the full name for folders.
    pub fn match_name(&self) -> &str {
        match self.kind {
            EntryKind::File => split_extension(&self.name).0,
            EntryKind::Folder => &self.name,
        }
    }

    /// Extension including its leading dot, or `""`. Folders have none.
    pub fn extension(&self) -> &str {
        match self.kind {
            EntryKind::File => split_extension(&self.name).1,
            EntryKind::Folder => "",
        }
    }

    /// Current byte size of a file candidate.
    pub fn file_size(&self) -> Result<u64> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|source| MigrationError::Stat {
                path: self.path.clone(),
                source,
            })
    }
}

/// Lists the immediate children of `dir` that are of `kind`, sorted by name.
///
/// `exclude` names a path (typically the destination root) that must never
/// be offered as a candidate. Entries that cannot be classified are skipped
/// with a warning.
pub fn discover_candidates(
    dir: &Path,
    kind: EntryKind,
    exclude: Option<&Path>,
) -> Result<Vec<MatchCandidate>> {
    let entries = fs::read_dir(dir).map_err(|source| MigrationError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());

    let mut candidates = Vec::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Could not read entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let path = entry.path();
        let candidate = match MatchCandidate::from_path(&path) {
            Ok(Some(c)) => c,
            Ok(None) => {
                tracing::debug!("Skipping special file {}", path.display());
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if candidate.kind != kind {
            continue;
        }

        if let Some(ref excluded) = excluded {
            if fs::canonicalize(&path).ok().as_ref() == Some(excluded) {
                tracing::debug!("Skipping destination directory {}", path.display());
                continue;
            }
        }

        candidates.push(candidate);
    }

    candidates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(candidates)
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub matched_files: usize,
    pub processed_files: usize,
    pub matched_folders: usize,
    pub migrated_folders: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunStatistics {
    /// Counts a candidate that passed its filter.
    pub fn record_match(&mut self, kind: EntryKind) {
        match kind {
            EntryKind::File => self.matched_files += 1,
            EntryKind::Folder => self.matched_folders += 1,
        }
    }

    /// Folds one migration outcome into the counters.
    ///
    /// Dry-run previews count as processed/migrated since they reflect what
    /// would have happened.
    pub fn record_outcome(&mut self, kind: EntryKind, outcome: &MigrationOutcome) {
        match outcome {
            MigrationOutcome::Migrated { .. } | MigrationOutcome::SkippedDryRunPreview { .. } => {
                match kind {
                    EntryKind::File => self.processed_files += 1,
                    EntryKind::Folder => self.migrated_folders += 1,
                }
            }
            MigrationOutcome::SkippedConflict { .. } => self.skipped += 1,
            MigrationOutcome::Failed(_) => self.errors += 1,
        }
    }

    /// True when no candidate failed.
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// Process exit status for this run.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
