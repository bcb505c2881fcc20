//! Copy and move execution for matched candidates.

use super::{EntryKind, MatchCandidate};
use crate::error::{MigrationError, Result};
use filetime::{set_file_times, FileTime};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Whether matched entries are copied or moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    #[default]
    Move,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Copy => write!(f, "COPY"),
            TransferMode::Move => write!(f, "MOVE"),
        }
    }
}

/// Result of migrating one candidate.
#[derive(Debug)]
pub enum MigrationOutcome {
    Migrated { destination: PathBuf },
    SkippedConflict { destination: PathBuf },
    SkippedDryRunPreview { destination: PathBuf },
    Failed(MigrationError),
}

/// Copies or moves candidates into a destination root.
///
/// Holds no per-run state: each call to [`Migrator::migrate`] is independent
/// and touches only the candidate it was given.
#[derive(Debug, Clone)]
pub struct Migrator {
    destination: PathBuf,
    mode: TransferMode,
    dry_run: bool,
}

impl Migrator {
    pub fn new(destination: impl Into<PathBuf>, mode: TransferMode, dry_run: bool) -> Self {
        Self {
            destination: destination.into(),
            mode,
            dry_run,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Where `candidate` would land.
    pub fn target_path(&self, candidate: &MatchCandidate) -> PathBuf {
        match candidate.path.file_name() {
            Some(name) => self.destination.join(name),
            None => self.destination.join(&candidate.name),
        }
    }

    /// Migrates one candidate.
    ///
    /// Never overwrites: an occupied target yields `SkippedConflict`. The
    /// conflict check and the transfer are separate steps, so two runs racing
    /// on the same destination are not protected against each other.
    pub fn migrate(&self, candidate: &MatchCandidate) -> MigrationOutcome {
        let destination = self.target_path(candidate);

        // symlink_metadata so that a dangling link still counts as occupied
        if fs::symlink_metadata(&destination).is_ok() {
            return MigrationOutcome::SkippedConflict { destination };
        }

        if let Err(e) = self.check_not_nested(candidate) {
            return MigrationOutcome::Failed(e);
        }

        if self.dry_run {
            return MigrationOutcome::SkippedDryRunPreview { destination };
        }

        match self.transfer(candidate, &destination) {
            Ok(()) => MigrationOutcome::Migrated { destination },
            Err(e) => MigrationOutcome::Failed(e),
        }
    }

    /// Rejects a destination root equal to or inside the candidate itself.
    fn check_not_nested(&self, candidate: &MatchCandidate) -> Result<()> {
        if candidate.kind != EntryKind::Folder {
            return Ok(());
        }
        let Ok(candidate_path) = fs::canonicalize(&candidate.path) else {
            return Ok(());
        };
        if resolve_path(&self.destination).starts_with(&candidate_path) {
            return Err(MigrationError::IntoItself {
                from: candidate.path.clone(),
                to: self.destination.clone(),
            });
        }
        Ok(())
    }

    fn transfer(&self, candidate: &MatchCandidate, destination: &Path) -> Result<()> {
        fs::create_dir_all(&self.destination).map_err(|source| MigrationError::CreateDir {
            path: self.destination.clone(),
            source,
        })?;

        match self.mode {
            TransferMode::Copy => copy_entry(&candidate.path, destination, candidate.kind),
            TransferMode::Move => move_entry(&candidate.path, destination, candidate.kind),
        }
    }
}

/// Canonical form of `path`, resolving its deepest existing ancestor when
/// the path itself does not exist yet.
fn resolve_path(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        if let Ok(resolved) = fs::canonicalize(current) {
            return missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}

fn copy_entry(src: &Path, dst: &Path, kind: EntryKind) -> Result<()> {
    match kind {
        EntryKind::File => copy_file_with_metadata(src, dst),
        EntryKind::Folder => copy_tree(src, dst),
    }
}

/// Renames when possible, otherwise copies and removes the source.
fn move_entry(src: &Path, dst: &Path, kind: EntryKind) -> Result<()> {
    let rename_err = match fs::rename(src, dst) {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    if fs::symlink_metadata(src).is_err() {
        return Err(MigrationError::Move {
            from: src.to_path_buf(),
            to: dst.to_path_buf(),
            source: rename_err,
        });
    }

    tracing::debug!(
        "Rename of {} failed ({}), falling back to copy and remove",
        src.display(),
        rename_err
    );
    copy_entry(src, dst, kind)?;

    let removed = match kind {
        EntryKind::File => fs::remove_file(src),
        EntryKind::Folder => fs::remove_dir_all(src),
    };
    removed.map_err(|source| MigrationError::Remove {
        path: src.to_path_buf(),
        source,
    })
}

/// Copies bytes, permissions and access/modification times.
fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<()> {
    let copy_err = |source| MigrationError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    fs::copy(src, dst).map_err(copy_err)?;

    let metadata = fs::metadata(src).map_err(copy_err)?;
    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    set_file_times(dst, accessed, modified).map_err(copy_err)?;
    Ok(())
}

/// Recursively copies `src` to `dst`. `dst` must not exist yet.
///
/// A failure part way leaves the partial tree in place.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            MigrationError::ReadDir {
                path,
                source: e.into(),
            }
        })?;

        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|source| MigrationError::CreateDir {
                path: target.clone(),
                source,
            })?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else if file_type.is_file() {
            copy_file_with_metadata(entry.path(), &target)?;
        } else {
            tracing::warn!("Skipping special file {}", entry.path().display());
        }
    }
    Ok(())
}

/// Recreates a symlink rather than copying what it points to.
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let copy_err = |source| MigrationError::Copy {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };
    let target = fs::read_link(src).map_err(copy_err)?;

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, dst).map_err(copy_err)
    }
    #[cfg(windows)]
    {
        let linked = if src.is_dir() {
            std::os::windows::fs::symlink_dir(&target, dst)
        } else {
            std::os::windows::fs::symlink_file(&target, dst)
        };
        linked.map_err(copy_err)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = target;
        fs::copy(src, dst).map(|_| ()).map_err(copy_err)
    }
}
