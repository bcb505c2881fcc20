//! Recursive folder facts used by folder filters.
//!
//! Both walks are best effort below the top level: unreadable subdirectories
//! and entries that fail to stat are skipped. Only a folder whose own listing
//! fails is reported as an error.

use super::{bytes_to_mb, split_extension};
use crate::error::{MigrationError, Result};
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Fails when the top level of `folder` cannot be listed.
fn probe_folder(folder: &Path) -> Result<()> {
    fs::read_dir(folder)
        .map(|_| ())
        .map_err(|source| MigrationError::ReadDir {
            path: folder.to_path_buf(),
            source,
        })
}

/// Everything below `folder`, skipping (and tracing) walk errors.
fn walk_entries(folder: &Path) -> impl Iterator<Item = DirEntry> + '_ {
    WalkDir::new(folder)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", folder.display(), e);
                None
            }
        })
}

/// Non-directory entries: regular files and symlinks that are not directories.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

/// True if any file below `folder` has an extension in `types`.
///
/// `types` are dot-prefixed; comparison ignores case. Returns at the first hit.
pub fn contains_type(folder: &Path, types: &[String]) -> Result<bool> {
    probe_folder(folder)?;

    let wanted: Vec<String> = types.iter().map(|t| t.to_lowercase()).collect();
    let found = walk_entries(folder).filter(is_file_like).any(|entry| {
        let name = entry.file_name().to_string_lossy();
        let ext = split_extension(&name).1.to_lowercase();
        wanted.iter().any(|t| *t == ext)
    });

    Ok(found)
}

/// Sum of the sizes of all readable files below `folder`, in bytes.
pub fn total_size_bytes(folder: &Path) -> Result<u64> {
    probe_folder(folder)?;

    let total = walk_entries(folder)
        .filter(is_file_like)
        .filter_map(|entry| match fs::metadata(entry.path()) {
            Ok(m) => Some(m.len()),
            Err(e) => {
                tracing::debug!("Could not stat {}: {}", entry.path().display(), e);
                None
            }
        })
        .sum();

    Ok(total)
}

/// [`total_size_bytes`] in binary megabytes.
pub fn total_size_mb(folder: &Path) -> Result<f64> {
    total_size_bytes(folder).map(bytes_to_mb)
}
