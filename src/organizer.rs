//! Run orchestration: discover, filter, migrate, summarize.

use crate::cli::AppConfig;
use crate::domain::{
    discover_candidates, EntryKind, FilterSpec, MatchCandidate, MigrationOutcome, Migrator,
    RunStatistics, TransferMode,
};
use crate::error::{MigrationError, Result};
use chrono::{Local, SecondsFormat};
use std::path::Path;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Executes one migration run over a resolved [`AppConfig`].
pub struct Organizer {
    config: AppConfig,
    migrator: Migrator,
}

impl Organizer {
    pub fn new(config: AppConfig) -> Self {
        let migrator = Migrator::new(&config.destination, config.mode, config.dry_run);
        Self { config, migrator }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Checks that the source exists and is a directory.
    pub fn validate_source(&self) -> Result<()> {
        let source = &self.config.source;
        if !source.exists() {
            return Err(MigrationError::SourceNotFound(source.clone()));
        }
        if !source.is_dir() {
            return Err(MigrationError::SourceNotDirectory(source.clone()));
        }
        Ok(())
    }

    /// Runs folders first, then files, and logs a summary.
    ///
    /// The configuration is logged first. Only source validation fails the
    /// run; everything after that is folded into the returned statistics.
    pub fn run(&self) -> Result<RunStatistics> {
        self.log_configuration();
        self.validate_source()?;

        let started = Local::now();
        tracing::info!(
            "Started: {}",
            started.to_rfc3339_opts(SecondsFormat::Secs, false)
        );

        let mut stats = RunStatistics::default();
        for kind in [EntryKind::Folder, EntryKind::File] {
            if let Some(spec) = self.config.spec_for(kind) {
                self.migrate_kind(kind, spec, &mut stats);
            }
        }

        let elapsed = Local::now() - started;
        self.log_summary(&stats, elapsed);
        Ok(stats)
    }

    /// Candidates of `kind` in the source that pass `spec`.
    pub fn find_matches(&self, kind: EntryKind, spec: &FilterSpec) -> Vec<MatchCandidate> {
        let candidates = match discover_candidates(
            &self.config.source,
            kind,
            Some(&self.config.destination),
        ) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("{}", e);
                return Vec::new();
            }
        };

        candidates
            .into_iter()
            .filter(|candidate| {
                let matched = spec.evaluate(candidate);
                tracing::debug!(
                    "{} {}: {}",
                    kind,
                    candidate.name,
                    if matched { "match" } else { "no match" }
                );
                matched
            })
            .collect()
    }

    fn migrate_kind(&self, kind: EntryKind, spec: &FilterSpec, stats: &mut RunStatistics) {
        match kind {
            EntryKind::Folder => tracing::info!("Scanning for folders to migrate..."),
            EntryKind::File => tracing::info!("Scanning for matching files..."),
        }

        let matches = self.find_matches(kind, spec);
        if matches.is_empty() {
            match kind {
                EntryKind::Folder => {
                    tracing::warn!("No folders found matching the specified criteria")
                }
                EntryKind::File => tracing::warn!("No files found matching the specified criteria"),
            }
            return;
        }

        match kind {
            EntryKind::Folder => tracing::info!("Found {} folder(s) matching criteria", matches.len()),
            EntryKind::File => tracing::info!("Found {} matching file(s)", matches.len()),
        }

        for candidate in &matches {
            stats.record_match(kind);
            let outcome = self.migrator.migrate(candidate);
            self.log_outcome(candidate, &outcome);
            stats.record_outcome(kind, &outcome);
        }
    }

    fn log_outcome(&self, candidate: &MatchCandidate, outcome: &MigrationOutcome) {
        let name = &candidate.name;
        let mode = self.migrator.mode();
        let folder = candidate.kind == EntryKind::Folder;

        match outcome {
            MigrationOutcome::SkippedConflict { .. } if folder => {
                tracing::warn!("Folder already exists at destination: {}", name)
            }
            MigrationOutcome::SkippedConflict { .. } => {
                tracing::warn!("File already exists at destination: {}", name)
            }
            MigrationOutcome::SkippedDryRunPreview { .. } if folder => {
                tracing::info!("[DRY RUN] Would {} folder: {}", mode, name)
            }
            MigrationOutcome::SkippedDryRunPreview { .. } => {
                tracing::info!("[DRY RUN] Would {}: {}", mode, name)
            }
            MigrationOutcome::Migrated { destination } => {
                let verb = match mode {
                    TransferMode::Copy => "Copied",
                    TransferMode::Move => "Moved",
                };
                if folder {
                    tracing::info!("{} folder: {}", verb, name);
                } else {
                    tracing::info!("{}: {}", verb, name);
                }
                tracing::debug!("{} -> {}", candidate.path.display(), destination.display());
            }
            MigrationOutcome::Failed(e) if folder => {
                tracing::error!("Error processing folder {}: {}", name, e)
            }
            MigrationOutcome::Failed(e) => tracing::error!("Error processing {}: {}", name, e),
        }
    }

    fn log_configuration(&self) {
        tracing::info!("{}", rule());
        tracing::info!("Pattern-Based File & Folder Organizer");
        tracing::info!("{}", rule());
        tracing::info!("Source: {}", display_path(&self.config.source));
        tracing::info!("Destination: {}", display_path(self.migrator.destination()));

        if let Some(spec) = &self.config.folders {
            tracing::info!("Folder Migration Mode:");
            tracing::info!("Filter Criteria for Folders:");
            for line in spec.describe(EntryKind::Folder) {
                tracing::info!("  - {}", line);
            }
        }
        if let Some(spec) = &self.config.files {
            tracing::info!("File Migration Mode:");
            tracing::info!("Filter Criteria for Files:");
            for line in spec.describe(EntryKind::File) {
                tracing::info!("  - {}", line);
            }
        }

        tracing::info!("Mode: {}", self.migrator.mode());
        tracing::info!(
            "Dry Run: {}",
            if self.migrator.is_dry_run() { "YES" } else { "NO" }
        );
        tracing::info!("{}", rule());
    }

    fn log_summary(&self, stats: &RunStatistics, elapsed: chrono::Duration) {
        tracing::info!("{}", rule());
        tracing::info!("OPERATION SUMMARY");
        tracing::info!("{}", rule());

        if self.config.files.is_some() {
            tracing::info!("FILES:");
            tracing::info!("  Matched:   {}", stats.matched_files);
            tracing::info!("  Processed: {}", stats.processed_files);
        }
        if self.config.folders.is_some() {
            tracing::info!("FOLDERS:");
            tracing::info!("  Matched:  {}", stats.matched_folders);
            tracing::info!("  Migrated: {}", stats.migrated_folders);
        }
        tracing::info!("OVERALL:");
        tracing::info!("  Skipped: {}", stats.skipped);
        tracing::info!("  Errors:  {}", stats.errors);
        tracing::info!(
            "Elapsed: {:.2}s",
            elapsed.num_milliseconds() as f64 / 1000.0
        );
        tracing::info!("{}", rule());
    }
}

/// Absolute form of `path` when it can be resolved, else as given.
fn display_path(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    const MB: u64 = 1024 * 1024;

    fn sized_file(path: &Path, bytes: u64) {
        let file = File::create(path).unwrap();
        file.set_len(bytes).unwrap();
    }

    fn config(source: &Path, destination: &Path) -> AppConfig {
        AppConfig {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            files: None,
            folders: None,
            mode: TransferMode::Move,
            dry_run: false,
        }
    }

    /// report_1.pdf (2 MB), report_2.txt (1 MB), Archive/ (150 MB)
    fn sample_source() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        sized_file(&temp_dir.path().join("report_1.pdf"), 2 * MB);
        sized_file(&temp_dir.path().join("report_2.txt"), MB);
        let archive = temp_dir.path().join("Archive");
        fs::create_dir(&archive).unwrap();
        sized_file(&archive.join("big.bin"), 150 * MB);
        temp_dir
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_missing_source() {
            let dest = TempDir::new().unwrap();
            let mut cfg = config(Path::new("/nonexistent/source"), dest.path());
            cfg.files = Some(FilterSpec::new());

            let result = Organizer::new(cfg).run();
            assert!(matches!(result, Err(MigrationError::SourceNotFound(_))));
        }

        #[test]
        fn test_source_is_a_file() {
            let temp_dir = TempDir::new().unwrap();
            let file = temp_dir.path().join("plain.txt");
            fs::write(&file, b"x").unwrap();
            let mut cfg = config(&file, &temp_dir.path().join("out"));
            cfg.files = Some(FilterSpec::new());

            let result = Organizer::new(cfg).run();
            assert!(matches!(result, Err(MigrationError::SourceNotDirectory(_))));
            assert!(!temp_dir.path().join("out").exists());
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_files_and_folders_moved() {
            let source = sample_source();
            let dest = TempDir::new().unwrap();
            let mut cfg = config(source.path(), dest.path());
            cfg.files = Some(
                FilterSpec::new()
                    .with_name_patterns(["_1"])
                    .with_types(["pdf"]),
            );
            cfg.folders = Some(
                FilterSpec::new()
                    .with_name_patterns(["Archive"])
                    .with_min_size_mb(Some(100.0)),
            );

            let stats = Organizer::new(cfg.clone()).run().unwrap();
            assert_eq!(
                stats,
                RunStatistics {
                    matched_files: 1,
                    processed_files: 1,
                    matched_folders: 1,
                    migrated_folders: 1,
                    skipped: 0,
                    errors: 0,
                }
            );
            assert!(dest.path().join("report_1.pdf").exists());
            assert!(dest.path().join("Archive").join("big.bin").exists());
            assert!(!source.path().join("report_1.pdf").exists());
            assert!(!source.path().join("Archive").exists());
            assert!(source.path().join("report_2.txt").exists());

            // Nothing left to match on a second run
            let stats = Organizer::new(cfg).run().unwrap();
            assert_eq!(stats, RunStatistics::default());
        }

        #[test]
        fn test_dry_run_touches_nothing() {
            let source = sample_source();
            let dest = TempDir::new().unwrap();
            let out = dest.path().join("out");
            let mut cfg = config(source.path(), &out);
            cfg.files = Some(FilterSpec::new().with_name_patterns(["^report"]));
            cfg.dry_run = true;

            let stats = Organizer::new(cfg).run().unwrap();
            assert_eq!(stats.matched_files, 2);
            assert_eq!(stats.processed_files, 2);
            assert!(!out.exists());
            assert!(source.path().join("report_1.pdf").exists());
        }

        #[test]
        fn test_copy_conflict_is_skipped() {
            let source = sample_source();
            let dest = TempDir::new().unwrap();
            fs::write(dest.path().join("report_2.txt"), b"existing").unwrap();
            let mut cfg = config(source.path(), dest.path());
            cfg.files = Some(FilterSpec::new().with_types([".txt", ".pdf"]));
            cfg.mode = TransferMode::Copy;

            let stats = Organizer::new(cfg).run().unwrap();
            assert_eq!(stats.matched_files, 2);
            assert_eq!(stats.processed_files, 1);
            assert_eq!(stats.skipped, 1);
            assert_eq!(fs::read(dest.path().join("report_2.txt")).unwrap(), b"existing");
            assert!(source.path().join("report_1.pdf").exists());
            assert!(dest.path().join("report_1.pdf").exists());
        }

        #[test]
        fn test_destination_inside_source_is_not_migrated() {
            let source = sample_source();
            let dest = source.path().join("migrated");
            let mut cfg = config(source.path(), &dest);
            cfg.folders = Some(FilterSpec::new());

            let first = Organizer::new(cfg.clone()).run().unwrap();
            assert_eq!(first.migrated_folders, 1);

            let second = Organizer::new(cfg).run().unwrap();
            assert_eq!(second.matched_folders, 0);
            assert!(dest.join("Archive").exists());
        }

        #[test]
        fn test_destination_inside_matching_folder_fails_cleanly() {
            for mode in [TransferMode::Move, TransferMode::Copy] {
                let source = sample_source();
                let dest = source.path().join("Archive").join("sorted");
                let mut cfg = config(source.path(), &dest);
                cfg.folders = Some(FilterSpec::new().with_name_patterns(["Archive"]));
                cfg.mode = mode;

                let stats = Organizer::new(cfg).run().unwrap();
                assert_eq!(stats.matched_folders, 1);
                assert_eq!(stats.migrated_folders, 0);
                assert_eq!(stats.errors, 1);
                assert_eq!(stats.exit_code(), 1);
                assert!(!dest.exists());
                assert!(source.path().join("Archive").join("big.bin").exists());
            }
        }

        #[test]
        fn test_folder_size_filter_excludes_small_folders() {
            let source = sample_source();
            let small = source.path().join("Small");
            fs::create_dir(&small).unwrap();
            sized_file(&small.join("tiny.bin"), MB);
            let dest = TempDir::new().unwrap();
            let mut cfg = config(source.path(), dest.path());
            cfg.folders = Some(FilterSpec::new().with_min_size_mb(Some(100.0)));
            cfg.dry_run = true;

            let organizer = Organizer::new(cfg);
            let spec = organizer.config().folders.clone().unwrap();
            let matches = organizer.find_matches(EntryKind::Folder, &spec);
            let names: Vec<&str> = matches.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["Archive"]);
        }
    }
}
