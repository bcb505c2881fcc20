// CLI module for argument parsing and run configuration

use crate::config::UserConfig;
use crate::domain::{CaseSensitivity, EntryKind, FilterSpec, TransferMode};
use crate::error::{MigrationError, Result};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
PATTERN SYNTAX:
  ^text$   name equals text
  ^text    name starts with text
  text$    name ends with text
  *text*   name contains text
  text     files: name ends with text; folders: name equals or ends with text

File names are matched without their extension. Multiple values for one
option are OR-ed; different options are AND-ed.

EXAMPLES:
  fmig ~/Downloads ~/Sorted -p _1 _2 -t pdf
  fmig ~/Downloads ~/Sorted --folder-pattern Archive --folder-min-size 100
  fmig ~/Downloads ~/Sorted -t .jpg .png --min-size 2 --copy --dry-run";

/// fmig - move or copy files and folders that match name, type and size filters
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fmig")]
#[command(author, version, about, long_about = None, after_help = AFTER_HELP)]
pub struct Args {
    /// Source directory (defaults to the configured source)
    pub source: Option<PathBuf>,

    /// Destination directory (defaults to the configured destination)
    pub destination: Option<PathBuf>,

    /// File name pattern(s); a file matches if any pattern matches
    #[arg(short = 'p', long = "pattern", num_args = 1.., value_name = "PATTERN")]
    pub name_patterns: Vec<String>,

    /// File extension(s), e.g. ".pdf" or "jpg"
    #[arg(short = 't', long = "type", num_args = 1.., value_name = "EXT")]
    pub file_types: Vec<String>,

    /// Minimum file size in MB (a B/KB/MB/GB suffix is also accepted)
    #[arg(long = "min-size", value_name = "SIZE", value_parser = parse_size_mb)]
    pub min_size_mb: Option<f64>,

    /// Maximum file size in MB (a B/KB/MB/GB suffix is also accepted)
    #[arg(long = "max-size", value_name = "SIZE", value_parser = parse_size_mb)]
    pub max_size_mb: Option<f64>,

    /// Folder name pattern(s); a folder matches if any pattern matches
    #[arg(long = "folder-pattern", num_args = 1.., value_name = "PATTERN")]
    pub folder_patterns: Vec<String>,

    /// File extension(s) a folder must contain somewhere in its tree
    #[arg(long = "folder-contains", num_args = 1.., value_name = "EXT")]
    pub folder_types: Vec<String>,

    /// Minimum total folder size in MB
    #[arg(long = "folder-min-size", value_name = "SIZE", value_parser = parse_size_mb)]
    pub folder_min_size_mb: Option<f64>,

    /// Maximum total folder size in MB
    #[arg(long = "folder-max-size", value_name = "SIZE", value_parser = parse_size_mb)]
    pub folder_max_size_mb: Option<f64>,

    /// Copy instead of move
    #[arg(long = "copy", action = ArgAction::SetTrue)]
    pub copy: bool,

    /// Preview operations without touching the filesystem
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Match name patterns without regard to case
    #[arg(short = 'i', long = "ignore-case", action = ArgAction::SetTrue)]
    pub ignore_case: bool,

    /// Enable verbose (debug) logging
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Also write log output to this file
    #[arg(long = "log", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Read defaults from this config file instead of the standard location
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

/// Parses a size in MB. Plain numbers are MB; `B`, `KB`, `MB` and `GB`
/// suffixes (binary multiples, any case) are converted to MB.
pub fn parse_size_mb(size_str: &str) -> std::result::Result<f64, String> {
    let upper = size_str.trim().to_uppercase();

    let (num_str, factor) = if let Some(n) = upper.strip_suffix("GB") {
        (n, 1024.0)
    } else if let Some(n) = upper.strip_suffix("MB") {
        (n, 1.0)
    } else if let Some(n) = upper.strip_suffix("KB") {
        (n, 1.0 / 1024.0)
    } else if let Some(n) = upper.strip_suffix('B') {
        (n, 1.0 / (1024.0 * 1024.0))
    } else {
        (upper.as_str(), 1.0)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid size '{size_str}', use a number of MB or e.g. '500KB', '2GB'"))?;
    if !num.is_finite() || num < 0.0 {
        return Err(format!("size must be a non-negative number, got '{size_str}'"));
    }

    Ok(num * factor)
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Whether any file filter option was given
    pub fn has_file_filters(&self) -> bool {
        !self.name_patterns.is_empty()
            || !self.file_types.is_empty()
            || self.min_size_mb.is_some()
            || self.max_size_mb.is_some()
    }

    /// Whether any folder filter option was given
    pub fn has_folder_filters(&self) -> bool {
        !self.folder_patterns.is_empty()
            || !self.folder_types.is_empty()
            || self.folder_min_size_mb.is_some()
            || self.folder_max_size_mb.is_some()
    }

    /// File filter built purely from the command line, if any file option was given
    pub fn file_spec(&self) -> Option<FilterSpec> {
        self.has_file_filters().then(|| {
            FilterSpec::new()
                .with_name_patterns(&self.name_patterns)
                .with_types(&self.file_types)
                .with_min_size_mb(self.min_size_mb)
                .with_max_size_mb(self.max_size_mb)
        })
    }

    /// Folder filter built purely from the command line, if any folder option was given
    pub fn folder_spec(&self) -> Option<FilterSpec> {
        self.has_folder_filters().then(|| {
            FilterSpec::new()
                .with_name_patterns(&self.folder_patterns)
                .with_types(&self.folder_types)
                .with_min_size_mb(self.folder_min_size_mb)
                .with_max_size_mb(self.folder_max_size_mb)
        })
    }

    /// Load the config file named by `--config`, or the standard one
    pub fn load_user_config(&self) -> Result<UserConfig> {
        match &self.config_file {
            Some(path) => UserConfig::load_from(path),
            None => UserConfig::load(),
        }
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files: Option<FilterSpec>,
    pub folders: Option<FilterSpec>,
    pub mode: TransferMode,
    pub dry_run: bool,
}

impl AppConfig {
    /// Combines command line arguments with the user config.
    ///
    /// Any command line option for a kind replaces that kind's configured
    /// filter entirely. Fails if neither kind ends up enabled.
    pub fn resolve(args: &Args, user_config: &UserConfig) -> Result<Self> {
        let case = if args.ignore_case {
            CaseSensitivity::Insensitive
        } else {
            CaseSensitivity::Sensitive
        };

        let files = args
            .file_spec()
            .or_else(|| user_config.file_spec())
            .map(|spec| spec.with_case(case));
        let folders = args
            .folder_spec()
            .or_else(|| user_config.folder_spec())
            .map(|spec| spec.with_case(case));

        if files.is_none() && folders.is_none() {
            return Err(MigrationError::NoMigrationConfigured);
        }

        let mode = if args.copy || user_config.copy_mode {
            TransferMode::Copy
        } else {
            TransferMode::Move
        };

        Ok(AppConfig {
            source: args
                .source
                .clone()
                .unwrap_or_else(|| user_config.source.clone()),
            destination: args
                .destination
                .clone()
                .unwrap_or_else(|| user_config.destination.clone()),
            files,
            folders,
            mode,
            dry_run: args.dry_run || user_config.dry_run,
        })
    }

    /// The filter for `kind`, if that kind is enabled
    pub fn spec_for(&self, kind: EntryKind) -> Option<&FilterSpec> {
        match kind {
            EntryKind::File => self.files.as_ref(),
            EntryKind::Folder => self.folders.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::config::OneOrMany;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["fmig"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    mod args_tests {
        use super::*;

        #[test]
        fn test_positionals_then_repeatable_values() {
            let args = parse(&["/src", "/dst", "-p", "_1", "_2", "-t", "pdf", ".jpg"]);
            assert_eq!(args.source, Some(PathBuf::from("/src")));
            assert_eq!(args.destination, Some(PathBuf::from("/dst")));
            assert_eq!(args.name_patterns, vec!["_1", "_2"]);
            assert_eq!(args.file_types, vec!["pdf", ".jpg"]);
        }

        #[test]
        fn test_repeated_flag_appends() {
            let args = parse(&["/src", "/dst", "-p", "_1", "-p", "^Report"]);
            assert_eq!(args.name_patterns, vec!["_1", "^Report"]);
        }

        #[test]
        fn test_defaults() {
            let args = parse(&[]);
            assert!(args.source.is_none());
            assert!(args.destination.is_none());
            assert!(!args.copy);
            assert!(!args.dry_run);
            assert!(!args.verbose);
            assert!(!args.has_file_filters());
            assert!(!args.has_folder_filters());
        }

        #[test]
        fn test_operation_and_logging_flags() {
            let args = parse(&["--copy", "--dry-run", "-v", "--log", "ops.log"]);
            assert!(args.copy);
            assert!(args.dry_run);
            assert!(args.verbose);
            assert_eq!(args.log_file, Some(PathBuf::from("ops.log")));
        }

        #[test]
        fn test_size_flag_alone_enables_kind() {
            let args = parse(&["--min-size", "10"]);
            assert!(args.has_file_filters());
            assert!(!args.has_folder_filters());

            let args = parse(&["--folder-max-size", "0"]);
            assert!(args.has_folder_filters());
        }

        #[test]
        fn test_invalid_size_rejected() {
            assert!(Args::try_parse_from(["fmig", "--min-size", "abc"]).is_err());
            assert!(Args::try_parse_from(["fmig", "--folder-min-size=-5"]).is_err());
        }
    }

    mod parse_size_tests {
        use super::*;

        #[test]
        fn test_plain_number_is_mb() {
            assert_eq!(parse_size_mb("10"), Ok(10.0));
            assert_eq!(parse_size_mb("2.5"), Ok(2.5));
            assert_eq!(parse_size_mb("0"), Ok(0.0));
        }

        #[test]
        fn test_unit_suffixes() {
            assert_eq!(parse_size_mb("1GB"), Ok(1024.0));
            assert_eq!(parse_size_mb("5MB"), Ok(5.0));
            assert_eq!(parse_size_mb("512KB"), Ok(0.5));
            assert_eq!(parse_size_mb("1048576B"), Ok(1.0));
            assert_eq!(parse_size_mb("1.5gb"), Ok(1536.0));
        }

        #[test]
        fn test_invalid_sizes() {
            assert!(parse_size_mb("abc").is_err());
            assert!(parse_size_mb("MB").is_err());
            assert!(parse_size_mb("").is_err());
            assert!(parse_size_mb("-1").is_err());
            assert!(parse_size_mb("NaN").is_err());
            assert!(parse_size_mb("inf").is_err());
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_no_kind_configured_is_error() {
            let result = AppConfig::resolve(&parse(&["/src", "/dst"]), &UserConfig::default());
            assert!(matches!(result, Err(MigrationError::NoMigrationConfigured)));
        }

        #[test]
        fn test_cli_file_flags_build_spec() {
            let args = parse(&["/src", "/dst", "-p", "_1", "-t", "pdf"]);
            let config = AppConfig::resolve(&args, &UserConfig::default()).unwrap();

            let files = config.files.as_ref().unwrap();
            assert_eq!(files.types().unwrap(), &[".pdf".to_string()]);
            assert!(config.folders.is_none());
            assert_eq!(config.mode, TransferMode::Move);
            assert!(!config.dry_run);
            assert_eq!(config.source, PathBuf::from("/src"));
            assert_eq!(config.destination, PathBuf::from("/dst"));
        }

        #[test]
        fn test_cli_kind_replaces_configured_kind_entirely() {
            let user_config = UserConfig {
                folders: Some(FilterConfig {
                    name_pattern: Some(OneOrMany::One("Archive".to_string())),
                    min_size_mb: Some(100.0),
                    ..Default::default()
                }),
                ..Default::default()
            };
            let args = parse(&["--folder-contains", ".pdf"]);
            let config = AppConfig::resolve(&args, &user_config).unwrap();

            let folders = config.folders.unwrap();
            assert!(folders.name_patterns().is_none());
            assert!(folders.min_size_mb().is_none());
            assert_eq!(folders.types().unwrap(), &[".pdf".to_string()]);
        }

        #[test]
        fn test_configured_kind_used_when_cli_silent() {
            let user_config = UserConfig {
                source: PathBuf::from("/configured/in"),
                files: Some(FilterConfig {
                    file_type: Some(OneOrMany::Many(vec![".pdf".into(), ".docx".into()])),
                    ..Default::default()
                }),
                copy_mode: true,
                ..Default::default()
            };
            let args = parse(&["--folder-pattern", "^Project"]);
            let config = AppConfig::resolve(&args, &user_config).unwrap();

            assert_eq!(config.files.as_ref().unwrap().types().unwrap().len(), 2);
            assert!(config.folders.is_some());
            assert_eq!(config.mode, TransferMode::Copy);
            assert_eq!(config.source, PathBuf::from("/configured/in"));
            assert_eq!(config.destination, PathBuf::from("migrated"));
        }

        #[test]
        fn test_ignore_case_applies_to_both_kinds() {
            let args = parse(&["-i", "-p", "^report", "--folder-pattern", "archive"]);
            let config = AppConfig::resolve(&args, &UserConfig::default()).unwrap();

            let expected_files = FilterSpec::new()
                .with_name_patterns(["^report"])
                .with_case(CaseSensitivity::Insensitive);
            assert_eq!(config.spec_for(EntryKind::File), Some(&expected_files));
            let expected_folders = FilterSpec::new()
                .with_name_patterns(["archive"])
                .with_case(CaseSensitivity::Insensitive);
            assert_eq!(config.spec_for(EntryKind::Folder), Some(&expected_folders));
        }

        #[test]
        fn test_dry_run_from_either_source() {
            let user_config = UserConfig {
                dry_run: true,
                files: Some(FilterConfig::default()),
                ..Default::default()
            };
            let config = AppConfig::resolve(&parse(&[]), &user_config).unwrap();
            assert!(config.dry_run);
            assert_eq!(config.files, Some(FilterSpec::new()));
        }
    }
}
