//! Tracing setup for the fmig binary.

use crate::error::{MigrationError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "info";
const VERBOSE_LOG_FILTER: &str = "debug";

/// Logging options taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions<'a> {
    pub verbose: bool,
    pub log_file: Option<&'a Path>,
}

impl LogOptions<'_> {
    /// `RUST_LOG` wins over the verbosity flag.
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if self.verbose {
                VERBOSE_LOG_FILTER
            } else {
                DEFAULT_LOG_FILTER
            })
        })
    }
}

/// Installs the global subscriber: stderr always, plus `log_file` when given.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the program.
pub fn init_logging(options: LogOptions<'_>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(options.filter());

    let (file_layer, guard) = match options.log_file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| {
                MigrationError::Config(format!("Invalid log file path: {}", path.display()))
            })?;
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            std::fs::create_dir_all(dir).map_err(|source| MigrationError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(options.filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| MigrationError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}
