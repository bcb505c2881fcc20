//! fmig - rule-based file and folder migration
//!
//! This crate classifies the entries of a source directory against name,
//! type and size filters and moves or copies the matches into a destination
//! directory, with a dry-run preview and per-run statistics.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod organizer;

// Re-export primary types for convenience
pub use cli::{AppConfig, Args};
pub use config::UserConfig;
pub use domain::{
    discover_candidates, CaseSensitivity, EntryKind, FilterSpec, MatchCandidate,
    MigrationOutcome, Migrator, NamePattern, RunStatistics, TransferMode,
};
pub use error::{MigrationError, Result};
pub use organizer::Organizer;
