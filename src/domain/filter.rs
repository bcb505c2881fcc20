//! Composite filters over name, type and size.

use super::aggregate;
use super::pattern::{CaseSensitivity, NamePattern};
use super::{bytes_to_mb, EntryKind, MatchCandidate};
use crate::error::Result;

/// Filter applied to one kind of candidate (files or folders).
///
/// Absent axes do not constrain. Empty pattern or type lists are normalized
/// to absent at construction. Inverted size bounds are kept as given and
/// simply match nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    name_patterns: Option<Vec<NamePattern>>,
    types: Option<Vec<String>>,
    min_size_mb: Option<f64>,
    max_size_mb: Option<f64>,
    case: CaseSensitivity,
}

/// Adds a leading `.` to an extension if it lacks one.
pub fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name patterns, OR-combined.
    pub fn with_name_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed: Vec<NamePattern> = patterns
            .into_iter()
            .map(|p| NamePattern::parse(p.as_ref()))
            .collect();
        self.name_patterns = (!parsed.is_empty()).then_some(parsed);
        self
    }

    /// Extensions, OR-combined. Each gets a leading `.` if missing.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: Vec<String> = types
            .into_iter()
            .map(|t| normalize_extension(t.as_ref()))
            .collect();
        self.types = (!normalized.is_empty()).then_some(normalized);
        self
    }

    pub fn with_min_size_mb(mut self, min: Option<f64>) -> Self {
        self.min_size_mb = min;
        self
    }

    pub fn with_max_size_mb(mut self, max: Option<f64>) -> Self {
        self.max_size_mb = max;
        self
    }

    pub fn with_case(mut self, case: CaseSensitivity) -> Self {
        self.case = case;
        self
    }

    pub fn name_patterns(&self) -> Option<&[NamePattern]> {
        self.name_patterns.as_deref()
    }

    pub fn types(&self) -> Option<&[String]> {
        self.types.as_deref()
    }

    pub fn min_size_mb(&self) -> Option<f64> {
        self.min_size_mb
    }

    pub fn max_size_mb(&self) -> Option<f64> {
        self.max_size_mb
    }

    fn has_size_bounds(&self) -> bool {
        self.min_size_mb.is_some() || self.max_size_mb.is_some()
    }

    /// Whether `candidate` passes every active axis.
    ///
    /// I/O failures while resolving size or content are logged as warnings
    /// and count as a non-match.
    pub fn evaluate(&self, candidate: &MatchCandidate) -> bool {
        match self.try_evaluate(candidate) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("Treating {} {} as non-matching: {}", candidate.kind, candidate.name, e);
                false
            }
        }
    }

    /// Like [`FilterSpec::evaluate`] but surfaces I/O failures.
    ///
    /// Axes are checked in order name, type, size and stop at the first miss,
    /// so folder walks only happen when cheaper axes already passed.
    pub fn try_evaluate(&self, candidate: &MatchCandidate) -> Result<bool> {
        Ok(self.matches_name(candidate)
            && self.matches_type(candidate)?
            && self.matches_size(candidate)?)
    }

    fn matches_name(&self, candidate: &MatchCandidate) -> bool {
        let Some(patterns) = &self.name_patterns else {
            return true;
        };
        let name = candidate.match_name();
        patterns
            .iter()
            .any(|p| p.matches(name, candidate.kind, self.case))
    }

    fn matches_type(&self, candidate: &MatchCandidate) -> Result<bool> {
        let Some(types) = &self.types else {
            return Ok(true);
        };
        match candidate.kind {
            EntryKind::File => {
                let ext = candidate.extension().to_lowercase();
                Ok(types.iter().any(|t| t.to_lowercase() == ext))
            }
            EntryKind::Folder => aggregate::contains_type(&candidate.path, types),
        }
    }

    fn matches_size(&self, candidate: &MatchCandidate) -> Result<bool> {
        if !self.has_size_bounds() {
            return Ok(true);
        }
        let size_mb = match candidate.kind {
            EntryKind::File => bytes_to_mb(candidate.file_size()?),
            EntryKind::Folder => aggregate::total_size_mb(&candidate.path)?,
        };
        Ok(self.size_within_bounds(size_mb))
    }

    /// Inclusive bound check.
    pub fn size_within_bounds(&self, size_mb: f64) -> bool {
        if let Some(min) = self.min_size_mb {
            if size_mb < min {
                return false;
            }
        }
        if let Some(max) = self.max_size_mb {
            if size_mb > max {
                return false;
            }
        }
        true
    }

    /// One line per active criterion, for the configuration summary.
    pub fn describe(&self, kind: EntryKind) -> Vec<String> {
        let mut lines = Vec::new();
        let (name_label, type_label, size_label) = match kind {
            EntryKind::File => ("Name Pattern", "File Type", "Size"),
            EntryKind::Folder => ("Folder Name", "Contains File Type", "Folder Size"),
        };

        if let Some(patterns) = &self.name_patterns {
            let desc: Vec<String> = patterns.iter().map(|p| p.describe(kind)).collect();
            lines.push(format!("{name_label}: {}", desc.join(" OR ")));
        }
        if let Some(types) = &self.types {
            lines.push(format!("{type_label}: {}", types.join(" OR ")));
        }
        if let Some(min) = self.min_size_mb {
            lines.push(format!("Min {size_label}: {min} MB"));
        }
        if let Some(max) = self.max_size_mb {
            lines.push(format!("Max {size_label}: {max} MB"));
        }
        if self.case == CaseSensitivity::Insensitive && self.name_patterns.is_some() {
            lines.push("Name matching ignores case".to_string());
        }
        if lines.is_empty() {
            lines.push(match kind {
                EntryKind::File => "All files (no filters)".to_string(),
                EntryKind::Folder => "All folders (no filters)".to_string(),
            });
        }
        lines
    }
}
