//! Name pattern syntax and matching.
//!
//! Patterns are plain strings with optional anchors:
//! - `^text$` matches the name exactly
//! - `^text` matches names starting with `text`
//! - `text$` matches names ending with `text`
//! - `*text*` matches names containing `text`
//! - `text` ends-with for files, equals-or-ends-with for folders

use super::EntryKind;
use std::fmt;

/// How name comparisons treat letter case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

/// A parsed name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    /// No anchors; meaning depends on whether a file or a folder is matched.
    Bare(String),
}

impl NamePattern {
    /// Parses a raw pattern string. Anchor precedence: `^..$`, `^..`, `..$`, `*..*`.
    pub fn parse(raw: &str) -> Self {
        if let Some(inner) = raw.strip_prefix('^').and_then(|rest| rest.strip_suffix('$')) {
            return NamePattern::Exact(inner.to_string());
        }
        if let Some(inner) = raw.strip_prefix('^') {
            return NamePattern::Prefix(inner.to_string());
        }
        if let Some(inner) = raw.strip_suffix('$') {
            return NamePattern::Suffix(inner.to_string());
        }
        if raw == "*" {
            return NamePattern::Contains(String::new());
        }
        if let Some(inner) = raw.strip_prefix('*').and_then(|rest| rest.strip_suffix('*')) {
            return NamePattern::Contains(inner.to_string());
        }
        NamePattern::Bare(raw.to_string())
    }

    /// Tests `name` against this pattern.
    ///
    /// For files `name` is the stem (extension stripped); for folders it is
    /// the raw directory name.
    pub fn matches(&self, name: &str, kind: EntryKind, case: CaseSensitivity) -> bool {
        let (name, text) = match case {
            CaseSensitivity::Sensitive => (name.to_string(), self.text().to_string()),
            CaseSensitivity::Insensitive => (name.to_lowercase(), self.text().to_lowercase()),
        };

        match self {
            NamePattern::Exact(_) => name == text,
            NamePattern::Prefix(_) => name.starts_with(&text),
            NamePattern::Suffix(_) => name.ends_with(&text),
            NamePattern::Contains(_) => name.contains(&text),
            NamePattern::Bare(_) => match kind {
                EntryKind::File => name.ends_with(&text),
                EntryKind::Folder => name == text || name.ends_with(&text),
            },
        }
    }

    /// The literal text with anchors removed.
    pub fn text(&self) -> &str {
        match self {
            NamePattern::Exact(t)
            | NamePattern::Prefix(t)
            | NamePattern::Suffix(t)
            | NamePattern::Contains(t)
            | NamePattern::Bare(t) => t,
        }
    }

    /// Human-readable description used in the configuration summary.
    pub fn describe(&self, kind: EntryKind) -> String {
        match self {
            NamePattern::Exact(t) => format!("equals '{t}'"),
            NamePattern::Prefix(t) => format!("starts with '{t}'"),
            NamePattern::Suffix(t) => format!("ends with '{t}'"),
            NamePattern::Contains(t) => format!("contains '{t}'"),
            NamePattern::Bare(t) => match kind {
                EntryKind::File => format!("ends with '{t}'"),
                EntryKind::Folder => format!("equals or ends with '{t}'"),
            },
        }
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamePattern::Exact(t) => write!(f, "^{t}$"),
            NamePattern::Prefix(t) => write!(f, "^{t}"),
            NamePattern::Suffix(t) => write!(f, "{t}$"),
            NamePattern::Contains(t) => write!(f, "*{t}*"),
            NamePattern::Bare(t) => write!(f, "{t}"),
        }
    }
}

/// Matches one raw pattern against one name with case-sensitive comparison.
pub fn matches(pattern: &str, name: &str, kind: EntryKind) -> bool {
    NamePattern::parse(pattern).matches(name, kind, CaseSensitivity::Sensitive)
}
