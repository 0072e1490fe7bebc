//! Parse Diagnostics
//!
//! Every warning the parser raises goes to `tracing` and is also kept in a
//! [`Diagnostics`] list, so callers can inspect what went wrong without a
//! subscriber installed.

use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// A single diagnostic message with its source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub source: String,
    pub line: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {} at {}:{}", label, self.message, self.source, self.line)
    }
}

/// Collected diagnostics for one parse
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and emit a warning
    pub fn warn(&mut self, source: &str, line: u32, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(source, line, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message,
            source: source.to_string(),
            line,
        });
    }

    /// Record and emit an error
    pub fn error(&mut self, source: &str, line: u32, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(source, line, "{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            message,
            source: source.to_string(),
            line,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether any recorded message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|d| d.message.contains(needle))
    }

    /// Move every entry of `other` into this list
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}
