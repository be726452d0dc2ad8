use std::fmt;

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// Data-quality issue found while reconciling a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Declared counts disagree between datasets.
    CountMismatch,
    /// A stream ran out before the required number of draws.
    InsufficientResidue,
    /// Building-level residues cancel out at zone level.
    MisplacedLandRole,
    /// Entrances point to a building absent from the building data.
    MissingBuilding,
}

/// One reported issue, displayed as `"<id>: <message>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub subject: String,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Accumulates diagnostics, logging each one as it arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self { Self::default() }

    pub fn warn(&mut self, subject: &str, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(subject, ?kind, "{message}");
        self.entries.push(Diagnostic { subject: subject.to_string(), kind, severity: Severity::Warning, message });
    }

    pub fn error(&mut self, subject: &str, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        error!(subject, ?kind, "{message}");
        self.entries.push(Diagnostic { subject: subject.to_string(), kind, severity: Severity::Error, message });
    }

    /// Append another sink's entries, already logged, after this one's.
    pub fn merge(&mut self, other: Diagnostics) { self.entries.extend(other.entries) }

    #[inline] pub fn entries(&self) -> &[Diagnostic] { &self.entries }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|entry| entry.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|entry| entry.severity == Severity::Error)
    }

    #[inline] pub fn error_count(&self) -> usize { self.errors().count() }
}
