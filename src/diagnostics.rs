//! Diagnostics: problems met while building tables for a run.
//!
//! Diagnostics are attached to a *subject*: the binary name of a class
//! whose bytes could not be turned into a stub, or an imported name that
//! could not be found. They are collected once per run and deduplicated,
//! so a class referenced from a thousand files is reported once.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::base::FileId;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A diagnostic message about one subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Qualified name the diagnostic is about.
    pub subject: Arc<str>,
    /// The file whose analysis first ran into the problem, if any.
    pub file: Option<FileId>,
    /// Severity level.
    pub severity: Severity,
    /// Code from [`codes`].
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(subject: impl Into<Arc<str>>, message: impl Into<Arc<str>>) -> Self {
        Self {
            subject: subject.into(),
            file: None,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(subject: impl Into<Arc<str>>, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(subject, message)
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_file(mut self, file: FileId) -> Self {
        self.file = Some(file);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
pub mod codes {
    /// Class bytes could not be parsed.
    pub const MALFORMED_CLASS: &str = "E0101";
    /// Class file version below the oldest supported one.
    pub const UNSUPPORTED_CLASS_VERSION: &str = "E0102";
    /// Class file at a path declares a different class.
    pub const CLASS_NAME_MISMATCH: &str = "E0103";
    /// The classpath could not be read.
    pub const CLASSPATH_IO: &str = "E0104";
    /// The stub extractor broke one of its own invariants.
    pub const INTERNAL_ERROR: &str = "E0199";

    /// A single-type import names a class absent from the classpath.
    pub const UNRESOLVED_IMPORT: &str = "W0101";
    /// The supertype walk gave up at the configured depth.
    pub const SUPERTYPE_DEPTH_EXCEEDED: &str = "W0102";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

type DedupKey = (Option<Arc<str>>, Arc<str>);

#[derive(Debug, Default)]
struct Collected {
    seen: FxHashSet<DedupKey>,
    diagnostics: Vec<Diagnostic>,
}

/// Collects diagnostics for one run. Safe to share across worker threads.
#[derive(Debug, Default)]
pub struct RunDiagnostics {
    inner: Mutex<Collected>,
}

impl RunDiagnostics {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic. Returns `false` if one with the same code and
    /// subject was already recorded.
    pub fn add(&self, diagnostic: Diagnostic) -> bool {
        let mut inner = self.inner.lock();
        let key = (diagnostic.code.clone(), diagnostic.subject.clone());
        if !inner.seen.insert(key) {
            return false;
        }
        inner.diagnostics.push(diagnostic);
        true
    }

    /// All diagnostics, in the order they were first reported.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.inner.lock().diagnostics.clone()
    }

    /// Diagnostics about one subject.
    pub fn for_subject(&self, subject: &str) -> Vec<Diagnostic> {
        self.inner
            .lock()
            .diagnostics
            .iter()
            .filter(|d| &*d.subject == subject)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.inner
            .lock()
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Take all diagnostics, leaving the collector empty. Subjects already
    /// reported stay suppressed.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.inner.lock().diagnostics)
    }
}
