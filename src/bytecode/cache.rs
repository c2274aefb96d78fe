//! Run-scoped cache of class stubs.
//!
//! Stubs are built on first request and kept for the rest of the run.
//! Workers never hold the lock while reading or parsing class bytes: two
//! threads asking for the same class at once may both build it, the first
//! to commit wins and the loser adopts the committed entry. Missing and
//! failed names are cached too, so every caller sees the same answer.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::classpath::ClassBytesProvider;
use super::error::StubError;
use super::stub::ClassStub;
use crate::base::{binary_to_internal, internal_to_binary};
use crate::diagnostics::{Diagnostic, RunDiagnostics, codes};

/// The cached outcome for one internal name.
#[derive(Clone, Debug)]
pub enum StubEntry {
    Resolved(Arc<ClassStub>),
    /// No provider has bytes for the name.
    Missing,
    /// The bytes exist but no stub could be built from them.
    Failed(Arc<StubError>),
}

impl StubEntry {
    pub fn stub(&self) -> Option<Arc<ClassStub>> {
        match self {
            StubEntry::Resolved(stub) => Some(stub.clone()),
            StubEntry::Missing | StubEntry::Failed(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, StubEntry::Resolved(_))
    }
}

pub struct StubCache {
    classpath: Arc<dyn ClassBytesProvider>,
    entries: RwLock<FxHashMap<SmolStr, StubEntry>>,
    diagnostics: Arc<RunDiagnostics>,
    panic_on_internal_error: bool,
}

impl std::fmt::Debug for StubCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubCache")
            .field("entries", &self.entries.read().len())
            .field("panic_on_internal_error", &self.panic_on_internal_error)
            .finish_non_exhaustive()
    }
}

impl StubCache {
    pub fn new(classpath: Arc<dyn ClassBytesProvider>, diagnostics: Arc<RunDiagnostics>) -> Self {
        Self {
            classpath,
            entries: RwLock::new(FxHashMap::default()),
            diagnostics,
            panic_on_internal_error: false,
        }
    }

    pub fn with_panic_on_internal_error(mut self, panic: bool) -> Self {
        self.panic_on_internal_error = panic;
        self
    }

    pub fn diagnostics(&self) -> &Arc<RunDiagnostics> {
        &self.diagnostics
    }

    /// The stub of the class with the given internal name
    /// (`java/util/Map$Entry`).
    pub fn get(&self, internal_name: &str) -> Option<Arc<ClassStub>> {
        self.entry(internal_name).stub()
    }

    /// Like [`get`](Self::get), taking a binary name (`java.util.Map$Entry`).
    pub fn get_binary(&self, binary_name: &str) -> Option<Arc<ClassStub>> {
        self.get(&binary_to_internal(binary_name))
    }

    /// Looks up a dotted source name whose nesting is not known
    /// (`java.util.Map.Entry`). Tries the plain package path first, then
    /// treats trailing segments as member classes one at a time.
    pub fn resolve_dotted(&self, dotted: &str) -> Option<Arc<ClassStub>> {
        let mut candidate = binary_to_internal(dotted).to_string();
        loop {
            if let Some(stub) = self.get(&candidate) {
                return Some(stub);
            }
            let slash = candidate.rfind('/')?;
            candidate.replace_range(slash..=slash, "$");
        }
    }

    /// The cached entry for a name, building it on first request.
    pub fn entry(&self, internal_name: &str) -> StubEntry {
        if let Some(entry) = self.entries.read().get(internal_name) {
            return entry.clone();
        }
        tracing::trace!(class = internal_name, "stub cache miss");

        let built = self.build(internal_name);
        let (entry, committed) = {
            let mut entries = self.entries.write();
            match entries.entry(SmolStr::new(internal_name)) {
                Entry::Occupied(existing) => (existing.get().clone(), false),
                Entry::Vacant(slot) => (slot.insert(built).clone(), true),
            }
        };
        if committed {
            self.report(internal_name, &entry);
        }
        entry
    }

    fn build(&self, internal_name: &str) -> StubEntry {
        let bytes = match self.classpath.class_bytes(internal_name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return StubEntry::Missing,
            Err(e) => return StubEntry::Failed(Arc::new(e.into())),
        };
        match ClassStub::from_bytes(&bytes) {
            Ok(stub) if stub.internal_name != internal_name => {
                StubEntry::Failed(Arc::new(StubError::NameMismatch {
                    expected: internal_name.into(),
                    found: stub.internal_name,
                }))
            }
            Ok(stub) => StubEntry::Resolved(Arc::new(stub)),
            Err(e) => StubEntry::Failed(Arc::new(e)),
        }
    }

    /// Logs and records the outcome of a newly committed entry.
    fn report(&self, internal_name: &str, entry: &StubEntry) {
        let binary_name = internal_to_binary(internal_name);
        match entry {
            StubEntry::Resolved(stub) => {
                tracing::debug!(class = %binary_name, methods = stub.methods.len(), "committed class stub");
            }
            StubEntry::Missing => {
                tracing::trace!(class = %binary_name, "class not on classpath");
            }
            StubEntry::Failed(err) if err.is_internal() => {
                tracing::error!(class = %binary_name, error = %err, "stub extraction broke an invariant");
                if self.panic_on_internal_error {
                    panic!("internal consistency violation while reading {binary_name}: {err}");
                }
                self.diagnostics
                    .add(Diagnostic::error(binary_name.as_str(), err.to_string()).with_code(codes::INTERNAL_ERROR));
            }
            StubEntry::Failed(err) => {
                tracing::warn!(class = %binary_name, error = %err, "cannot build class stub");
                let code = match **err {
                    StubError::UnsupportedVersion { .. } => codes::UNSUPPORTED_CLASS_VERSION,
                    StubError::NameMismatch { .. } => codes::CLASS_NAME_MISMATCH,
                    StubError::Classpath(_) => codes::CLASSPATH_IO,
                    _ => codes::MALFORMED_CLASS,
                };
                self.diagnostics
                    .add(Diagnostic::error(binary_name.as_str(), err.to_string()).with_code(code));
            }
        }
    }

    /// Number of names looked up so far.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names whose stubs could not be built, with the reason.
    pub fn failures(&self) -> Vec<(SmolStr, Arc<StubError>)> {
        let mut failures: Vec<_> = self
            .entries
            .read()
            .iter()
            .filter_map(|(name, entry)| match entry {
                StubEntry::Failed(err) => Some((name.clone(), err.clone())),
                _ => None,
            })
            .collect();
        failures.sort_by(|a, b| a.0.cmp(&b.0));
        failures
    }
}
