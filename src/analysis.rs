//! One analysis run over a set of compilation units.

use std::sync::Arc;

use rayon::prelude::*;

use crate::ast::CompilationUnit;
use crate::bytecode::{ClassBytesProvider, StubCache};
use crate::config::{AnalysisConfig, ConfigError};
use crate::diagnostics::RunDiagnostics;
use crate::table::{ScopeTables, TableBuilder};

/// Owns the state shared by every file of a run: the configuration, the
/// stub cache and the collected diagnostics.
///
/// Files are independent of each other, so [`analyze_files`](Self::analyze_files)
/// builds them on the rayon pool. Class stubs loaded for one file are
/// reused by all the others.
#[derive(Debug)]
pub struct Analysis {
    config: AnalysisConfig,
    stubs: Arc<StubCache>,
    diagnostics: Arc<RunDiagnostics>,
}

impl Analysis {
    pub fn new(config: AnalysisConfig, classpath: Arc<dyn ClassBytesProvider>) -> Result<Self, ConfigError> {
        config.validate()?;
        let diagnostics = Arc::new(RunDiagnostics::new());
        let stubs = StubCache::new(classpath, diagnostics.clone())
            .with_panic_on_internal_error(config.panic_on_internal_error);
        tracing::debug!(
            implicit_imports = config.implicit_imports.len(),
            inherited = config.load_inherited_members,
            "analysis run configured"
        );
        Ok(Self {
            config,
            stubs: Arc::new(stubs),
            diagnostics,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn stubs(&self) -> &Arc<StubCache> {
        &self.stubs
    }

    pub fn diagnostics(&self) -> &Arc<RunDiagnostics> {
        &self.diagnostics
    }

    pub fn build_tables(&self, unit: &CompilationUnit) -> ScopeTables {
        TableBuilder::new(&self.stubs, &self.config).build(unit)
    }

    /// Builds the tables of every unit in parallel. The result is in input
    /// order.
    pub fn analyze_files(&self, units: &[CompilationUnit]) -> Vec<ScopeTables> {
        let tables: Vec<_> = units.par_iter().map(|unit| self.build_tables(unit)).collect();
        tracing::info!(
            files = tables.len(),
            stubs = self.stubs.len(),
            diagnostics = self.diagnostics.len(),
            "analysis finished"
        );
        tables
    }
}
