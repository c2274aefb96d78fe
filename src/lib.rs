//! # jsym
//!
//! Scope-aware symbol tables for Java-like static analysis, with symbol
//! information for compiled dependencies read straight from class files.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! analysis    → Run driver: config, stub cache, diagnostics, parallel files
//!   ↓
//! table       → ShadowGroup, SymbolTable, table-chain builder
//!   ↓
//! bytecode    → Class-file parser, stub builder, classpath, stub cache
//!   ↓
//! ast         → Scope tree handed over by the parser
//!   ↓
//! symbols     → Type, variable and method symbols, symbolic values
//!   ↓
//! base        → Primitives (FileId, NodeId, TextRange, name conversions)
//! ```
//!
//! The crate logs through `tracing` and never installs a subscriber.

/// Foundation types: ids, text ranges, name conversions
pub mod base;

/// Symbols and compile-time constant values
pub mod symbols;

/// Scope tree input
pub mod ast;

/// Class-file reading and stub caching
pub mod bytecode;

/// Scoped name lookup
pub mod table;

/// Run configuration
pub mod config;

/// Run-level diagnostics
pub mod diagnostics;

mod analysis;

pub use analysis::Analysis;
pub use ast::{CompilationUnit, Decl, ImportDecl, MethodDecl, ScopeKind, ScopeNode, TypeDecl, TypeHeader, VariableDecl};
pub use base::{DefId, FileId, NodeId, TextRange, TextSize};
pub use bytecode::{ClassBytesProvider, ClassStub, StubCache, StubError};
pub use config::{AnalysisConfig, ConfigError};
pub use diagnostics::{Diagnostic, RunDiagnostics, Severity};
pub use symbols::{
    JElementSymbol, JMethodSymbol, JTypeSymbol, JVariableSymbol, Modifiers, SymbolOrigin, SymbolicValue, TypeKind,
    VariableKind,
};
pub use table::{FrameKind, ResolveResult, ScopeTables, ShadowGroup, SymbolTable, TableBuilder};
