//! Scoped name lookup.
//!
//! - [`ShadowGroup`] - Persistent chain of frames for one namespace
//! - [`SymbolTable`] - The three namespaces of one scope
//! - [`TableBuilder`] - Builds the tables of a compilation unit

mod builder;
mod shadow;
mod symbol_table;

pub use builder::{ScopeEntry, ScopeTables, TableBuilder};
pub use shadow::{FrameKind, NameResolver, ResolveAll, ResolveResult, ShadowGroup, SymbolMap};
pub use symbol_table::SymbolTable;
