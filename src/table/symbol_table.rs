//! Per-scope symbol tables.

use std::fmt;
use std::sync::Arc;

use super::shadow::{ResolveAll, ResolveResult, ShadowGroup};
use crate::symbols::{MethodSym, TypeSym, VariableSym};

/// The names visible in one region of a program.
///
/// A table is three independent namespaces (types, variables, methods) and
/// a link to the lexically enclosing table. A type and a variable may share
/// a simple name without conflict.
///
/// Tables are immutable. Building a child table that only changes one
/// namespace reuses the parent's other two groups without copying them.
#[derive(Clone)]
pub struct SymbolTable {
    inner: Arc<TableInner>,
}

struct TableInner {
    variables: ShadowGroup<VariableSym>,
    types: ShadowGroup<TypeSym>,
    methods: ShadowGroup<MethodSym>,
    parent: Option<SymbolTable>,
}

impl SymbolTable {
    /// The top-level table: every namespace is the root sentinel.
    pub fn empty() -> Self {
        Self::from_parts(None, ShadowGroup::empty(), ShadowGroup::empty(), ShadowGroup::empty())
    }

    pub fn new(
        parent: &SymbolTable,
        variables: ShadowGroup<VariableSym>,
        types: ShadowGroup<TypeSym>,
        methods: ShadowGroup<MethodSym>,
    ) -> Self {
        Self::from_parts(Some(parent.clone()), variables, types, methods)
    }

    fn from_parts(
        parent: Option<SymbolTable>,
        variables: ShadowGroup<VariableSym>,
        types: ShadowGroup<TypeSym>,
        methods: ShadowGroup<MethodSym>,
    ) -> Self {
        Self {
            inner: Arc::new(TableInner {
                variables,
                types,
                methods,
                parent,
            }),
        }
    }

    /// A child of `parent` with new variables and the parent's types and
    /// methods.
    pub fn with_variables(parent: &SymbolTable, variables: ShadowGroup<VariableSym>) -> Self {
        Self::new(parent, variables, parent.types().clone(), parent.methods().clone())
    }

    pub fn with_types(parent: &SymbolTable, types: ShadowGroup<TypeSym>) -> Self {
        Self::new(parent, parent.variables().clone(), types, parent.methods().clone())
    }

    pub fn with_methods(parent: &SymbolTable, methods: ShadowGroup<MethodSym>) -> Self {
        Self::new(parent, parent.variables().clone(), parent.types().clone(), methods)
    }

    pub fn variables(&self) -> &ShadowGroup<VariableSym> {
        &self.inner.variables
    }

    pub fn types(&self) -> &ShadowGroup<TypeSym> {
        &self.inner.types
    }

    pub fn methods(&self) -> &ShadowGroup<MethodSym> {
        &self.inner.methods
    }

    /// The lexically enclosing table, `None` for the top-level table.
    pub fn parent(&self) -> Option<&SymbolTable> {
        self.inner.parent.as_ref()
    }

    pub fn ptr_eq(&self, other: &SymbolTable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The type a simple type name refers to here.
    pub fn resolve_type_name(&self, simple_name: &str) -> Option<ResolveResult<TypeSym>> {
        self.inner.types.resolve_first(simple_name)
    }

    /// The variable a simple expression name refers to here.
    pub fn resolve_value_name(&self, simple_name: &str) -> Option<ResolveResult<VariableSym>> {
        self.inner.variables.resolve_first(simple_name)
    }

    /// Every method callable by this simple name on an implicit receiver.
    ///
    /// Candidates may differ in arity and parameter types; callers select
    /// the applicable ones.
    pub fn resolve_method_name<'a>(&'a self, simple_name: &'a str) -> ResolveAll<'a, MethodSym> {
        self.inner.methods.resolve_all(simple_name)
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("variables", &self.inner.variables)
            .field("types", &self.inner.types)
            .field("methods", &self.inner.methods)
            .finish()
    }
}
