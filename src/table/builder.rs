//! Builds the symbol tables of one compilation unit.
//!
//! The scope tree is walked top-down. Every scope gets exactly one table,
//! whose parent is the table of the enclosing scope. Frames are pushed
//! outermost first, so in each namespace the innermost declaration wins:
//!
//! ```text
//! CompilationUnit  types:     OnDemandImport < SamePackage < SingleTypeImport < FileTypes
//!                  variables: StaticOnDemandImport < SingleStaticImport
//!                  methods:   StaticOnDemandImport < SingleStaticImport
//! TypeBody         Inherited (farthest supertypes outermost) < TypeParameters < Members
//! MethodBody       TypeParameters, Formals
//! Lambda           Formals
//! Block, catch, for Locals
//! ```
//!
//! Names that live outside the file (imports, the current package,
//! supertypes from the classpath) come from the [`StubCache`].

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::shadow::{FrameKind, NameResolver, SymbolMap};
use super::symbol_table::SymbolTable;
use crate::ast::{CompilationUnit, Decl, ScopeKind, ScopeNode, TypeHeader};
use crate::base::{DefId, FileId, FrameId, NodeId, TextRange, TextSize, binary_to_internal, simple_name_of};
use crate::bytecode::{ClassStub, StubCache};
use crate::config::AnalysisConfig;
use crate::diagnostics::{Diagnostic, codes};
use crate::symbols::{
    JMethodSymbol, JTypeSymbol, JVariableSymbol, MethodSym, Modifiers, SymbolOrigin, TypeKind, TypeRef,
    TypeSym, VariableSym,
};

// ============================================================================
// SCOPE TABLES
// ============================================================================

/// The table of one scope node.
#[derive(Clone, Debug)]
pub struct ScopeEntry {
    pub node: NodeId,
    pub range: TextRange,
    /// Nesting depth; the compilation unit is 0.
    pub depth: usize,
    pub table: SymbolTable,
}

/// Every table built for one file, addressable by node and by offset.
#[derive(Clone, Debug)]
pub struct ScopeTables {
    file: FileId,
    /// Pre-order; the compilation unit comes first.
    entries: Vec<ScopeEntry>,
    by_node: FxHashMap<NodeId, usize>,
}

impl ScopeTables {
    pub fn file(&self) -> FileId {
        self.file
    }

    /// The table of the compilation unit.
    pub fn root(&self) -> &SymbolTable {
        &self.entries[0].table
    }

    pub fn get(&self, node: NodeId) -> Option<&SymbolTable> {
        self.by_node.get(&node).map(|&i| &self.entries[i].table)
    }

    /// The table of the innermost scope whose range contains `offset`.
    ///
    /// Ranges are end-exclusive, so an offset where one sibling ends and
    /// the next begins belongs to the later sibling only.
    pub fn table_at(&self, offset: TextSize) -> Option<&SymbolTable> {
        self.entries
            .iter()
            .filter(|e| e.range.contains(offset))
            .max_by_key(|e| e.depth)
            .map(|e| &e.table)
    }

    /// Import frames of the compilation unit, in every namespace.
    pub fn import_frames(&self) -> Vec<(FrameId, FrameKind)> {
        let root = self.root();
        root.types()
            .frames()
            .chain(root.variables().frames())
            .chain(root.methods().frames())
            .filter(|(_, kind)| kind.is_import())
            .collect()
    }

    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// LAZY FRAMES
// ============================================================================

/// Types of on-demand imported packages (`import java.util.*;`); also the
/// member types of on-demand imported classes (`import java.util.Map.*;`).
struct OnDemandTypes {
    stubs: Arc<StubCache>,
    targets: Vec<SmolStr>,
}

impl OnDemandTypes {
    fn lookup(&self, target: &str, name: &str) -> Option<TypeSym> {
        let internal = format!("{}/{}", binary_to_internal(target), name);
        if let Some(stub) = self.stubs.get(&internal) {
            return Some(stub.symbol().clone());
        }
        let owner = self.stubs.resolve_dotted(target)?;
        let member = owner.member_type(name)?;
        self.stubs.get_binary(&member.binary_name).map(|s| s.symbol().clone())
    }
}

impl NameResolver<TypeSym> for OnDemandTypes {
    fn resolve_here(&self, name: &str) -> Cow<'_, [TypeSym]> {
        if !is_simple_name(name) {
            return Cow::Borrowed(&[]);
        }
        Cow::Owned(self.targets.iter().filter_map(|t| self.lookup(t, name)).collect())
    }

    fn is_definitely_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Top-level types of one package.
struct PackageTypes {
    stubs: Arc<StubCache>,
    /// Internal package prefix, empty for the unnamed package.
    package: SmolStr,
}

impl NameResolver<TypeSym> for PackageTypes {
    fn resolve_here(&self, name: &str) -> Cow<'_, [TypeSym]> {
        if !is_simple_name(name) {
            return Cow::Borrowed(&[]);
        }
        let internal = if self.package.is_empty() {
            SmolStr::new(name)
        } else {
            SmolStr::from(format!("{}/{}", self.package, name))
        };
        match self.stubs.get(&internal) {
            Some(stub) => Cow::Owned(vec![stub.symbol().clone()]),
            None => Cow::Borrowed(&[]),
        }
    }
}

/// A class named by a static import, with the supertypes its static
/// members may come from, nearest first.
struct StaticOwner {
    chain: Vec<Arc<ClassStub>>,
}

impl StaticOwner {
    /// Static fields named `name`. The nearest class declaring one hides
    /// the farther ones.
    fn fields(&self, name: &str) -> Vec<VariableSym> {
        self.chain
            .iter()
            .map(|stub| {
                stub.inheritable_fields()
                    .filter(|f| f.name == name && f.modifiers().contains(Modifiers::STATIC))
                    .map(|f| f.symbol().clone())
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// Static methods named `name`, leaving out the ones hidden by a nearer
    /// method with the same parameter types.
    fn methods(&self, name: &str) -> Vec<MethodSym> {
        let mut seen: FxHashSet<Vec<TypeRef>> = FxHashSet::default();
        let mut found = Vec::new();
        for (i, stub) in self.chain.iter().enumerate() {
            // an interface's static methods belong to that interface alone
            if i > 0 && !inherits_static_methods(stub.kind) {
                continue;
            }
            let statics = stub
                .inheritable_methods()
                .filter(|m| m.name == name && m.modifiers().contains(Modifiers::STATIC));
            for m in statics {
                if seen.insert(m.symbol().parameter_types.clone()) {
                    found.push(m.symbol().clone());
                }
            }
        }
        found
    }
}

/// Static members of the classes named by `import static p.C.*;`.
struct StaticMembers {
    owners: Arc<[StaticOwner]>,
}

impl NameResolver<VariableSym> for StaticMembers {
    fn resolve_here(&self, name: &str) -> Cow<'_, [VariableSym]> {
        Cow::Owned(self.owners.iter().flat_map(|o| o.fields(name)).collect())
    }

    fn is_definitely_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl NameResolver<MethodSym> for StaticMembers {
    fn resolve_here(&self, name: &str) -> Cow<'_, [MethodSym]> {
        Cow::Owned(self.owners.iter().flat_map(|o| o.methods(name)).collect())
    }

    fn is_definitely_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Whether subtypes inherit the static methods of a type of this kind.
fn inherits_static_methods(kind: TypeKind) -> bool {
    !matches!(kind, TypeKind::Interface | TypeKind::Annotation)
}

fn is_simple_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['.', '/'])
}

// ============================================================================
// DECLARATIONS
// ============================================================================

/// Symbols introduced by one scope, in source order.
#[derive(Debug, Default)]
struct Declared {
    types: Vec<TypeSym>,
    type_parameters: Vec<TypeSym>,
    variables: Vec<VariableSym>,
    methods: Vec<MethodSym>,
}

impl Declared {
    fn of(file: FileId, decls: &[Decl], declaring_type: &str) -> Self {
        let mut declared = Declared::default();
        for decl in decls {
            let def = DefId::new(file, decl.node());
            match decl {
                Decl::Type(t) => {
                    let sym = Arc::new(JTypeSymbol::source(def, t.binary_name.clone(), t.kind, t.modifiers));
                    if t.kind == TypeKind::TypeParameter {
                        declared.type_parameters.push(sym);
                    } else {
                        declared.types.push(sym);
                    }
                }
                Decl::Variable(v) => declared.variables.push(Arc::new(JVariableSymbol::source(
                    def,
                    v.name.clone(),
                    v.kind,
                    v.modifiers,
                    v.type_name.as_ref().map(|t| TypeRef::new(t.clone())),
                ))),
                Decl::Method(m) => declared.methods.push(Arc::new(JMethodSymbol::source(
                    def,
                    m.name.clone(),
                    declaring_type,
                    m.modifiers,
                    m.parameter_types.iter().map(|p| TypeRef::new(p.clone())).collect(),
                    m.return_type.as_ref().map(|r| TypeRef::new(r.clone())),
                ))),
            }
        }
        declared
    }
}

fn bind_types(types: &[TypeSym]) -> SymbolMap<TypeSym> {
    types.iter().map(|t| (t.name.clone(), t.clone())).collect()
}

fn bind_variables(variables: &[VariableSym]) -> SymbolMap<VariableSym> {
    variables.iter().map(|v| (v.name.clone(), v.clone())).collect()
}

/// Constructors are not invocable by simple name and are left out.
fn bind_methods(methods: &[MethodSym]) -> SymbolMap<MethodSym> {
    methods
        .iter()
        .filter(|m| !m.is_constructor())
        .map(|m| (m.name.clone(), m.clone()))
        .collect()
}

/// Parameter types, as binary names, of the methods declared nearer to the
/// type being built, by method name.
#[derive(Debug, Default)]
struct Overridden(FxHashMap<SmolStr, Vec<Vec<TypeRef>>>);

impl Overridden {
    fn insert(&mut self, name: SmolStr, parameters: Vec<TypeRef>) {
        self.0.entry(name).or_default().push(parameters);
    }

    fn contains(&self, name: &str, parameters: &[TypeRef]) -> bool {
        self.0
            .get(name)
            .is_some_and(|known| known.iter().any(|k| same_parameters(k, parameters)))
    }
}

fn same_parameters(a: &[TypeRef], b: &[TypeRef]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_parameter_type(a, b))
}

/// A source type that could not be resolved keeps its simple name, and
/// matches any type with that simple name.
fn same_parameter_type(a: &TypeRef, b: &TypeRef) -> bool {
    if a == b {
        return true;
    }
    if a.array_dimensions() != b.array_dimensions() {
        return false;
    }
    let (a, b) = (a.element_name(), b.element_name());
    (is_simple_name(a) && a == simple_name_of(b)) || (is_simple_name(b) && b == simple_name_of(a))
}

/// Splits a written type into its erased element name and its array
/// dimensions: `List<String>[]` is `("List", 1)`, `String...` is
/// `("String", 1)`.
fn erase_written_type(written: &str) -> (SmolStr, usize) {
    let mut depth = 0usize;
    let mut plain = String::with_capacity(written.len());
    for c in written.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if depth == 0 && !c.is_whitespace() => plain.push(c),
            _ => {}
        }
    }
    let mut dimensions = 0;
    if plain.ends_with("...") {
        plain.truncate(plain.len() - 3);
        dimensions += 1;
    }
    while plain.ends_with("[]") {
        plain.truncate(plain.len() - 2);
        dimensions += 1;
    }
    (SmolStr::from(plain), dimensions)
}

fn is_primitive_name(name: &str) -> bool {
    matches!(
        name,
        "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double"
    )
}

/// Per-file state shared by the whole walk.
struct FileCx<'u> {
    unit: &'u CompilationUnit,
    declared: FxHashMap<NodeId, Declared>,
    /// Type bodies of this file by binary name.
    type_bodies: FxHashMap<SmolStr, (NodeId, &'u TypeHeader)>,
    /// Kinds of the types declared in this file.
    type_kinds: FxHashMap<SmolStr, TypeKind>,
}

impl<'u> FileCx<'u> {
    fn new(unit: &'u CompilationUnit) -> Self {
        let mut cx = FileCx {
            unit,
            declared: FxHashMap::default(),
            type_bodies: FxHashMap::default(),
            type_kinds: FxHashMap::default(),
        };
        cx.index(&unit.root, "");
        cx
    }

    fn index(&mut self, node: &'u ScopeNode, enclosing_type: &'u str) {
        let declaring_type = match &node.kind {
            ScopeKind::TypeBody(header) => {
                self.type_bodies.insert(header.binary_name.clone(), (node.id, header));
                header.binary_name.as_str()
            }
            _ => enclosing_type,
        };
        for decl in &node.decls {
            if let Decl::Type(t) = decl {
                self.type_kinds.insert(t.binary_name.clone(), t.kind);
            }
        }
        self.declared
            .insert(node.id, Declared::of(self.unit.file, &node.decls, declaring_type));
        for child in &node.children {
            self.index(child, declaring_type);
        }
    }
}

enum Supertype<'u> {
    Stub(Arc<ClassStub>),
    Source { node: NodeId, header: &'u TypeHeader },
}

impl Supertype<'_> {
    fn binary_name(&self) -> SmolStr {
        match self {
            Supertype::Stub(stub) => stub.binary_name.clone(),
            Supertype::Source { header, .. } => header.binary_name.clone(),
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds [`ScopeTables`] for compilation units.
pub struct TableBuilder<'a> {
    stubs: Arc<StubCache>,
    config: &'a AnalysisConfig,
}

impl<'a> TableBuilder<'a> {
    pub fn new(stubs: &Arc<StubCache>, config: &'a AnalysisConfig) -> Self {
        Self {
            stubs: stubs.clone(),
            config,
        }
    }

    pub fn build(&self, unit: &CompilationUnit) -> ScopeTables {
        let cx = FileCx::new(unit);
        let mut entries = Vec::new();
        self.build_scope(&cx, &unit.root, &SymbolTable::empty(), 0, &mut entries);

        let by_node = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.node, i))
            .collect();
        tracing::debug!(file = %unit.file, scopes = entries.len(), "built scope tables");
        ScopeTables {
            file: unit.file,
            entries,
            by_node,
        }
    }

    fn build_scope(
        &self,
        cx: &FileCx<'_>,
        node: &ScopeNode,
        parent: &SymbolTable,
        depth: usize,
        out: &mut Vec<ScopeEntry>,
    ) {
        let table = self.scope_table(cx, node, parent);
        out.push(ScopeEntry {
            node: node.id,
            range: node.range,
            depth,
            table: table.clone(),
        });
        for child in &node.children {
            self.build_scope(cx, child, &table, depth + 1, out);
        }
    }

    fn scope_table(&self, cx: &FileCx<'_>, node: &ScopeNode, parent: &SymbolTable) -> SymbolTable {
        let empty = Declared::default();
        let declared = cx.declared.get(&node.id).unwrap_or(&empty);
        match &node.kind {
            ScopeKind::CompilationUnit => self.unit_table(cx, declared, parent),
            ScopeKind::TypeBody(header) => self.type_body_table(cx, header, declared, parent),
            ScopeKind::MethodBody | ScopeKind::Lambda => SymbolTable::new(
                parent,
                parent
                    .variables()
                    .push(FrameKind::Formals, bind_variables(&declared.variables)),
                parent
                    .types()
                    .push(FrameKind::TypeParameters, bind_types(&declared.type_parameters))
                    .push(FrameKind::Locals, bind_types(&declared.types)),
                parent.methods().clone(),
            ),
            ScopeKind::Block | ScopeKind::CatchClause | ScopeKind::ForHeader => SymbolTable::new(
                parent,
                parent
                    .variables()
                    .push(FrameKind::Locals, bind_variables(&declared.variables)),
                parent.types().push(FrameKind::Locals, bind_types(&declared.types)),
                parent.methods().clone(),
            ),
        }
    }

    fn unit_table(&self, cx: &FileCx<'_>, declared: &Declared, parent: &SymbolTable) -> SymbolTable {
        let unit = cx.unit;
        let mut on_demand: IndexSet<SmolStr, FxBuildHasher> =
            self.config.implicit_imports.iter().cloned().collect();
        let mut single_types = SymbolMap::new();
        let mut static_owners = Vec::new();
        let mut single_static_fields = SymbolMap::new();
        let mut single_static_methods = SymbolMap::new();

        for import in &unit.imports {
            match (import.is_static, import.on_demand) {
                (false, true) => {
                    on_demand.insert(import.name.clone());
                }
                (false, false) => {
                    let sym = match self.stubs.resolve_dotted(&import.name) {
                        Some(stub) => stub.symbol().clone(),
                        None => {
                            self.unresolved_import(unit.file, &import.name);
                            Arc::new(JTypeSymbol::unresolved(import.name.clone()))
                        }
                    };
                    single_types.insert(import.simple_name(), sym);
                }
                (true, true) => match self.stubs.resolve_dotted(&import.name) {
                    Some(owner) => static_owners.push(self.static_owner(owner)),
                    None => self.unresolved_import(unit.file, &import.name),
                },
                (true, false) => {
                    let Some(owner) = self.stubs.resolve_dotted(import.qualifier()) else {
                        self.unresolved_import(unit.file, import.qualifier());
                        continue;
                    };
                    let owner = self.static_owner(owner);
                    let name = import.simple_name();
                    for f in owner.fields(name) {
                        single_static_fields.insert(name, f);
                    }
                    for m in owner.methods(name) {
                        single_static_methods.insert(name, m);
                    }
                }
            }
        }

        let package = unit
            .package
            .as_deref()
            .map(binary_to_internal)
            .unwrap_or_default();
        let types = parent
            .types()
            .push(
                FrameKind::OnDemandImport,
                OnDemandTypes {
                    stubs: self.stubs.clone(),
                    targets: on_demand.into_iter().collect(),
                },
            )
            .push(
                FrameKind::SamePackage,
                PackageTypes {
                    stubs: self.stubs.clone(),
                    package,
                },
            )
            .push(FrameKind::SingleTypeImport, single_types)
            .push(FrameKind::FileTypes, bind_types(&declared.types));

        let static_owners: Arc<[StaticOwner]> = static_owners.into();
        let variables = parent
            .variables()
            .push(
                FrameKind::StaticOnDemandImport,
                StaticMembers {
                    owners: static_owners.clone(),
                },
            )
            .push(FrameKind::SingleStaticImport, single_static_fields);
        let methods = parent
            .methods()
            .push(FrameKind::StaticOnDemandImport, StaticMembers { owners: static_owners })
            .push(FrameKind::SingleStaticImport, single_static_methods);

        SymbolTable::new(parent, variables, types, methods)
    }

    /// `owner` and its supertypes on the classpath, breadth first, up to
    /// the configured depth.
    fn static_owner(&self, owner: Arc<ClassStub>) -> StaticOwner {
        let mut visited: FxHashSet<SmolStr> = FxHashSet::default();
        visited.insert(owner.binary_name.clone());
        let mut chain = vec![owner];
        let mut level_start = 0;
        for _ in 0..self.config.max_supertype_depth {
            let level_end = chain.len();
            let next: Vec<_> = chain[level_start..level_end]
                .iter()
                .flat_map(|stub| stub.supertypes())
                .filter(|name| visited.insert((*name).clone()))
                .filter_map(|name| self.stubs.get_binary(name))
                .collect();
            if next.is_empty() {
                break;
            }
            chain.extend(next);
            level_start = level_end;
        }
        StaticOwner { chain }
    }

    fn unresolved_import(&self, file: FileId, name: &str) {
        tracing::debug!(%file, import = name, "import not found on classpath");
        self.stubs.diagnostics().add(
            Diagnostic::warning(name, format!("cannot find `{name}` on the classpath"))
                .with_code(codes::UNRESOLVED_IMPORT)
                .with_file(file),
        );
    }

    fn type_body_table(
        &self,
        cx: &FileCx<'_>,
        header: &TypeHeader,
        declared: &Declared,
        parent: &SymbolTable,
    ) -> SymbolTable {
        let mut variables = parent.variables().clone();
        let mut types = parent.types().clone();
        let mut methods = parent.methods().clone();

        if self.config.load_inherited_members {
            // farthest supertypes outermost, so nearer ones hide them
            for level in self.inherited_levels(cx, header, declared, parent).iter().rev() {
                variables = variables.push(FrameKind::Inherited, bind_variables(&level.variables));
                types = types.push(FrameKind::Inherited, bind_types(&level.types));
                methods = methods.push(FrameKind::Inherited, bind_methods(&level.methods));
            }
        }

        let types = types
            .push(FrameKind::TypeParameters, bind_types(&declared.type_parameters))
            .push(FrameKind::Members, bind_types(&declared.types));
        let variables = variables.push(FrameKind::Members, bind_variables(&declared.variables));
        let methods = methods.push(FrameKind::Members, bind_methods(&declared.methods));
        SymbolTable::new(parent, variables, types, methods)
    }

    /// Inheritable members of all supertypes, one entry per distance from
    /// the declaring type (direct supertypes first). A method already
    /// declared by the type or a nearer supertype with the same parameter
    /// types is overridden and left out.
    fn inherited_levels<'u>(
        &self,
        cx: &FileCx<'u>,
        header: &TypeHeader,
        own: &Declared,
        scope: &SymbolTable,
    ) -> Vec<Declared> {
        let mut visited: FxHashSet<SmolStr> = FxHashSet::default();
        visited.insert(header.binary_name.clone());
        let mut overridden = Overridden::default();
        for m in &own.methods {
            overridden.insert(m.name.clone(), self.erased_parameters(m, scope));
        }

        let mut frontier = self.supertypes_of_source(cx, header, scope, &mut visited);
        let mut levels = Vec::new();
        while !frontier.is_empty() {
            if levels.len() == self.config.max_supertype_depth {
                tracing::warn!(class = %header.binary_name, depth = levels.len(), "supertype chain cut off");
                self.stubs.diagnostics().add(
                    Diagnostic::warning(
                        header.binary_name.as_str(),
                        format!("supertypes deeper than {} are ignored", self.config.max_supertype_depth),
                    )
                    .with_code(codes::SUPERTYPE_DEPTH_EXCEEDED)
                    .with_file(cx.unit.file),
                );
                break;
            }

            let mut level = Declared::default();
            let mut next = Vec::new();
            for supertype in &frontier {
                match supertype {
                    Supertype::Stub(stub) => {
                        self.collect_stub_members(stub, &overridden, &mut level);
                        for name in stub.supertypes() {
                            if visited.insert(name.clone()) {
                                match self.stubs.get_binary(name) {
                                    Some(s) => next.push(Supertype::Stub(s)),
                                    None => tracing::trace!(class = %name, "supertype not on classpath"),
                                }
                            }
                        }
                    }
                    Supertype::Source { node, header } => {
                        if let Some(declared) = cx.declared.get(node) {
                            let kind = cx.type_kinds.get(&header.binary_name).copied().unwrap_or(TypeKind::Class);
                            self.collect_source_members(declared, kind, scope, &overridden, &mut level);
                        }
                        next.extend(self.supertypes_of_source(cx, header, scope, &mut visited));
                    }
                }
            }
            for m in &level.methods {
                overridden.insert(m.name.clone(), self.erased_parameters(m, scope));
            }
            levels.push(level);
            frontier = next;
        }
        levels
    }

    fn supertypes_of_source<'u>(
        &self,
        cx: &FileCx<'u>,
        header: &TypeHeader,
        scope: &SymbolTable,
        visited: &mut FxHashSet<SmolStr>,
    ) -> Vec<Supertype<'u>> {
        header
            .supertypes()
            .filter_map(|written| self.resolve_supertype(cx, written, scope))
            .filter(|s| visited.insert(s.binary_name()))
            .collect()
    }

    /// Finds the declaration of a supertype named in source, in this file or
    /// on the classpath.
    fn resolve_supertype<'u>(&self, cx: &FileCx<'u>, written: &str, scope: &SymbolTable) -> Option<Supertype<'u>> {
        // type arguments do not matter for member lookup
        let name = written.split('<').next().unwrap_or(written).trim();
        if let Some(&(node, header)) = cx.type_bodies.get(name) {
            return Some(Supertype::Source { node, header });
        }
        if name.contains('.') {
            return self.stubs.resolve_dotted(name).map(Supertype::Stub);
        }
        let sym = scope.resolve_type_name(name)?.into_result();
        match &sym.origin {
            SymbolOrigin::Source(_) => cx
                .type_bodies
                .get(&sym.binary_name)
                .map(|&(node, header)| Supertype::Source { node, header }),
            SymbolOrigin::Stub { .. } => self.stubs.get_binary(&sym.binary_name).map(Supertype::Stub),
            SymbolOrigin::Unresolved(_) => None,
        }
    }

    /// Parameter types of `m` as binary names. Stub methods carry them
    /// already; types written in source are resolved in `scope`, and keep
    /// their written name when that fails.
    fn erased_parameters(&self, m: &JMethodSymbol, scope: &SymbolTable) -> Vec<TypeRef> {
        match m.origin {
            SymbolOrigin::Source(_) => m
                .parameter_types
                .iter()
                .map(|p| self.erase_source_type(p.binary_name(), scope))
                .collect(),
            _ => m.parameter_types.clone(),
        }
    }

    fn erase_source_type(&self, written: &str, scope: &SymbolTable) -> TypeRef {
        let (element, dimensions) = erase_written_type(written);
        let binary = if is_primitive_name(&element) {
            element
        } else if element.contains('.') {
            match self.stubs.resolve_dotted(&element) {
                Some(stub) => stub.binary_name.clone(),
                None => element,
            }
        } else {
            match scope.resolve_type_name(&element) {
                Some(found) if !found.result().is_unresolved() => found.result().binary_name.clone(),
                _ => element,
            }
        };
        if dimensions == 0 {
            TypeRef::new(binary)
        } else {
            TypeRef::new(format!("{binary}{}", "[]".repeat(dimensions)))
        }
    }

    fn collect_stub_members(&self, stub: &ClassStub, overridden: &Overridden, level: &mut Declared) {
        let statics = inherits_static_methods(stub.kind);
        level
            .variables
            .extend(stub.inheritable_fields().map(|f| f.symbol().clone()));
        level.methods.extend(
            stub.inheritable_methods()
                .map(|m| m.symbol().clone())
                .filter(|m| statics || !m.modifiers.contains(Modifiers::STATIC))
                .filter(|m| !overridden.contains(&m.name, &m.parameter_types)),
        );
        for member in stub.inheritable_member_types() {
            if let Some(s) = self.stubs.get_binary(&member.binary_name) {
                level.types.push(s.symbol().clone());
            }
        }
    }

    fn collect_source_members(
        &self,
        declared: &Declared,
        kind: TypeKind,
        scope: &SymbolTable,
        overridden: &Overridden,
        level: &mut Declared,
    ) {
        let visible = |m: Modifiers| !m.contains(Modifiers::PRIVATE);
        let statics = inherits_static_methods(kind);
        level
            .variables
            .extend(declared.variables.iter().filter(|v| visible(v.modifiers)).cloned());
        level.methods.extend(
            declared
                .methods
                .iter()
                .filter(|m| visible(m.modifiers) && !m.is_constructor())
                .filter(|m| statics || !m.modifiers.contains(Modifiers::STATIC))
                .filter(|m| !overridden.contains(&m.name, &self.erased_parameters(m, scope)))
                .cloned(),
        );
        level
            .types
            .extend(declared.types.iter().filter(|t| visible(t.modifiers)).cloned());
    }
}
