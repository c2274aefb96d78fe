//! The scope tree handed over by the parser.
//!
//! Only what name resolution needs is modelled: nested scopes with their
//! source ranges and the declarations each scope introduces, in source
//! order. Expressions and statements are not represented.

use smol_str::SmolStr;

use crate::base::{FileId, NodeId, TextRange};
use crate::symbols::{Modifiers, TypeKind, VariableKind};

/// One parsed source file.
#[derive(Clone, Debug)]
pub struct CompilationUnit {
    pub file: FileId,
    /// Dotted package name; `None` for the unnamed package.
    pub package: Option<SmolStr>,
    pub imports: Vec<ImportDecl>,
    /// The scope of kind [`ScopeKind::CompilationUnit`].
    pub root: ScopeNode,
}

impl CompilationUnit {
    pub fn new(file: FileId, root: ScopeNode) -> Self {
        Self {
            file,
            package: None,
            imports: Vec::new(),
            root,
        }
    }

    pub fn with_package(mut self, package: impl Into<SmolStr>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_import(mut self, import: ImportDecl) -> Self {
        self.imports.push(import);
        self
    }
}

/// An `import` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    pub node: NodeId,
    /// The imported name without `.*` (`java.util`, `java.util.List`,
    /// `java.lang.Math.max`).
    pub name: SmolStr,
    pub is_static: bool,
    pub on_demand: bool,
}

impl ImportDecl {
    /// `import p.C;`
    pub fn single(node: NodeId, name: impl Into<SmolStr>) -> Self {
        Self::new(node, name, false, false)
    }

    /// `import p.*;`
    pub fn on_demand(node: NodeId, name: impl Into<SmolStr>) -> Self {
        Self::new(node, name, false, true)
    }

    /// `import static p.C.m;`
    pub fn single_static(node: NodeId, name: impl Into<SmolStr>) -> Self {
        Self::new(node, name, true, false)
    }

    /// `import static p.C.*;`
    pub fn static_on_demand(node: NodeId, name: impl Into<SmolStr>) -> Self {
        Self::new(node, name, true, true)
    }

    fn new(node: NodeId, name: impl Into<SmolStr>, is_static: bool, on_demand: bool) -> Self {
        Self {
            node,
            name: name.into(),
            is_static,
            on_demand,
        }
    }

    /// Last segment of the imported name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Everything before the last segment.
    pub fn qualifier(&self) -> &str {
        self.name.rsplit_once('.').map_or("", |(q, _)| q)
    }
}

/// Supertypes named in a type declaration, as written in source
/// (`Base`, `java.util.List<String>`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeHeader {
    /// Binary name of the declared type.
    pub binary_name: SmolStr,
    /// `None` when the declaration has no `extends` clause; nothing is
    /// inherited then, not even from `java.lang.Object`.
    pub superclass: Option<SmolStr>,
    pub interfaces: Vec<SmolStr>,
}

impl TypeHeader {
    pub fn new(binary_name: impl Into<SmolStr>) -> Self {
        Self {
            binary_name: binary_name.into(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, superclass: impl Into<SmolStr>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<SmolStr>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn supertypes(&self) -> impl Iterator<Item = &SmolStr> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    CompilationUnit,
    /// The body of a class, interface, enum, record or annotation type.
    TypeBody(TypeHeader),
    MethodBody,
    Block,
    Lambda,
    CatchClause,
    /// The header of a `for` statement, where its init variables live.
    ForHeader,
}

/// A region of source that introduces names.
#[derive(Clone, Debug)]
pub struct ScopeNode {
    pub id: NodeId,
    pub kind: ScopeKind,
    pub range: TextRange,
    /// Declarations in source order.
    pub decls: Vec<Decl>,
    pub children: Vec<ScopeNode>,
}

impl ScopeNode {
    pub fn new(id: NodeId, kind: ScopeKind, range: TextRange) -> Self {
        Self {
            id,
            kind,
            range,
            decls: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_decl(mut self, decl: impl Into<Decl>) -> Self {
        self.decls.push(decl.into());
        self
    }

    pub fn with_child(mut self, child: ScopeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Pre-order walk of this scope and every scope nested in it.
    pub fn descendants(&self) -> impl Iterator<Item = &ScopeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decl {
    Type(TypeDecl),
    Variable(VariableDecl),
    Method(MethodDecl),
}

impl Decl {
    pub fn node(&self) -> NodeId {
        match self {
            Decl::Type(d) => d.node,
            Decl::Variable(d) => d.node,
            Decl::Method(d) => d.node,
        }
    }
}

/// A class-like declaration or a type parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub node: NodeId,
    /// Binary name; the simple name for type parameters.
    pub binary_name: SmolStr,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
}

impl TypeDecl {
    pub fn new(node: NodeId, binary_name: impl Into<SmolStr>, kind: TypeKind) -> Self {
        Self {
            node,
            binary_name: binary_name.into(),
            kind,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn type_parameter(node: NodeId, name: impl Into<SmolStr>) -> Self {
        Self::new(node, name, TypeKind::TypeParameter)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDecl {
    pub node: NodeId,
    pub name: SmolStr,
    pub kind: VariableKind,
    pub modifiers: Modifiers,
    /// Declared type as written; `None` for `var` and lambda parameters
    /// without a type.
    pub type_name: Option<SmolStr>,
}

impl VariableDecl {
    pub fn new(node: NodeId, name: impl Into<SmolStr>, kind: VariableKind) -> Self {
        Self {
            node,
            name: name.into(),
            kind,
            modifiers: Modifiers::empty(),
            type_name: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A method or constructor. Constructors are named `<init>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub node: NodeId,
    pub name: SmolStr,
    pub modifiers: Modifiers,
    pub parameter_types: Vec<SmolStr>,
    pub return_type: Option<SmolStr>,
}

impl MethodDecl {
    pub fn new(node: NodeId, name: impl Into<SmolStr>) -> Self {
        Self {
            node,
            name: name.into(),
            modifiers: Modifiers::empty(),
            parameter_types: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_parameter(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.parameter_types.push(type_name.into());
        self
    }

    pub fn returning(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<TypeDecl> for Decl {
    fn from(d: TypeDecl) -> Self {
        Decl::Type(d)
    }
}

impl From<VariableDecl> for Decl {
    fn from(d: VariableDecl) -> Self {
        Decl::Variable(d)
    }
}

impl From<MethodDecl> for Decl {
    fn from(d: MethodDecl) -> Self {
        Decl::Method(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn test_import_name_parts() {
        let import = ImportDecl::single_static(NodeId::new(1), "java.lang.Math.max");
        assert_eq!(import.simple_name(), "max");
        assert_eq!(import.qualifier(), "java.lang.Math");
        assert_eq!(ImportDecl::single(NodeId::new(2), "Foo").qualifier(), "");
    }

    #[test]
    fn test_descendants_are_preorder() {
        let tree = ScopeNode::new(NodeId::new(0), ScopeKind::CompilationUnit, range(0, 100))
            .with_child(
                ScopeNode::new(NodeId::new(1), ScopeKind::TypeBody(TypeHeader::new("C")), range(0, 50))
                    .with_child(ScopeNode::new(NodeId::new(2), ScopeKind::MethodBody, range(10, 40))),
            )
            .with_child(ScopeNode::new(NodeId::new(3), ScopeKind::TypeBody(TypeHeader::new("D")), range(60, 90)));

        let ids: Vec<u32> = tree.descendants().map(|n| n.id.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
