//! Symbols: the entities a simple name can stand for.
//!
//! There are three capabilities (type, variable, method), each with one
//! struct. A symbol looks the same whether it was declared in analyzed
//! source or reconstructed from a class file; only its [`SymbolOrigin`]
//! differs. Symbols are immutable and shared behind `Arc`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bitflags::bitflags;
use smol_str::SmolStr;

use super::value::{ScalarValue, SymbolicValue, TypeRef};
use crate::base::{DefId, simple_name_of};

bitflags! {
    /// Declaration modifiers.
    ///
    /// Class-file access flags reuse bit positions between classes, fields
    /// and methods (`0x0040` is `volatile` on a field but `bridge` on a
    /// method), so these bits are independent of the JVM encoding. Use the
    /// `from_*_access` constructors to decode access flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const SYNCHRONIZED = 1 << 6;
        const VOLATILE = 1 << 7;
        const TRANSIENT = 1 << 8;
        const NATIVE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;
        const SYNTHETIC = 1 << 12;
        const VARARGS = 1 << 13;
        const BRIDGE = 1 << 14;
    }
}

mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SYNCHRONIZED: u16 = 0x0020;
    pub const VOLATILE_OR_BRIDGE: u16 = 0x0040;
    pub const TRANSIENT_OR_VARARGS: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const STRICT: u16 = 0x0800;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

impl Modifiers {
    fn visibility_from(flags: u16) -> Self {
        let mut m = Modifiers::empty();
        m.set(Modifiers::PUBLIC, flags & access::PUBLIC != 0);
        m.set(Modifiers::PRIVATE, flags & access::PRIVATE != 0);
        m.set(Modifiers::PROTECTED, flags & access::PROTECTED != 0);
        m.set(Modifiers::STATIC, flags & access::STATIC != 0);
        m.set(Modifiers::FINAL, flags & access::FINAL != 0);
        m.set(Modifiers::SYNTHETIC, flags & access::SYNTHETIC != 0);
        m
    }

    pub fn from_class_access(flags: u16) -> Self {
        let mut m = Self::visibility_from(flags);
        // interfaces are implicitly abstract; keep the flag as written
        m.set(Modifiers::ABSTRACT, flags & access::ABSTRACT != 0);
        m
    }

    pub fn from_field_access(flags: u16) -> Self {
        let mut m = Self::visibility_from(flags);
        m.set(Modifiers::VOLATILE, flags & access::VOLATILE_OR_BRIDGE != 0);
        m.set(Modifiers::TRANSIENT, flags & access::TRANSIENT_OR_VARARGS != 0);
        m
    }

    pub fn from_method_access(flags: u16) -> Self {
        let mut m = Self::visibility_from(flags);
        m.set(Modifiers::SYNCHRONIZED, flags & access::SYNCHRONIZED != 0);
        m.set(Modifiers::BRIDGE, flags & access::VOLATILE_OR_BRIDGE != 0);
        m.set(Modifiers::VARARGS, flags & access::TRANSIENT_OR_VARARGS != 0);
        m.set(Modifiers::NATIVE, flags & access::NATIVE != 0);
        m.set(Modifiers::ABSTRACT, flags & access::ABSTRACT != 0);
        m.set(Modifiers::STRICTFP, flags & access::STRICT != 0);
        m
    }
}

/// Where a symbol was declared. This is the symbol's identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    /// Declared in analyzed source.
    Source(DefId),
    /// Reconstructed from a class file.
    ///
    /// `owner` is the binary name of the class the member belongs to (for
    /// a type, the type itself). `descriptor` is the JVM descriptor of the
    /// member.
    Stub {
        owner: SmolStr,
        name: SmolStr,
        descriptor: SmolStr,
    },
    /// Named by an import, but absent from the classpath.
    Unresolved(SmolStr),
}

impl SymbolOrigin {
    pub fn is_source(&self) -> bool {
        matches!(self, SymbolOrigin::Source(_))
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, SymbolOrigin::Stub { .. })
    }
}

macro_rules! identity_by_origin {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.origin == other.origin
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.origin.hash(state);
            }
        }
    };
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    TypeParameter,
    Unresolved,
}

impl TypeKind {
    pub(crate) fn from_class_access(flags: u16, super_name: Option<&str>) -> Self {
        if flags & access::ANNOTATION != 0 {
            TypeKind::Annotation
        } else if flags & access::INTERFACE != 0 {
            TypeKind::Interface
        } else if flags & access::ENUM != 0 {
            TypeKind::Enum
        } else if super_name == Some("java/lang/Record") {
            TypeKind::Record
        } else {
            TypeKind::Class
        }
    }
}

/// A type declaration: class, interface, enum, annotation, record, or a
/// type parameter.
#[derive(Clone, Debug)]
pub struct JTypeSymbol {
    pub name: SmolStr,
    /// Binary name (`java.util.Map$Entry`). For type parameters, the simple
    /// name.
    pub binary_name: SmolStr,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub origin: SymbolOrigin,
}

identity_by_origin!(JTypeSymbol);

impl JTypeSymbol {
    pub fn source(def: DefId, binary_name: impl Into<SmolStr>, kind: TypeKind, modifiers: Modifiers) -> Self {
        let binary_name = binary_name.into();
        Self {
            name: simple_name_of(&binary_name).into(),
            binary_name,
            kind,
            modifiers,
            origin: SymbolOrigin::Source(def),
        }
    }

    /// A placeholder for a type that is named but cannot be found.
    pub fn unresolved(binary_name: impl Into<SmolStr>) -> Self {
        let binary_name = binary_name.into();
        Self {
            name: simple_name_of(&binary_name).into(),
            binary_name: binary_name.clone(),
            kind: TypeKind::Unresolved,
            modifiers: Modifiers::empty(),
            origin: SymbolOrigin::Unresolved(binary_name),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.kind == TypeKind::Unresolved
    }

    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.binary_name.clone())
    }
}

impl fmt::Display for JTypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.binary_name)
    }
}

// ============================================================================
// VARIABLES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Field,
    EnumConstant,
    Local,
    FormalParameter,
    CatchParameter,
    ResourceVariable,
}

impl VariableKind {
    pub(crate) fn from_field_access(flags: u16) -> Self {
        if flags & access::ENUM != 0 {
            VariableKind::EnumConstant
        } else {
            VariableKind::Field
        }
    }

    pub fn is_field(self) -> bool {
        matches!(self, VariableKind::Field | VariableKind::EnumConstant)
    }
}

/// A field, enum constant, local variable or parameter.
#[derive(Clone, Debug)]
pub struct JVariableSymbol {
    pub name: SmolStr,
    pub kind: VariableKind,
    pub modifiers: Modifiers,
    pub type_ref: Option<TypeRef>,
    /// Compile-time constant value (only `static final` fields of class
    /// files carry one).
    pub constant: Option<ScalarValue>,
    pub origin: SymbolOrigin,
}

identity_by_origin!(JVariableSymbol);

impl JVariableSymbol {
    pub fn source(
        def: DefId,
        name: impl Into<SmolStr>,
        kind: VariableKind,
        modifiers: Modifiers,
        type_ref: Option<TypeRef>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers,
            type_ref,
            constant: None,
            origin: SymbolOrigin::Source(def),
        }
    }
}

impl fmt::Display for JVariableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_ref {
            Some(t) => write!(f, "{} {}", t, self.name),
            None => f.write_str(&self.name),
        }
    }
}

// ============================================================================
// METHODS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Constructor,
}

/// A method or constructor.
#[derive(Clone, Debug)]
pub struct JMethodSymbol {
    pub name: SmolStr,
    pub kind: MethodKind,
    pub modifiers: Modifiers,
    pub parameter_types: Vec<TypeRef>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    /// Binary name of the declaring type.
    pub declaring_type: SmolStr,
    /// Default value, for annotation elements that declare one.
    pub default_value: Option<SymbolicValue>,
    pub origin: SymbolOrigin,
}

identity_by_origin!(JMethodSymbol);

impl JMethodSymbol {
    pub fn source(
        def: DefId,
        name: impl Into<SmolStr>,
        declaring_type: impl Into<SmolStr>,
        modifiers: Modifiers,
        parameter_types: Vec<TypeRef>,
        return_type: Option<TypeRef>,
    ) -> Self {
        let name = name.into();
        let kind = if name == "<init>" {
            MethodKind::Constructor
        } else {
            MethodKind::Method
        };
        Self {
            name,
            kind,
            modifiers,
            parameter_types,
            return_type,
            declaring_type: declaring_type.into(),
            default_value: None,
            origin: SymbolOrigin::Source(def),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    pub fn is_varargs(&self) -> bool {
        self.modifiers.contains(Modifiers::VARARGS)
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MethodKind::Constructor
    }
}

impl fmt::Display for JMethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}(", self.declaring_type, self.name)?;
        for (i, p) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// ANY SYMBOL
// ============================================================================

pub type TypeSym = Arc<JTypeSymbol>;
pub type VariableSym = Arc<JVariableSymbol>;
pub type MethodSym = Arc<JMethodSymbol>;

/// Any symbol, for consumers that treat the three capabilities uniformly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JElementSymbol {
    Type(TypeSym),
    Variable(VariableSym),
    Method(MethodSym),
}

impl JElementSymbol {
    pub fn name(&self) -> &str {
        match self {
            JElementSymbol::Type(t) => &t.name,
            JElementSymbol::Variable(v) => &v.name,
            JElementSymbol::Method(m) => &m.name,
        }
    }

    pub fn origin(&self) -> &SymbolOrigin {
        match self {
            JElementSymbol::Type(t) => &t.origin,
            JElementSymbol::Variable(v) => &v.origin,
            JElementSymbol::Method(m) => &m.origin,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            JElementSymbol::Type(t) => t.modifiers,
            JElementSymbol::Variable(v) => v.modifiers,
            JElementSymbol::Method(m) => m.modifiers,
        }
    }
}

impl From<TypeSym> for JElementSymbol {
    fn from(sym: TypeSym) -> Self {
        JElementSymbol::Type(sym)
    }
}

impl From<VariableSym> for JElementSymbol {
    fn from(sym: VariableSym) -> Self {
        JElementSymbol::Variable(sym)
    }
}

impl From<MethodSym> for JElementSymbol {
    fn from(sym: MethodSym) -> Self {
        JElementSymbol::Method(sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, NodeId};

    fn def(n: u32) -> DefId {
        DefId::new(FileId::new(0), NodeId::new(n))
    }

    #[test]
    fn test_identity_is_origin() {
        let a = JVariableSymbol::source(def(1), "x", VariableKind::Local, Modifiers::empty(), None);
        let mut b = a.clone();
        b.modifiers = Modifiers::FINAL;
        let c = JVariableSymbol::source(def(2), "x", VariableKind::Local, Modifiers::empty(), None);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_access_flags_depend_on_element() {
        // 0x0040 | 0x0080
        let field = Modifiers::from_field_access(0x00C0);
        assert!(field.contains(Modifiers::VOLATILE | Modifiers::TRANSIENT));

        let method = Modifiers::from_method_access(0x00C0);
        assert!(method.contains(Modifiers::BRIDGE | Modifiers::VARARGS));
        assert!(!method.contains(Modifiers::VOLATILE));
    }

    #[test]
    fn test_type_kind_from_access() {
        assert_eq!(TypeKind::from_class_access(0x2601, None), TypeKind::Annotation);
        assert_eq!(TypeKind::from_class_access(0x0601, None), TypeKind::Interface);
        assert_eq!(TypeKind::from_class_access(0x4031, Some("java/lang/Enum")), TypeKind::Enum);
        assert_eq!(TypeKind::from_class_access(0x0031, Some("java/lang/Record")), TypeKind::Record);
        assert_eq!(TypeKind::from_class_access(0x0021, Some("java/lang/Object")), TypeKind::Class);
    }

    #[test]
    fn test_unresolved_type() {
        let t = JTypeSymbol::unresolved("com.example.Missing");
        assert_eq!(t.name, "Missing");
        assert!(t.is_unresolved());
    }

    #[test]
    fn test_method_display_and_arity() {
        let m = JMethodSymbol::source(
            def(3),
            "put",
            "java.util.Map",
            Modifiers::PUBLIC,
            vec![TypeRef::new("java.lang.Object"), TypeRef::new("java.lang.Object")],
            Some(TypeRef::new("java.lang.Object")),
        );
        assert_eq!(m.arity(), 2);
        assert_eq!(m.to_string(), "java.util.Map#put(java.lang.Object, java.lang.Object)");
    }
}
