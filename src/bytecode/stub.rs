//! Class stubs: the declarations of one class file, without code.

use smol_str::SmolStr;

use super::error::StubResult;
use super::event::ClassVersion;
use super::parser::parse_class;
use super::stub_builder::StubBuilder;
use crate::symbols::{
    MethodSym, Modifiers, ScalarValue, SymbolicAnnotation, SymbolicValue, TypeKind, TypeRef, TypeSym,
    VariableSym,
};

/// An annotation applied to a class, field or method.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationUse {
    pub annotation: SymbolicAnnotation,
    /// Retained at runtime (`RuntimeVisibleAnnotations`).
    pub visible: bool,
}

/// A member class listed in the `InnerClasses` attribute of its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberTypeStub {
    pub binary_name: SmolStr,
    pub simple_name: SmolStr,
    pub access: u16,
}

#[derive(Clone, Debug)]
pub struct FieldStub {
    pub name: SmolStr,
    pub descriptor: SmolStr,
    pub type_ref: TypeRef,
    pub signature: Option<SmolStr>,
    pub access: u16,
    pub constant_value: Option<ScalarValue>,
    pub annotations: Vec<AnnotationUse>,
    pub(crate) symbol: VariableSym,
}

impl FieldStub {
    pub fn symbol(&self) -> &VariableSym {
        &self.symbol
    }

    pub fn modifiers(&self) -> Modifiers {
        self.symbol.modifiers
    }
}

/// A method or constructor.
#[derive(Clone, Debug)]
pub struct ExecutableStub {
    pub name: SmolStr,
    pub descriptor: SmolStr,
    pub parameter_types: Vec<TypeRef>,
    pub return_type: TypeRef,
    pub signature: Option<SmolStr>,
    pub access: u16,
    /// Binary names of the declared exceptions.
    pub exceptions: Vec<SmolStr>,
    pub annotations: Vec<AnnotationUse>,
    /// Present exactly when the class file carries an `AnnotationDefault`.
    pub default_value: Option<SymbolicValue>,
    pub(crate) symbol: MethodSym,
}

impl ExecutableStub {
    pub fn symbol(&self) -> &MethodSym {
        &self.symbol
    }

    pub fn modifiers(&self) -> Modifiers {
        self.symbol.modifiers
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }
}

/// Everything an analysis of callers needs to know about one class file.
///
/// Built once per class by [`StubBuilder`] and then shared read-only. The
/// symbols handed out by a stub are the same `Arc`s on every call.
#[derive(Clone, Debug)]
pub struct ClassStub {
    pub binary_name: SmolStr,
    pub internal_name: SmolStr,
    pub version: ClassVersion,
    pub access: u16,
    pub kind: TypeKind,
    pub signature: Option<SmolStr>,
    /// Binary name of the superclass; `None` only for `java.lang.Object`
    /// and module descriptors.
    pub super_name: Option<SmolStr>,
    /// Binary names of the direct superinterfaces.
    pub interfaces: Vec<SmolStr>,
    /// Binary name of the enclosing class, for member classes.
    pub enclosing: Option<SmolStr>,
    pub annotations: Vec<AnnotationUse>,
    pub member_types: Vec<MemberTypeStub>,
    pub fields: Vec<FieldStub>,
    pub methods: Vec<ExecutableStub>,
    pub(crate) symbol: TypeSym,
}

impl ClassStub {
    /// Parses and builds the stub of one class file.
    pub fn from_bytes(bytes: &[u8]) -> StubResult<Self> {
        let mut builder = StubBuilder::new();
        parse_class(bytes, &mut builder)?;
        builder.finish()
    }

    pub fn symbol(&self) -> &TypeSym {
        &self.symbol
    }

    pub fn simple_name(&self) -> &str {
        &self.symbol.name
    }

    /// Superclass first, then interfaces in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &SmolStr> {
        self.super_name.iter().chain(self.interfaces.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldStub> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ExecutableStub> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn member_type(&self, simple_name: &str) -> Option<&MemberTypeStub> {
        self.member_types.iter().find(|t| t.simple_name == simple_name)
    }

    /// Fields a subclass can inherit: everything but private and synthetic
    /// ones.
    pub fn inheritable_fields(&self) -> impl Iterator<Item = &FieldStub> {
        self.fields.iter().filter(|f| !hidden_from_subclasses(f.modifiers()))
    }

    /// Methods a subclass can inherit. Constructors, initializers, bridges
    /// and private or synthetic methods are left out.
    pub fn inheritable_methods(&self) -> impl Iterator<Item = &ExecutableStub> {
        self.methods.iter().filter(|m| {
            !m.is_initializer() && !hidden_from_subclasses(m.modifiers()) && !m.modifiers().contains(Modifiers::BRIDGE)
        })
    }

    /// Member classes a subclass can see by simple name.
    pub fn inheritable_member_types(&self) -> impl Iterator<Item = &MemberTypeStub> {
        self.member_types
            .iter()
            .filter(|t| !hidden_from_subclasses(Modifiers::from_class_access(t.access)))
    }
}

fn hidden_from_subclasses(modifiers: Modifiers) -> bool {
    modifiers.intersects(Modifiers::PRIVATE | Modifiers::SYNTHETIC)
}
