//! Parse events emitted by [`parse_class`](super::parse_class).
//!
//! Events arrive in class-file order:
//!
//! ```text
//! ClassStart
//!   (FieldStart  (FieldConstant | Signature | Annotation)* FieldEnd)*
//!   (MethodStart (Exceptions | Signature | Default | Annotation)* MethodEnd)*
//!   (InnerClass | Signature | Annotation)*
//! ClassEnd
//!
//! Default    := AnnotationDefault value ValueEnd
//! Annotation := AnnotationStart (named value)* ValueEnd
//! value      := Scalar | EnumValue | ClassValue
//!             | ArrayStart value* ValueEnd
//!             | NestedAnnotationStart (named value)* ValueEnd
//! ```
//!
//! Within one member, attributes are reported in the order the class file
//! lists them. Element values carry their element name when they sit directly inside
//! an annotation, and `None` inside an array or as an annotation default.

use smol_str::SmolStr;

use super::error::StubResult;
use crate::symbols::ScalarValue;

/// Class-file format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    /// JDK 1.1.
    pub const OLDEST: ClassVersion = ClassVersion { major: 45, minor: 0 };
    /// Newest version whose layout is known to match this parser.
    pub const NEWEST_KNOWN: ClassVersion = ClassVersion { major: 69, minor: 0 };
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassEvent {
    ClassStart {
        version: ClassVersion,
        access: u16,
        /// Internal name.
        name: SmolStr,
        super_name: Option<SmolStr>,
        interfaces: Vec<SmolStr>,
    },
    /// An `InnerClasses` entry.
    InnerClass {
        inner: SmolStr,
        outer: Option<SmolStr>,
        simple_name: Option<SmolStr>,
        access: u16,
    },
    FieldStart {
        access: u16,
        name: SmolStr,
        descriptor: SmolStr,
    },
    /// The `ConstantValue` of the current field, decoded by its descriptor.
    FieldConstant(ScalarValue),
    FieldEnd,
    MethodStart {
        access: u16,
        name: SmolStr,
        descriptor: SmolStr,
    },
    /// Declared `throws` clause of the current method (internal names).
    Exceptions(Vec<SmolStr>),
    /// Generic signature of the current class, field or method.
    Signature(SmolStr),
    /// The current method is an annotation element with a default value.
    /// Exactly one value follows, then [`ClassEvent::ValueEnd`].
    AnnotationDefault,
    /// An annotation on the current class, field or method.
    AnnotationStart {
        descriptor: SmolStr,
        visible: bool,
    },
    Scalar {
        name: Option<SmolStr>,
        value: ScalarValue,
    },
    EnumValue {
        name: Option<SmolStr>,
        descriptor: SmolStr,
        constant: SmolStr,
    },
    ClassValue {
        name: Option<SmolStr>,
        /// Return descriptor (`Ljava/lang/String;`, `I`, `V`).
        descriptor: SmolStr,
    },
    ArrayStart {
        name: Option<SmolStr>,
    },
    NestedAnnotationStart {
        name: Option<SmolStr>,
        descriptor: SmolStr,
    },
    /// Closes the innermost open annotation default, annotation, array or
    /// nested annotation.
    ValueEnd,
    MethodEnd,
    ClassEnd,
}

impl ClassEvent {
    /// Short name for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ClassEvent::ClassStart { .. } => "ClassStart",
            ClassEvent::InnerClass { .. } => "InnerClass",
            ClassEvent::FieldStart { .. } => "FieldStart",
            ClassEvent::FieldConstant(_) => "FieldConstant",
            ClassEvent::FieldEnd => "FieldEnd",
            ClassEvent::MethodStart { .. } => "MethodStart",
            ClassEvent::Exceptions(_) => "Exceptions",
            ClassEvent::Signature(_) => "Signature",
            ClassEvent::AnnotationDefault => "AnnotationDefault",
            ClassEvent::AnnotationStart { .. } => "AnnotationStart",
            ClassEvent::Scalar { .. } => "Scalar",
            ClassEvent::EnumValue { .. } => "EnumValue",
            ClassEvent::ClassValue { .. } => "ClassValue",
            ClassEvent::ArrayStart { .. } => "ArrayStart",
            ClassEvent::NestedAnnotationStart { .. } => "NestedAnnotationStart",
            ClassEvent::ValueEnd => "ValueEnd",
            ClassEvent::MethodEnd => "MethodEnd",
            ClassEvent::ClassEnd => "ClassEnd",
        }
    }
}

/// Receives the events of one class file.
pub trait ClassVisitor {
    fn visit(&mut self, event: ClassEvent) -> StubResult<()>;
}

/// Records every event. Handy for tests and debugging.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<ClassEvent>,
}

impl ClassVisitor for EventLog {
    fn visit(&mut self, event: ClassEvent) -> StubResult<()> {
        self.events.push(event);
        Ok(())
    }
}
