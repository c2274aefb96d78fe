//! Compile-time constant values.
//!
//! A [`SymbolicValue`] describes a value without evaluating anything: the
//! default of an annotation element, an element of an annotation usage, or
//! the constant of a `static final` field. These are read from class files,
//! so they only ever take the shapes the class-file format can encode.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// A reference to a type by its binary name.
///
/// Primitives use their keyword (`int`), arrays append `[]` per dimension
/// (`java.lang.String[][]`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(SmolStr);

impl TypeRef {
    pub fn new(binary_name: impl Into<SmolStr>) -> Self {
        Self(binary_name.into())
    }

    pub fn binary_name(&self) -> &str {
        &self.0
    }

    /// The name without any array brackets.
    pub fn element_name(&self) -> &str {
        self.0.trim_end_matches("[]")
    }

    pub fn array_dimensions(&self) -> usize {
        (self.0.len() - self.element_name().len()) / 2
    }

    pub fn is_primitive(&self) -> bool {
        self.array_dimensions() == 0
            && matches!(
                self.0.as_str(),
                "boolean" | "byte" | "char" | "short" | "int" | "long" | "float" | "double" | "void"
            )
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A scalar constant: any primitive, or a string.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(SmolStr),
}

impl ScalarValue {
    /// The Java type name of this constant.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Boolean(_) => "boolean",
            ScalarValue::Char(_) => "char",
            ScalarValue::Byte(_) => "byte",
            ScalarValue::Short(_) => "short",
            ScalarValue::Int(_) => "int",
            ScalarValue::Long(_) => "long",
            ScalarValue::Float(_) => "float",
            ScalarValue::Double(_) => "double",
            ScalarValue::String(_) => "java.lang.String",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::Char(v) => write!(f, "'{}'", v.escape_default()),
            ScalarValue::Byte(v) => write!(f, "{v}"),
            ScalarValue::Short(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Long(v) => write!(f, "{v}L"),
            ScalarValue::Float(v) => write!(f, "{v}f"),
            ScalarValue::Double(v) => write!(f, "{v}d"),
            ScalarValue::String(v) => write!(f, "\"{}\"", v.escape_default()),
        }
    }
}

/// An annotation instance: its type and its explicitly given elements.
///
/// Elements keep the order in which they appear in the class file.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolicAnnotation {
    pub annotation_type: TypeRef,
    elements: IndexMap<SmolStr, SymbolicValue>,
}

impl SymbolicAnnotation {
    pub fn new(annotation_type: TypeRef) -> Self {
        Self {
            annotation_type,
            elements: IndexMap::new(),
        }
    }

    /// Set an element. A name given twice keeps the first value and
    /// returns the rejected one.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: SymbolicValue) -> Option<SymbolicValue> {
        match self.elements.entry(name.into()) {
            indexmap::map::Entry::Occupied(_) => Some(value),
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&SymbolicValue> {
        self.elements.get(name)
    }

    pub fn elements(&self) -> impl Iterator<Item = (&str, &SymbolicValue)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A compile-time constant of any shape an annotation element can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum SymbolicValue {
    Scalar(ScalarValue),
    ClassLiteral(TypeRef),
    EnumConstant { ty: TypeRef, name: SmolStr },
    Array(Vec<SymbolicValue>),
    Annotation(SymbolicAnnotation),
}

impl SymbolicValue {
    pub fn int(v: i32) -> Self {
        SymbolicValue::Scalar(ScalarValue::Int(v))
    }

    pub fn string(v: impl Into<SmolStr>) -> Self {
        SymbolicValue::Scalar(ScalarValue::String(v.into()))
    }

    pub fn enum_constant(ty: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        SymbolicValue::EnumConstant {
            ty: TypeRef::new(ty),
            name: name.into(),
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            SymbolicValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[SymbolicValue]> {
        match self {
            SymbolicValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<ScalarValue> for SymbolicValue {
    fn from(value: ScalarValue) -> Self {
        SymbolicValue::Scalar(value)
    }
}

impl fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolicValue::Scalar(s) => write!(f, "{s}"),
            SymbolicValue::ClassLiteral(t) => write!(f, "{t}.class"),
            SymbolicValue::EnumConstant { ty, name } => write!(f, "{ty}.{name}"),
            SymbolicValue::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
            SymbolicValue::Annotation(a) => {
                write!(f, "@{}(", a.annotation_type)?;
                for (i, (name, value)) in a.elements().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} = {value}")?;
                }
                f.write_str(")")
            }
        }
    }
}
