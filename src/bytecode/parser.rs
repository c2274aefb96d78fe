//! Streaming class-file parser.
//!
//! Walks the structure of a class file once, front to back, and reports
//! what it finds as [`ClassEvent`]s. Method bodies (`Code`) and every other
//! attribute the stub extractor has no use for are skipped by length;
//! nothing is verified or executed.

use smol_str::SmolStr;

use super::constant_pool::ConstantPool;
use super::error::{StubError, StubResult};
use super::event::{ClassEvent, ClassVersion, ClassVisitor};
use super::reader::ByteReader;
use crate::symbols::ScalarValue;

const MAGIC: u32 = 0xCAFE_BABE;

/// Nesting limit for annotation values (arrays of nested annotations of
/// arrays...). Deeper input is rejected rather than recursed into.
const MAX_VALUE_DEPTH: usize = 64;

mod attr {
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const SIGNATURE: &str = "Signature";
    pub const EXCEPTIONS: &str = "Exceptions";
    pub const INNER_CLASSES: &str = "InnerClasses";
    pub const ANNOTATION_DEFAULT: &str = "AnnotationDefault";
    pub const VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
    pub const INVISIBLE_ANNOTATIONS: &str = "RuntimeInvisibleAnnotations";
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Element {
    Class,
    Field,
    Method,
}

/// Parses `bytes` as a class file, feeding every event to `visitor`.
///
/// Stops at the first malformed structure or at the first error returned
/// by the visitor.
pub fn parse_class(bytes: &[u8], visitor: &mut impl ClassVisitor) -> StubResult<()> {
    let mut r = ByteReader::new(bytes);

    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(StubError::BadMagic(magic));
    }
    let minor = r.u16()?;
    let major = r.u16()?;
    let version = ClassVersion { major, minor };
    if version < ClassVersion::OLDEST {
        return Err(StubError::UnsupportedVersion { major, minor });
    }
    if version > ClassVersion::NEWEST_KNOWN {
        tracing::debug!(major, minor, "reading class file newer than the newest known version");
    }

    let cp = ConstantPool::parse(&mut r)?;
    tracing::trace!(entries = cp.len(), "parsed constant pool");

    let access = r.u16()?;
    let name = cp.class_name(r.u16()?)?.clone();
    let super_name = cp.optional_class_name(r.u16()?)?.cloned();
    let interface_count = r.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(cp.class_name(r.u16()?)?.clone());
    }

    visitor.visit(ClassEvent::ClassStart {
        version,
        access,
        name,
        super_name,
        interfaces,
    })?;

    let mut parser = Parser { cp: &cp, visitor };

    let field_count = r.u16()?;
    for _ in 0..field_count {
        parser.member(&mut r, Element::Field)?;
    }
    let method_count = r.u16()?;
    for _ in 0..method_count {
        parser.member(&mut r, Element::Method)?;
    }
    parser.attributes(&mut r, Element::Class, None)?;
    r.expect_end("class attributes")?;

    parser.visitor.visit(ClassEvent::ClassEnd)
}

struct Parser<'p, V> {
    cp: &'p ConstantPool,
    visitor: &'p mut V,
}

impl<V: ClassVisitor> Parser<'_, V> {
    fn member(&mut self, r: &mut ByteReader<'_>, element: Element) -> StubResult<()> {
        let access = r.u16()?;
        let name = self.cp.utf8(r.u16()?)?.clone();
        let descriptor = self.cp.utf8(r.u16()?)?.clone();

        let (start, end) = match element {
            Element::Field => (
                ClassEvent::FieldStart {
                    access,
                    name,
                    descriptor: descriptor.clone(),
                },
                ClassEvent::FieldEnd,
            ),
            _ => (
                ClassEvent::MethodStart {
                    access,
                    name,
                    descriptor: descriptor.clone(),
                },
                ClassEvent::MethodEnd,
            ),
        };
        self.visitor.visit(start)?;
        self.attributes(r, element, Some(descriptor.as_str()))?;
        self.visitor.visit(end)
    }

    fn attributes(
        &mut self,
        r: &mut ByteReader<'_>,
        element: Element,
        descriptor: Option<&str>,
    ) -> StubResult<()> {
        let cp = self.cp;
        let count = r.u16()?;
        for _ in 0..count {
            let name = cp.utf8(r.u16()?)?;
            let len = r.u32()? as usize;
            let mut body = r.sub_reader(len)?;

            match (element, name.as_str()) {
                (Element::Field, attr::CONSTANT_VALUE) => {
                    let index = body.u16()?;
                    if let Some(value) = self.constant_value(index, descriptor.unwrap_or_default())? {
                        self.visitor.visit(ClassEvent::FieldConstant(value))?;
                    }
                }
                (_, attr::SIGNATURE) => {
                    let signature = cp.utf8(body.u16()?)?.clone();
                    self.visitor.visit(ClassEvent::Signature(signature))?;
                }
                (Element::Method, attr::EXCEPTIONS) => {
                    let n = body.u16()?;
                    let mut thrown = Vec::with_capacity(n as usize);
                    for _ in 0..n {
                        thrown.push(cp.class_name(body.u16()?)?.clone());
                    }
                    self.visitor.visit(ClassEvent::Exceptions(thrown))?;
                }
                (Element::Method, attr::ANNOTATION_DEFAULT) => {
                    self.visitor.visit(ClassEvent::AnnotationDefault)?;
                    self.element_value(&mut body, None, 0)?;
                    self.visitor.visit(ClassEvent::ValueEnd)?;
                }
                (Element::Class, attr::INNER_CLASSES) => self.inner_classes(&mut body)?,
                (_, attr::VISIBLE_ANNOTATIONS) => self.annotations(&mut body, true)?,
                (_, attr::INVISIBLE_ANNOTATIONS) => self.annotations(&mut body, false)?,
                _ => continue,
            }
            body.expect_end(name)?;
        }
        Ok(())
    }

    fn inner_classes(&mut self, r: &mut ByteReader<'_>) -> StubResult<()> {
        let n = r.u16()?;
        for _ in 0..n {
            let inner = self.cp.class_name(r.u16()?)?.clone();
            let outer = self.cp.optional_class_name(r.u16()?)?.cloned();
            let simple_name = self.cp.optional_utf8(r.u16()?)?.cloned();
            let access = r.u16()?;
            self.visitor.visit(ClassEvent::InnerClass {
                inner,
                outer,
                simple_name,
                access,
            })?;
        }
        Ok(())
    }

    fn annotations(&mut self, r: &mut ByteReader<'_>, visible: bool) -> StubResult<()> {
        let n = r.u16()?;
        for _ in 0..n {
            let descriptor = self.cp.utf8(r.u16()?)?.clone();
            self.visitor.visit(ClassEvent::AnnotationStart { descriptor, visible })?;
            self.annotation_body(r, 0)?;
            self.visitor.visit(ClassEvent::ValueEnd)?;
        }
        Ok(())
    }

    /// The element-value pairs of an annotation, after its type index.
    fn annotation_body(&mut self, r: &mut ByteReader<'_>, depth: usize) -> StubResult<()> {
        let pairs = r.u16()?;
        for _ in 0..pairs {
            let name = self.cp.utf8(r.u16()?)?.clone();
            self.element_value(r, Some(name), depth + 1)?;
        }
        Ok(())
    }

    fn element_value(&mut self, r: &mut ByteReader<'_>, name: Option<SmolStr>, depth: usize) -> StubResult<()> {
        if depth > MAX_VALUE_DEPTH {
            return Err(StubError::malformed(r.offset(), "annotation value nested too deeply"));
        }
        let at = r.offset();
        let tag = r.u8()?;
        let event = match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                let index = r.u16()?;
                let value = self.tagged_scalar(tag, index)?;
                ClassEvent::Scalar { name, value }
            }
            b'e' => {
                let descriptor = self.cp.utf8(r.u16()?)?.clone();
                let constant = self.cp.utf8(r.u16()?)?.clone();
                ClassEvent::EnumValue {
                    name,
                    descriptor,
                    constant,
                }
            }
            b'c' => {
                let descriptor = self.cp.utf8(r.u16()?)?.clone();
                ClassEvent::ClassValue { name, descriptor }
            }
            b'@' => {
                let descriptor = self.cp.utf8(r.u16()?)?.clone();
                self.visitor.visit(ClassEvent::NestedAnnotationStart { name, descriptor })?;
                self.annotation_body(r, depth)?;
                ClassEvent::ValueEnd
            }
            b'[' => {
                let n = r.u16()?;
                self.visitor.visit(ClassEvent::ArrayStart { name })?;
                for _ in 0..n {
                    self.element_value(r, None, depth + 1)?;
                }
                ClassEvent::ValueEnd
            }
            other => {
                return Err(StubError::malformed(
                    at,
                    format!("unknown element value tag {:?}", other as char),
                ));
            }
        };
        self.visitor.visit(event)
    }

    fn tagged_scalar(&self, tag: u8, index: u16) -> StubResult<ScalarValue> {
        let cp = self.cp;
        Ok(match tag {
            b'B' => ScalarValue::Byte(cp.integer(index)? as i8),
            b'C' => ScalarValue::Char(java_char(cp.integer(index)?)),
            b'S' => ScalarValue::Short(cp.integer(index)? as i16),
            b'Z' => ScalarValue::Boolean(cp.integer(index)? != 0),
            b'I' => ScalarValue::Int(cp.integer(index)?),
            b'J' => ScalarValue::Long(cp.long(index)?),
            b'F' => ScalarValue::Float(cp.float(index)?),
            b'D' => ScalarValue::Double(cp.double(index)?),
            // `s` points at a Utf8 entry directly, not at a String
            _ => ScalarValue::String(cp.utf8(index)?.clone()),
        })
    }

    /// Decodes a `ConstantValue` attribute. Returns `None` for descriptors
    /// that cannot carry a constant.
    fn constant_value(&self, index: u16, descriptor: &str) -> StubResult<Option<ScalarValue>> {
        let cp = self.cp;
        let value = match descriptor {
            "B" | "C" | "S" | "Z" | "I" | "J" | "F" | "D" => {
                self.tagged_scalar(descriptor.as_bytes()[0], index)?
            }
            "Ljava/lang/String;" => ScalarValue::String(cp.string(index)?.clone()),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

fn java_char(v: i32) -> char {
    // lone surrogates have no `char`
    char::from_u32(v as u16 as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::event::EventLog;

    fn header(major: u16) -> Vec<u8> {
        let mut b = MAGIC.to_be_bytes().to_vec();
        b.extend_from_slice(&0u16.to_be_bytes());
        b.extend_from_slice(&major.to_be_bytes());
        b
    }

    #[test]
    fn test_bad_magic() {
        let mut log = EventLog::default();
        let err = parse_class(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 52], &mut log).unwrap_err();
        assert!(matches!(err, StubError::BadMagic(0xDEAD_BEEF)));
        assert!(log.events.is_empty());
    }

    #[test]
    fn test_too_old_version() {
        let mut log = EventLog::default();
        let err = parse_class(&header(44), &mut log).unwrap_err();
        assert!(matches!(err, StubError::UnsupportedVersion { major: 44, .. }));
    }

    #[test]
    fn test_truncated_pool() {
        let mut bytes = header(52);
        bytes.extend_from_slice(&5u16.to_be_bytes());
        bytes.push(1);
        let mut log = EventLog::default();
        assert!(matches!(parse_class(&bytes, &mut log), Err(StubError::Malformed { .. })));
    }

    #[test]
    fn test_java_char() {
        assert_eq!(java_char(65), 'A');
        assert_eq!(java_char(0xD800), char::REPLACEMENT_CHARACTER);
    }
}
