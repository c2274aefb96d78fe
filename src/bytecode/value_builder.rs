//! Assembles [`SymbolicValue`]s from value events.

use smol_str::SmolStr;

use super::descriptor::parse_field_descriptor;
use super::error::{StubError, StubResult};
use super::event::ClassEvent;
use crate::symbols::{SymbolicAnnotation, SymbolicValue};

/// An open compound value.
#[derive(Debug)]
pub(crate) enum ValueFrame {
    InArrayValue {
        name: Option<SmolStr>,
        items: Vec<SymbolicValue>,
    },
    InNestedAnnotation {
        name: Option<SmolStr>,
        annotation: SymbolicAnnotation,
    },
}

impl ValueFrame {
    fn close(self) -> (Option<SmolStr>, SymbolicValue) {
        match self {
            ValueFrame::InArrayValue { name, items } => (name, SymbolicValue::Array(items)),
            ValueFrame::InNestedAnnotation { name, annotation } => {
                (name, SymbolicValue::Annotation(annotation))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Root {
    /// One unnamed value closed by a trailing `ValueEnd` (annotation
    /// defaults).
    Single,
    /// An annotation usage; the root frame is the annotation itself.
    Annotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Progress {
    Open,
    Complete,
}

/// Builds exactly one value from a well-nested run of value events.
///
/// Array elements and annotation elements are appended strictly in event
/// order. [`finish`](Self::finish) consumes the builder, so a value is
/// frozen at most once.
#[derive(Debug)]
pub(crate) struct SymbolicValueBuilder {
    root: Root,
    stack: Vec<ValueFrame>,
    result: Option<SymbolicValue>,
    complete: bool,
}

impl SymbolicValueBuilder {
    pub fn for_default() -> Self {
        Self {
            root: Root::Single,
            stack: Vec::new(),
            result: None,
            complete: false,
        }
    }

    pub fn for_annotation(descriptor: &str) -> StubResult<Self> {
        let annotation = SymbolicAnnotation::new(parse_field_descriptor(descriptor)?);
        Ok(Self {
            root: Root::Annotation,
            stack: vec![ValueFrame::InNestedAnnotation { name: None, annotation }],
            result: None,
            complete: false,
        })
    }

    /// Whether an array or nested annotation is open below the top level.
    pub fn is_nested(&self) -> bool {
        match self.root {
            Root::Single => !self.stack.is_empty(),
            Root::Annotation => self.stack.len() > 1,
        }
    }

    /// The innermost open compound value, if any.
    pub fn top(&self) -> Option<&ValueFrame> {
        self.stack.last()
    }

    pub fn accept(&mut self, event: ClassEvent) -> StubResult<Progress> {
        if self.complete {
            return Err(StubError::consistency(format!(
                "{} after the value was complete",
                event.label()
            )));
        }
        match event {
            ClassEvent::Scalar { name, value } => self.add(name, SymbolicValue::Scalar(value))?,
            ClassEvent::EnumValue {
                name,
                descriptor,
                constant,
            } => {
                let ty = parse_field_descriptor(&descriptor)?;
                self.add(name, SymbolicValue::EnumConstant { ty, name: constant })?;
            }
            ClassEvent::ClassValue { name, descriptor } => {
                let ty = parse_field_descriptor(&descriptor)?;
                self.add(name, SymbolicValue::ClassLiteral(ty))?;
            }
            ClassEvent::ArrayStart { name } => {
                self.stack.push(ValueFrame::InArrayValue {
                    name,
                    items: Vec::new(),
                });
            }
            ClassEvent::NestedAnnotationStart { name, descriptor } => {
                let annotation = SymbolicAnnotation::new(parse_field_descriptor(&descriptor)?);
                self.stack.push(ValueFrame::InNestedAnnotation { name, annotation });
            }
            ClassEvent::ValueEnd => return self.end(),
            other => {
                return Err(StubError::consistency(format!(
                    "{} inside an annotation value",
                    other.label()
                )));
            }
        }
        Ok(Progress::Open)
    }

    fn end(&mut self) -> StubResult<Progress> {
        match self.stack.pop() {
            Some(frame) => {
                let (name, value) = frame.close();
                if self.stack.is_empty() && self.root == Root::Annotation {
                    self.result = Some(value);
                    self.complete = true;
                    return Ok(Progress::Complete);
                }
                self.add(name, value)?;
                Ok(Progress::Open)
            }
            None if self.root == Root::Single => {
                self.complete = true;
                Ok(Progress::Complete)
            }
            None => Err(StubError::consistency("unbalanced end of annotation value")),
        }
    }

    fn add(&mut self, name: Option<SmolStr>, value: SymbolicValue) -> StubResult<()> {
        match (self.stack.last_mut(), name) {
            (Some(ValueFrame::InArrayValue { items, .. }), None) => items.push(value),
            (Some(ValueFrame::InNestedAnnotation { annotation, .. }), Some(name)) => {
                if annotation.insert(name.clone(), value).is_some() {
                    return Err(StubError::malformed(0, format!("duplicate annotation element `{name}`")));
                }
            }
            (None, None) if self.result.is_none() => self.result = Some(value),
            (None, None) => {
                return Err(StubError::consistency("more than one value for an annotation default"));
            }
            (Some(ValueFrame::InArrayValue { .. }), Some(name)) => {
                return Err(StubError::consistency(format!("named element `{name}` inside an array")));
            }
            (_, None) | (None, Some(_)) => {
                return Err(StubError::consistency("unnamed element inside an annotation"));
            }
        }
        Ok(())
    }

    /// Freezes the accumulated value.
    pub fn finish(self) -> StubResult<SymbolicValue> {
        if !self.stack.is_empty() {
            return Err(StubError::consistency(format!(
                "value finished with {} unterminated compound values",
                self.stack.len()
            )));
        }
        self.result
            .ok_or_else(|| StubError::consistency("value finished with no content"))
    }
}
