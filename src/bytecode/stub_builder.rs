//! Turns the event stream of one class file into a [`ClassStub`].

use std::sync::Arc;

use smol_str::SmolStr;

use super::descriptor::{parse_field_descriptor, parse_method_descriptor};
use super::error::{StubError, StubResult};
use super::event::{ClassEvent, ClassVersion, ClassVisitor};
use super::stub::{AnnotationUse, ClassStub, ExecutableStub, FieldStub, MemberTypeStub};
use super::value_builder::{Progress, SymbolicValueBuilder, ValueFrame};
use crate::base::{internal_to_binary, simple_name_of};
use crate::symbols::{
    JMethodSymbol, JTypeSymbol, JVariableSymbol, MethodKind, Modifiers, ScalarValue, SymbolOrigin,
    SymbolicValue, TypeKind, TypeRef, VariableKind,
};

/// Where the builder is in the event grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderState {
    AwaitingClass,
    InClass,
    InField,
    InMethod,
    /// Inside an annotation or annotation default, at its top level.
    InAnnotationValue,
    InArrayValue,
    InNestedAnnotation,
    Finished,
}

#[derive(Debug)]
struct ClassDraft {
    version: ClassVersion,
    access: u16,
    kind: TypeKind,
    internal_name: SmolStr,
    binary_name: SmolStr,
    super_name: Option<SmolStr>,
    interfaces: Vec<SmolStr>,
    signature: Option<SmolStr>,
    annotations: Vec<AnnotationUse>,
    /// `InnerClasses` entry describing this class itself.
    own_entry: Option<(Option<SmolStr>, Option<SmolStr>, u16)>,
    member_types: Vec<MemberTypeStub>,
    fields: Vec<FieldStub>,
    methods: Vec<ExecutableStub>,
}

#[derive(Debug)]
struct FieldDraft {
    access: u16,
    name: SmolStr,
    descriptor: SmolStr,
    type_ref: TypeRef,
    signature: Option<SmolStr>,
    constant: Option<ScalarValue>,
    annotations: Vec<AnnotationUse>,
}

#[derive(Debug)]
struct MethodDraft {
    access: u16,
    name: SmolStr,
    descriptor: SmolStr,
    parameter_types: Vec<TypeRef>,
    return_type: TypeRef,
    signature: Option<SmolStr>,
    exceptions: Vec<SmolStr>,
    annotations: Vec<AnnotationUse>,
    declares_default: bool,
    default_value: Option<SymbolicValue>,
}

/// The member an open annotation value belongs to.
#[derive(Debug)]
enum Owner {
    Class,
    Field(FieldDraft),
    Method(MethodDraft),
}

#[derive(Clone, Copy, Debug)]
enum ValueTarget {
    Default,
    Annotation { visible: bool },
}

#[derive(Debug)]
enum State {
    AwaitingClass,
    InClass,
    InField(FieldDraft),
    InMethod(MethodDraft),
    InAnnotationValue {
        owner: Owner,
        target: ValueTarget,
        builder: SymbolicValueBuilder,
    },
    Finished,
}

/// A [`ClassVisitor`] that assembles a [`ClassStub`].
///
/// Every event that the grammar in [`event`](super::event) does not allow
/// in the current state is an internal consistency violation: the parser
/// only ever produces well-formed streams. After an error the builder is
/// unusable.
#[derive(Debug)]
pub struct StubBuilder {
    state: State,
    class: Option<ClassDraft>,
    stub: Option<ClassStub>,
}

impl Default for StubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StubBuilder {
    pub fn new() -> Self {
        Self {
            state: State::AwaitingClass,
            class: None,
            stub: None,
        }
    }

    pub fn state(&self) -> BuilderState {
        match &self.state {
            State::AwaitingClass => BuilderState::AwaitingClass,
            State::InClass => BuilderState::InClass,
            State::InField(_) => BuilderState::InField,
            State::InMethod(_) => BuilderState::InMethod,
            State::InAnnotationValue { builder, .. } if !builder.is_nested() => BuilderState::InAnnotationValue,
            State::InAnnotationValue { builder, .. } => match builder.top() {
                Some(ValueFrame::InArrayValue { .. }) => BuilderState::InArrayValue,
                _ => BuilderState::InNestedAnnotation,
            },
            State::Finished => BuilderState::Finished,
        }
    }

    /// The finished stub. Fails unless `ClassEnd` was seen.
    pub fn finish(mut self) -> StubResult<ClassStub> {
        self.stub
            .take()
            .ok_or_else(|| StubError::consistency("class stub requested before ClassEnd"))
    }

    fn class_mut(&mut self) -> StubResult<&mut ClassDraft> {
        self.class
            .as_mut()
            .ok_or_else(|| StubError::consistency("member event before ClassStart"))
    }

    fn unexpected(state: &State, event: &ClassEvent) -> StubError {
        let at = match state {
            State::AwaitingClass => "before ClassStart",
            State::InClass => "in class",
            State::InField(_) => "in field",
            State::InMethod(_) => "in method",
            State::InAnnotationValue { .. } => "in annotation value",
            State::Finished => "after ClassEnd",
        };
        StubError::consistency(format!("unexpected {} {at}", event.label()))
    }

    fn step(&mut self, state: State, event: ClassEvent) -> StubResult<State> {
        match (state, event) {
            (
                State::AwaitingClass,
                ClassEvent::ClassStart {
                    version,
                    access,
                    name,
                    super_name,
                    interfaces,
                },
            ) => {
                tracing::trace!(class = %name, "building class stub");
                self.class = Some(ClassDraft {
                    version,
                    access,
                    kind: TypeKind::from_class_access(access, super_name.as_deref()),
                    binary_name: internal_to_binary(&name),
                    internal_name: name,
                    super_name: super_name.as_deref().map(internal_to_binary),
                    interfaces: interfaces.iter().map(|i| internal_to_binary(i)).collect(),
                    signature: None,
                    annotations: Vec::new(),
                    own_entry: None,
                    member_types: Vec::new(),
                    fields: Vec::new(),
                    methods: Vec::new(),
                });
                Ok(State::InClass)
            }

            // ---------------------------------------------------------- class
            (State::InClass, ClassEvent::FieldStart { access, name, descriptor }) => {
                let type_ref = parse_field_descriptor(&descriptor)?;
                Ok(State::InField(FieldDraft {
                    access,
                    name,
                    descriptor,
                    type_ref,
                    signature: None,
                    constant: None,
                    annotations: Vec::new(),
                }))
            }
            (State::InClass, ClassEvent::MethodStart { access, name, descriptor }) => {
                let parsed = parse_method_descriptor(&descriptor)?;
                Ok(State::InMethod(MethodDraft {
                    access,
                    name,
                    descriptor,
                    parameter_types: parsed.parameters,
                    return_type: parsed.return_type,
                    signature: None,
                    exceptions: Vec::new(),
                    annotations: Vec::new(),
                    declares_default: false,
                    default_value: None,
                }))
            }
            (
                State::InClass,
                ClassEvent::InnerClass {
                    inner,
                    outer,
                    simple_name,
                    access,
                },
            ) => {
                let class = self.class_mut()?;
                if inner == class.internal_name {
                    class.own_entry = Some((outer, simple_name, access));
                } else if let (Some(outer), Some(simple_name)) = (outer, simple_name) {
                    if outer == class.internal_name {
                        class.member_types.push(MemberTypeStub {
                            binary_name: internal_to_binary(&inner),
                            simple_name,
                            access,
                        });
                    }
                }
                Ok(State::InClass)
            }
            (State::InClass, ClassEvent::Signature(signature)) => {
                self.class_mut()?.signature = Some(signature);
                Ok(State::InClass)
            }
            (State::InClass, ClassEvent::AnnotationStart { descriptor, visible }) => {
                annotation_state(Owner::Class, &descriptor, visible)
            }
            (State::InClass, ClassEvent::ClassEnd) => {
                let class = self
                    .class
                    .take()
                    .ok_or_else(|| StubError::consistency("ClassEnd without ClassStart"))?;
                self.stub = Some(class.build());
                Ok(State::Finished)
            }

            // ---------------------------------------------------------- field
            (State::InField(mut field), ClassEvent::FieldConstant(value)) => {
                if field.constant.replace(value).is_some() {
                    return Err(StubError::malformed(
                        0,
                        format!("field `{}` has more than one ConstantValue", field.name),
                    ));
                }
                Ok(State::InField(field))
            }
            (State::InField(mut field), ClassEvent::Signature(signature)) => {
                field.signature = Some(signature);
                Ok(State::InField(field))
            }
            (State::InField(field), ClassEvent::AnnotationStart { descriptor, visible }) => {
                annotation_state(Owner::Field(field), &descriptor, visible)
            }
            (State::InField(field), ClassEvent::FieldEnd) => {
                let class = self.class_mut()?;
                let stub = field.build(&class.binary_name);
                class.fields.push(stub);
                Ok(State::InClass)
            }

            // --------------------------------------------------------- method
            (State::InMethod(mut method), ClassEvent::Exceptions(thrown)) => {
                method.exceptions = thrown.iter().map(|t| internal_to_binary(t)).collect();
                Ok(State::InMethod(method))
            }
            (State::InMethod(mut method), ClassEvent::Signature(signature)) => {
                method.signature = Some(signature);
                Ok(State::InMethod(method))
            }
            (State::InMethod(method), ClassEvent::AnnotationStart { descriptor, visible }) => {
                annotation_state(Owner::Method(method), &descriptor, visible)
            }
            (State::InMethod(mut method), ClassEvent::AnnotationDefault) => {
                if method.declares_default {
                    return Err(StubError::malformed(
                        0,
                        format!("method `{}` has more than one AnnotationDefault", method.name),
                    ));
                }
                method.declares_default = true;
                Ok(State::InAnnotationValue {
                    owner: Owner::Method(method),
                    target: ValueTarget::Default,
                    builder: SymbolicValueBuilder::for_default(),
                })
            }
            (State::InMethod(method), ClassEvent::MethodEnd) => {
                if method.declares_default && method.default_value.is_none() {
                    return Err(StubError::consistency(format!(
                        "method `{}` declares a default but none was built",
                        method.name
                    )));
                }
                let class = self.class_mut()?;
                let stub = method.build(&class.binary_name);
                class.methods.push(stub);
                Ok(State::InClass)
            }

            // ---------------------------------------------------------- value
            (
                State::InAnnotationValue {
                    owner,
                    target,
                    mut builder,
                },
                event,
            ) => match builder.accept(event)? {
                Progress::Open => Ok(State::InAnnotationValue { owner, target, builder }),
                Progress::Complete => self.close_value(owner, target, builder.finish()?),
            },

            (state, event) => Err(Self::unexpected(&state, &event)),
        }
    }

    fn close_value(&mut self, owner: Owner, target: ValueTarget, value: SymbolicValue) -> StubResult<State> {
        match target {
            ValueTarget::Default => match owner {
                Owner::Method(mut method) => {
                    method.default_value = Some(value);
                    Ok(State::InMethod(method))
                }
                _ => Err(StubError::consistency("annotation default outside a method")),
            },
            ValueTarget::Annotation { visible } => {
                let SymbolicValue::Annotation(annotation) = value else {
                    return Err(StubError::consistency("annotation usage built a non-annotation value"));
                };
                let usage = AnnotationUse { annotation, visible };
                Ok(match owner {
                    Owner::Class => {
                        self.class_mut()?.annotations.push(usage);
                        State::InClass
                    }
                    Owner::Field(mut field) => {
                        field.annotations.push(usage);
                        State::InField(field)
                    }
                    Owner::Method(mut method) => {
                        method.annotations.push(usage);
                        State::InMethod(method)
                    }
                })
            }
        }
    }
}

impl ClassVisitor for StubBuilder {
    fn visit(&mut self, event: ClassEvent) -> StubResult<()> {
        let state = std::mem::replace(&mut self.state, State::Finished);
        self.state = self.step(state, event)?;
        Ok(())
    }
}

fn annotation_state(owner: Owner, descriptor: &str, visible: bool) -> StubResult<State> {
    Ok(State::InAnnotationValue {
        owner,
        target: ValueTarget::Annotation { visible },
        builder: SymbolicValueBuilder::for_annotation(descriptor)?,
    })
}

impl FieldDraft {
    fn build(self, owner: &SmolStr) -> FieldStub {
        let symbol = Arc::new(JVariableSymbol {
            name: self.name.clone(),
            kind: VariableKind::from_field_access(self.access),
            modifiers: Modifiers::from_field_access(self.access),
            type_ref: Some(self.type_ref.clone()),
            constant: self.constant.clone(),
            origin: SymbolOrigin::Stub {
                owner: owner.clone(),
                name: self.name.clone(),
                descriptor: self.descriptor.clone(),
            },
        });
        FieldStub {
            name: self.name,
            descriptor: self.descriptor,
            type_ref: self.type_ref,
            signature: self.signature,
            access: self.access,
            constant_value: self.constant,
            annotations: self.annotations,
            symbol,
        }
    }
}

impl MethodDraft {
    fn build(self, owner: &SmolStr) -> ExecutableStub {
        let constructor = self.name == "<init>";
        let symbol = Arc::new(JMethodSymbol {
            name: self.name.clone(),
            kind: if constructor {
                MethodKind::Constructor
            } else {
                MethodKind::Method
            },
            modifiers: Modifiers::from_method_access(self.access),
            parameter_types: self.parameter_types.clone(),
            return_type: (!constructor).then(|| self.return_type.clone()),
            declaring_type: owner.clone(),
            default_value: self.default_value.clone(),
            origin: SymbolOrigin::Stub {
                owner: owner.clone(),
                name: self.name.clone(),
                descriptor: self.descriptor.clone(),
            },
        });
        ExecutableStub {
            name: self.name,
            descriptor: self.descriptor,
            parameter_types: self.parameter_types,
            return_type: self.return_type,
            signature: self.signature,
            access: self.access,
            exceptions: self.exceptions,
            annotations: self.annotations,
            default_value: self.default_value,
            symbol,
        }
    }
}

impl ClassDraft {
    fn build(self) -> ClassStub {
        let kind = self.kind;
        // member classes take their modifiers and simple name from their
        // own InnerClasses entry
        let (enclosing, simple_name, modifiers) = match &self.own_entry {
            Some((outer, simple, access)) => (
                outer.as_deref().map(internal_to_binary),
                simple.clone(),
                Modifiers::from_class_access(*access),
            ),
            None => (None, None, Modifiers::from_class_access(self.access)),
        };
        let name = simple_name.unwrap_or_else(|| simple_name_of(&self.binary_name).into());
        let symbol = Arc::new(JTypeSymbol {
            name,
            binary_name: self.binary_name.clone(),
            kind,
            modifiers,
            origin: SymbolOrigin::Stub {
                owner: self.binary_name.clone(),
                name: simple_name_of(&self.binary_name).into(),
                descriptor: SmolStr::from(format!("L{};", self.internal_name)),
            },
        });
        tracing::trace!(
            class = %self.binary_name,
            fields = self.fields.len(),
            methods = self.methods.len(),
            "built class stub"
        );
        ClassStub {
            binary_name: self.binary_name,
            internal_name: self.internal_name,
            version: self.version,
            access: self.access,
            kind,
            signature: self.signature,
            super_name: self.super_name,
            interfaces: self.interfaces,
            enclosing,
            annotations: self.annotations,
            member_types: self.member_types,
            fields: self.fields,
            methods: self.methods,
            symbol,
        }
    }
}
