//! Stub extraction from class bytes
//!
//! Checks that annotation defaults, field constants, enum constants and
//! member classes come out of real class-file layouts intact.

mod common;

use common::classgen::{
    ACC_ABSTRACT, ACC_ENUM, ACC_FINAL, ACC_PUBLIC, ACC_STATIC, ClassGen, Constant, ElementValue, Member,
};
use jsym::bytecode::ClassStub;
use jsym::symbols::{ScalarValue, SymbolicValue, TypeKind, VariableKind};
use rstest::rstest;

const ABSTRACT: u16 = ACC_PUBLIC | ACC_ABSTRACT;
const CONSTANT: u16 = ACC_PUBLIC | ACC_STATIC | ACC_FINAL;

fn annot_with_defaults() -> ClassStub {
    let bytes = ClassGen::annotation("p/AnnotWithDefaults")
        .method(Member::new(ABSTRACT, "xs", "()[I").default_value(ElementValue::Array(vec![
            ElementValue::Int(1),
            ElementValue::Int(2),
            ElementValue::Int(3),
        ])))
        .method(Member::new(ABSTRACT, "e", "()Lp/MyEnum;").default_value(ElementValue::Enum("Lp/MyEnum;", "AA")))
        .method(Member::new(ABSTRACT, "s", "()Ljava/lang/String;").default_value(ElementValue::Str("ddd")))
        .method(
            Member::new(ABSTRACT, "ss", "()[Ljava/lang/String;")
                .default_value(ElementValue::Array(vec![ElementValue::Str("a"), ElementValue::Str("b")])),
        )
        .method(Member::new(ABSTRACT, "empty", "()[I").default_value(ElementValue::Array(vec![])))
        .method(
            Member::new(ABSTRACT, "es", "()[Lp/MyEnum;").default_value(ElementValue::Array(vec![
                ElementValue::Enum("Lp/MyEnum;", "AA"),
                ElementValue::Enum("Lp/MyEnum;", "BB"),
            ])),
        )
        .method(Member::new(ABSTRACT, "noDefault", "()I"))
        .bytes();
    ClassStub::from_bytes(&bytes).unwrap()
}

fn default_of<'a>(stub: &'a ClassStub, name: &'a str) -> Option<&'a SymbolicValue> {
    stub.methods_named(name).next().unwrap().default_value.as_ref()
}

#[test]
fn test_annotation_type_shape() {
    let stub = annot_with_defaults();
    assert_eq!(stub.binary_name, "p.AnnotWithDefaults");
    assert_eq!(stub.kind, TypeKind::Annotation);
    assert_eq!(stub.methods.len(), 7);
    assert_eq!(stub.interfaces, vec!["java.lang.annotation.Annotation"]);
}

#[test]
fn test_int_array_default() {
    let stub = annot_with_defaults();
    assert_eq!(
        default_of(&stub, "xs"),
        Some(&SymbolicValue::Array(vec![
            SymbolicValue::int(1),
            SymbolicValue::int(2),
            SymbolicValue::int(3),
        ]))
    );
}

#[test]
fn test_enum_default() {
    let stub = annot_with_defaults();
    assert_eq!(default_of(&stub, "e"), Some(&SymbolicValue::enum_constant("p.MyEnum", "AA")));
}

#[test]
fn test_string_defaults() {
    let stub = annot_with_defaults();
    assert_eq!(default_of(&stub, "s"), Some(&SymbolicValue::string("ddd")));
    assert_eq!(
        default_of(&stub, "ss"),
        Some(&SymbolicValue::Array(vec![SymbolicValue::string("a"), SymbolicValue::string("b")]))
    );
}

#[test]
fn test_empty_and_enum_array_defaults() {
    let stub = annot_with_defaults();
    assert_eq!(default_of(&stub, "empty"), Some(&SymbolicValue::Array(vec![])));
    assert_eq!(
        default_of(&stub, "es"),
        Some(&SymbolicValue::Array(vec![
            SymbolicValue::enum_constant("p.MyEnum", "AA"),
            SymbolicValue::enum_constant("p.MyEnum", "BB"),
        ]))
    );
}

#[test]
fn test_element_without_default() {
    let stub = annot_with_defaults();
    assert_eq!(default_of(&stub, "noDefault"), None);
}

#[test]
fn test_method_symbol_carries_default() {
    let stub = annot_with_defaults();
    let xs = stub.methods_named("xs").next().unwrap();
    assert_eq!(xs.symbol().default_value, xs.default_value);
    assert_eq!(xs.symbol().declaring_type, "p.AnnotWithDefaults");
    assert_eq!(xs.symbol().return_type.as_ref().unwrap().binary_name(), "int[]");
}

#[test]
fn test_field_constants() {
    let bytes = ClassGen::class("p/Limits")
        .field(Member::new(CONSTANT, "MAX", "I").constant(Constant::Int(10)))
        .field(Member::new(CONSTANT, "NAME", "Ljava/lang/String;").constant(Constant::Str("limits")))
        .field(Member::new(ACC_PUBLIC, "plain", "I"))
        .bytes();
    let stub = ClassStub::from_bytes(&bytes).unwrap();

    assert_eq!(stub.field("MAX").unwrap().constant_value, Some(ScalarValue::Int(10)));
    assert_eq!(
        stub.field("NAME").unwrap().symbol().constant,
        Some(ScalarValue::String("limits".into()))
    );
    assert_eq!(stub.field("plain").unwrap().constant_value, None);
}

#[test]
fn test_enum_constants() {
    let enum_flags = ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM;
    let bytes = ClassGen::enumeration("p/MyEnum")
        .field(Member::new(enum_flags, "AA", "Lp/MyEnum;"))
        .field(Member::new(enum_flags, "BB", "Lp/MyEnum;"))
        .bytes();
    let stub = ClassStub::from_bytes(&bytes).unwrap();

    assert_eq!(stub.kind, TypeKind::Enum);
    let kinds: Vec<_> = stub.fields.iter().map(|f| f.symbol().kind).collect();
    assert_eq!(kinds, vec![VariableKind::EnumConstant, VariableKind::EnumConstant]);
}

#[test]
fn test_field_annotation_with_nested_values() {
    let bytes = ClassGen::class("p/Holder")
        .field(Member::new(ACC_PUBLIC, "f", "I").annotated(
            "Lp/Marker;",
            vec![
                ("kind", ElementValue::Class("Ljava/util/List;")),
                ("inner", ElementValue::Annotation("Lp/Inner;", vec![("value", ElementValue::Int(7))])),
            ],
        ))
        .bytes();
    let stub = ClassStub::from_bytes(&bytes).unwrap();

    let uses = &stub.field("f").unwrap().annotations;
    assert_eq!(uses.len(), 1);
    assert!(uses[0].visible);
    let annotation = &uses[0].annotation;
    assert!(matches!(
        annotation.get("kind"),
        Some(SymbolicValue::ClassLiteral(t)) if t.binary_name() == "java.util.List"
    ));
    let Some(SymbolicValue::Annotation(inner)) = annotation.get("inner") else {
        panic!("expected nested annotation");
    };
    assert_eq!(inner.get("value"), Some(&SymbolicValue::int(7)));
}

#[test]
fn test_member_classes() {
    let bytes = ClassGen::class("p/Outer")
        .inner_class("p/Outer$Inner", Some("p/Outer"), Some("Inner"), ACC_PUBLIC | ACC_STATIC)
        .bytes();
    let outer = ClassStub::from_bytes(&bytes).unwrap();
    assert_eq!(outer.member_type("Inner").unwrap().binary_name, "p.Outer$Inner");

    let bytes = ClassGen::class("p/Outer$Inner")
        .inner_class("p/Outer$Inner", Some("p/Outer"), Some("Inner"), ACC_PUBLIC | ACC_STATIC)
        .bytes();
    let inner = ClassStub::from_bytes(&bytes).unwrap();
    assert_eq!(inner.simple_name(), "Inner");
    assert_eq!(inner.enclosing.as_deref(), Some("p.Outer"));
}

#[rstest]
#[case::byte("()B", ElementValue::Byte(-3), ScalarValue::Byte(-3))]
#[case::char("()C", ElementValue::Char('x'), ScalarValue::Char('x'))]
#[case::short("()S", ElementValue::Short(300), ScalarValue::Short(300))]
#[case::boolean("()Z", ElementValue::Bool(true), ScalarValue::Boolean(true))]
#[case::int("()I", ElementValue::Int(-7), ScalarValue::Int(-7))]
#[case::long("()J", ElementValue::Long(1 << 40), ScalarValue::Long(1 << 40))]
#[case::float("()F", ElementValue::Float(1.5), ScalarValue::Float(1.5))]
#[case::double("()D", ElementValue::Double(-2.25), ScalarValue::Double(-2.25))]
fn test_scalar_element_defaults(
    #[case] descriptor: &'static str,
    #[case] default: ElementValue,
    #[case] expected: ScalarValue,
) {
    let bytes = ClassGen::annotation("p/Scalars")
        .method(Member::new(ABSTRACT, "value", descriptor).default_value(default))
        .bytes();
    let stub = ClassStub::from_bytes(&bytes).unwrap();
    assert_eq!(default_of(&stub, "value"), Some(&SymbolicValue::Scalar(expected)));
}

#[rstest]
#[case::boolean("Z", Constant::Int(1), ScalarValue::Boolean(true))]
#[case::char("C", Constant::Int('q' as i32), ScalarValue::Char('q'))]
#[case::byte("B", Constant::Int(-1), ScalarValue::Byte(-1))]
#[case::short("S", Constant::Int(-300), ScalarValue::Short(-300))]
#[case::long("J", Constant::Long(-1 << 40), ScalarValue::Long(-1 << 40))]
#[case::float("F", Constant::Float(0.25), ScalarValue::Float(0.25))]
#[case::double("D", Constant::Double(1e300), ScalarValue::Double(1e300))]
fn test_field_constant_per_descriptor(
    #[case] descriptor: &'static str,
    #[case] constant: Constant,
    #[case] expected: ScalarValue,
) {
    let bytes = ClassGen::class("p/Constants")
        .field(Member::new(CONSTANT, "C", descriptor).constant(constant))
        .bytes();
    let stub = ClassStub::from_bytes(&bytes).unwrap();
    assert_eq!(stub.field("C").unwrap().constant_value, Some(expected));
}

#[test]
fn test_wide_constants_keep_pool_indices_aligned() {
    // every long and double takes two pool slots; later entries must still
    // resolve
    let bytes = ClassGen::class("p/Wide")
        .field(Member::new(CONSTANT, "A", "J").constant(Constant::Long(1)))
        .field(Member::new(CONSTANT, "B", "D").constant(Constant::Double(2.0)))
        .field(Member::new(CONSTANT, "C", "J").constant(Constant::Long(3)))
        .field(Member::new(CONSTANT, "D", "Ljava/lang/String;").constant(Constant::Str("after")))
        .method(Member::new(ACC_PUBLIC, "last", "()V"))
        .bytes();
    let stub = ClassStub::from_bytes(&bytes).unwrap();

    let constants: Vec<_> = stub.fields.iter().map(|f| f.constant_value.clone()).collect();
    assert_eq!(
        constants,
        vec![
            Some(ScalarValue::Long(1)),
            Some(ScalarValue::Double(2.0)),
            Some(ScalarValue::Long(3)),
            Some(ScalarValue::String("after".into())),
        ]
    );
    assert_eq!(stub.methods_named("last").count(), 1);
}
