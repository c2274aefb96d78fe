//! Minimal class-file writer for tests.
//!
//! Emits just the structures the stub extractor reads: constant pool,
//! fields (with `ConstantValue`), methods (with `AnnotationDefault`),
//! `RuntimeVisibleAnnotations` and `InnerClasses`.

#![allow(dead_code)]

use rustc_hash::FxHashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

#[derive(Clone, Debug)]
pub enum ElementValue {
    Byte(i8),
    Char(char),
    Short(i16),
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(&'static str),
    /// Descriptor of the enum type and the constant name.
    Enum(&'static str, &'static str),
    Class(&'static str),
    Array(Vec<ElementValue>),
    Annotation(&'static str, Vec<(&'static str, ElementValue)>),
}

#[derive(Clone, Debug)]
pub enum Constant {
    /// Stored as an Integer entry, like `byte`, `char`, `short` and
    /// `boolean` constants are.
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(&'static str),
}

#[derive(Clone, Debug)]
pub struct Member {
    access: u16,
    name: &'static str,
    descriptor: &'static str,
    constant: Option<Constant>,
    default: Option<ElementValue>,
    annotations: Vec<(&'static str, Vec<(&'static str, ElementValue)>)>,
}

impl Member {
    pub fn new(access: u16, name: &'static str, descriptor: &'static str) -> Self {
        Self {
            access,
            name,
            descriptor,
            constant: None,
            default: None,
            annotations: Vec::new(),
        }
    }

    pub fn constant(mut self, value: Constant) -> Self {
        self.constant = Some(value);
        self
    }

    pub fn default_value(mut self, value: ElementValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn annotated(mut self, descriptor: &'static str, elements: Vec<(&'static str, ElementValue)>) -> Self {
        self.annotations.push((descriptor, elements));
        self
    }
}

#[derive(Clone, Debug)]
pub struct ClassGen {
    access: u16,
    name: &'static str,
    super_name: Option<&'static str>,
    interfaces: Vec<&'static str>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    /// (inner, outer, simple name, access)
    inner_classes: Vec<(&'static str, Option<&'static str>, Option<&'static str>, u16)>,
    major: u16,
}

impl ClassGen {
    pub fn class(name: &'static str) -> Self {
        Self {
            access: ACC_PUBLIC,
            name,
            super_name: Some("java/lang/Object"),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            major: 52,
        }
    }

    pub fn annotation(name: &'static str) -> Self {
        Self::class(name)
            .access(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT | ACC_ANNOTATION)
            .implements("java/lang/annotation/Annotation")
    }

    pub fn enumeration(name: &'static str) -> Self {
        Self::class(name)
            .access(ACC_PUBLIC | ACC_FINAL | ACC_ENUM)
            .extends("java/lang/Enum")
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn extends(mut self, super_name: &'static str) -> Self {
        self.super_name = Some(super_name);
        self
    }

    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn implements(mut self, interface: &'static str) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn major(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn field(mut self, field: Member) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: Member) -> Self {
        self.methods.push(method);
        self
    }

    pub fn inner_class(
        mut self,
        inner: &'static str,
        outer: Option<&'static str>,
        simple_name: Option<&'static str>,
        access: u16,
    ) -> Self {
        self.inner_classes.push((inner, outer, simple_name, access));
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        put_u16(&mut body, self.access);
        put_u16(&mut body, pool.class(self.name));
        put_u16(&mut body, self.super_name.map_or(0, |s| pool.class(s)));
        put_u16(&mut body, self.interfaces.len() as u16);
        for i in &self.interfaces {
            put_u16(&mut body, pool.class(i));
        }

        put_u16(&mut body, self.fields.len() as u16);
        for f in &self.fields {
            member(&mut pool, &mut body, f);
        }
        put_u16(&mut body, self.methods.len() as u16);
        for m in &self.methods {
            member(&mut pool, &mut body, m);
        }

        if self.inner_classes.is_empty() {
            put_u16(&mut body, 0);
        } else {
            put_u16(&mut body, 1);
            let mut attr = Vec::new();
            put_u16(&mut attr, self.inner_classes.len() as u16);
            for (inner, outer, simple, access) in &self.inner_classes {
                put_u16(&mut attr, pool.class(inner));
                put_u16(&mut attr, outer.map_or(0, |o| pool.class(o)));
                put_u16(&mut attr, simple.map_or(0, |s| pool.utf8(s)));
                put_u16(&mut attr, *access);
            }
            attribute(&mut pool, &mut body, "InnerClasses", &attr);
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        put_u16(&mut out, 0);
        put_u16(&mut out, self.major);
        put_u16(&mut out, pool.count());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

fn member(pool: &mut Pool, out: &mut Vec<u8>, m: &Member) {
    put_u16(out, m.access);
    put_u16(out, pool.utf8(m.name));
    put_u16(out, pool.utf8(m.descriptor));

    let mut attributes: Vec<(&str, Vec<u8>)> = Vec::new();
    if let Some(c) = &m.constant {
        let index = match c {
            Constant::Int(v) => pool.integer(*v),
            Constant::Long(v) => pool.long(*v),
            Constant::Float(v) => pool.float(*v),
            Constant::Double(v) => pool.double(*v),
            Constant::Str(s) => pool.string(s),
        };
        attributes.push(("ConstantValue", index.to_be_bytes().to_vec()));
    }
    if let Some(v) = &m.default {
        let mut attr = Vec::new();
        element_value(pool, &mut attr, v);
        attributes.push(("AnnotationDefault", attr));
    }
    if !m.annotations.is_empty() {
        let mut attr = Vec::new();
        put_u16(&mut attr, m.annotations.len() as u16);
        for (descriptor, elements) in &m.annotations {
            annotation(pool, &mut attr, descriptor, elements);
        }
        attributes.push(("RuntimeVisibleAnnotations", attr));
    }

    put_u16(out, attributes.len() as u16);
    for (name, body) in attributes {
        attribute(pool, out, name, &body);
    }
}

fn attribute(pool: &mut Pool, out: &mut Vec<u8>, name: &str, body: &[u8]) {
    put_u16(out, pool.utf8(name));
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
}

fn annotation(pool: &mut Pool, out: &mut Vec<u8>, descriptor: &str, elements: &[(&str, ElementValue)]) {
    put_u16(out, pool.utf8(descriptor));
    put_u16(out, elements.len() as u16);
    for (name, value) in elements {
        put_u16(out, pool.utf8(name));
        element_value(pool, out, value);
    }
}

fn element_value(pool: &mut Pool, out: &mut Vec<u8>, value: &ElementValue) {
    match value {
        ElementValue::Byte(v) => {
            out.push(b'B');
            put_u16(out, pool.integer(*v as i32));
        }
        ElementValue::Char(v) => {
            out.push(b'C');
            put_u16(out, pool.integer(*v as i32));
        }
        ElementValue::Short(v) => {
            out.push(b'S');
            put_u16(out, pool.integer(*v as i32));
        }
        ElementValue::Bool(v) => {
            out.push(b'Z');
            put_u16(out, pool.integer(*v as i32));
        }
        ElementValue::Int(v) => {
            out.push(b'I');
            put_u16(out, pool.integer(*v));
        }
        ElementValue::Long(v) => {
            out.push(b'J');
            put_u16(out, pool.long(*v));
        }
        ElementValue::Float(v) => {
            out.push(b'F');
            put_u16(out, pool.float(*v));
        }
        ElementValue::Double(v) => {
            out.push(b'D');
            put_u16(out, pool.double(*v));
        }
        ElementValue::Str(s) => {
            out.push(b's');
            put_u16(out, pool.utf8(s));
        }
        ElementValue::Enum(descriptor, constant) => {
            out.push(b'e');
            put_u16(out, pool.utf8(descriptor));
            put_u16(out, pool.utf8(constant));
        }
        ElementValue::Class(descriptor) => {
            out.push(b'c');
            put_u16(out, pool.utf8(descriptor));
        }
        ElementValue::Array(items) => {
            out.push(b'[');
            put_u16(out, items.len() as u16);
            for item in items {
                element_value(pool, out, item);
            }
        }
        ElementValue::Annotation(descriptor, elements) => {
            out.push(b'@');
            annotation(pool, out, descriptor, elements);
        }
    }
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    next: u16,
    seen: FxHashMap<(u8, Vec<u8>), u16>,
}

impl Pool {
    fn count(&self) -> u16 {
        self.next + 1
    }

    fn add(&mut self, tag: u8, payload: Vec<u8>) -> u16 {
        if let Some(&index) = self.seen.get(&(tag, payload.clone())) {
            return index;
        }
        self.next += 1;
        let index = self.next;
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&payload);
        self.seen.insert((tag, payload), index);
        // longs and doubles take two slots
        if tag == 5 || tag == 6 {
            self.next += 1;
        }
        index
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let mut payload = (s.len() as u16).to_be_bytes().to_vec();
        payload.extend_from_slice(s.as_bytes());
        self.add(1, payload)
    }

    fn integer(&mut self, v: i32) -> u16 {
        self.add(3, v.to_be_bytes().to_vec())
    }

    fn float(&mut self, v: f32) -> u16 {
        self.add(4, v.to_bits().to_be_bytes().to_vec())
    }

    fn long(&mut self, v: i64) -> u16 {
        self.add(5, v.to_be_bytes().to_vec())
    }

    fn double(&mut self, v: f64) -> u16 {
        self.add(6, v.to_bits().to_be_bytes().to_vec())
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        let name = self.utf8(internal_name);
        self.add(7, name.to_be_bytes().to_vec())
    }

    fn string(&mut self, s: &str) -> u16 {
        let utf8 = self.utf8(s);
        self.add(8, utf8.to_be_bytes().to_vec())
    }
}
