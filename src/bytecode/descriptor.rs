//! Field and method descriptors.

use smol_str::SmolStr;

use super::error::{StubError, StubResult};
use crate::symbols::TypeRef;

/// Decodes a field descriptor (`[Ljava/lang/String;`) to a type reference
/// (`java.lang.String[]`).
pub fn parse_field_descriptor(descriptor: &str) -> StubResult<TypeRef> {
    let (ty, rest) = parse_one(descriptor).ok_or_else(|| bad(descriptor))?;
    if !rest.is_empty() {
        return Err(bad(descriptor));
    }
    Ok(ty)
}

/// A decoded method descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<TypeRef>,
    pub return_type: TypeRef,
}

/// Decodes a method descriptor (`(I[J)Ljava/lang/Object;`).
pub fn parse_method_descriptor(descriptor: &str) -> StubResult<MethodDescriptor> {
    let mut rest = descriptor.strip_prefix('(').ok_or_else(|| bad(descriptor))?;
    let mut parameters = Vec::new();
    loop {
        if let Some(after) = rest.strip_prefix(')') {
            rest = after;
            break;
        }
        let (ty, after) = parse_one(rest).ok_or_else(|| bad(descriptor))?;
        if ty.binary_name() == "void" {
            return Err(bad(descriptor));
        }
        parameters.push(ty);
        rest = after;
    }
    let (return_type, after) = parse_one(rest).ok_or_else(|| bad(descriptor))?;
    if !after.is_empty() {
        return Err(bad(descriptor));
    }
    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

fn bad(descriptor: &str) -> StubError {
    StubError::BadDescriptor(SmolStr::new(descriptor))
}

fn parse_one(s: &str) -> Option<(TypeRef, &str)> {
    let dims = s.bytes().take_while(|&b| b == b'[').count();
    let s = &s[dims..];
    let (base, rest): (SmolStr, &str) = match *s.as_bytes().first()? {
        b'Z' => ("boolean".into(), &s[1..]),
        b'B' => ("byte".into(), &s[1..]),
        b'C' => ("char".into(), &s[1..]),
        b'S' => ("short".into(), &s[1..]),
        b'I' => ("int".into(), &s[1..]),
        b'J' => ("long".into(), &s[1..]),
        b'F' => ("float".into(), &s[1..]),
        b'D' => ("double".into(), &s[1..]),
        b'V' if dims == 0 => ("void".into(), &s[1..]),
        b'L' => {
            let end = s.find(';')?;
            let internal = &s[1..end];
            if internal.is_empty() {
                return None;
            }
            (SmolStr::from(internal.replace('/', ".")), &s[end + 1..])
        }
        _ => return None,
    };
    let name = if dims == 0 {
        base
    } else {
        let mut name = String::with_capacity(base.len() + 2 * dims);
        name.push_str(&base);
        for _ in 0..dims {
            name.push_str("[]");
        }
        SmolStr::from(name)
    };
    Some((TypeRef::new(name), rest))
}
