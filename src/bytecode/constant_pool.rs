//! The constant pool.
//!
//! Only the entries the stub extractor reads are kept in decoded form;
//! reference-like entries keep just enough to advance past them.

use smol_str::SmolStr;

use super::error::{StubError, StubResult};
use super::reader::ByteReader;

mod tag {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELD_REF: u8 = 9;
    pub const METHOD_REF: u8 = 10;
    pub const INTERFACE_METHOD_REF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

#[derive(Clone, Debug)]
enum Entry {
    /// Index 0, and the slot after a long or double.
    Unusable,
    Utf8(SmolStr),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    /// Member refs, name-and-type, method handles, dynamic constants,
    /// modules, packages.
    Other,
}

#[derive(Debug)]
pub(crate) struct ConstantPool {
    entries: Vec<Entry>,
}

impl ConstantPool {
    pub fn parse(r: &mut ByteReader<'_>) -> StubResult<Self> {
        let count = r.u16()? as usize;
        if count == 0 {
            return Err(StubError::malformed(r.offset(), "constant pool count is zero"));
        }
        let mut entries = Vec::with_capacity(count);
        entries.push(Entry::Unusable);

        while entries.len() < count {
            let at = r.offset();
            let entry = match r.u8()? {
                tag::UTF8 => {
                    let len = r.u16()? as usize;
                    let bytes = r.bytes(len)?;
                    Entry::Utf8(decode_modified_utf8(bytes).ok_or_else(|| {
                        StubError::malformed(at, "invalid modified UTF-8 in constant")
                    })?)
                }
                tag::INTEGER => Entry::Integer(r.u32()? as i32),
                tag::FLOAT => Entry::Float(f32::from_bits(r.u32()?)),
                tag::LONG => Entry::Long(r.u64()? as i64),
                tag::DOUBLE => Entry::Double(f64::from_bits(r.u64()?)),
                tag::CLASS => Entry::Class(r.u16()?),
                tag::STRING => Entry::String(r.u16()?),
                tag::FIELD_REF
                | tag::METHOD_REF
                | tag::INTERFACE_METHOD_REF
                | tag::NAME_AND_TYPE
                | tag::DYNAMIC
                | tag::INVOKE_DYNAMIC => {
                    r.skip(4)?;
                    Entry::Other
                }
                tag::METHOD_HANDLE => {
                    r.skip(3)?;
                    Entry::Other
                }
                tag::METHOD_TYPE | tag::MODULE | tag::PACKAGE => {
                    r.skip(2)?;
                    Entry::Other
                }
                other => {
                    return Err(StubError::malformed(at, format!("unknown constant pool tag {other}")));
                }
            };
            let wide = matches!(entry, Entry::Long(_) | Entry::Double(_));
            entries.push(entry);
            if wide {
                // a long or double occupies two slots
                if entries.len() >= count {
                    return Err(StubError::malformed(at, "wide constant in last pool slot"));
                }
                entries.push(Entry::Unusable);
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, index: u16) -> StubResult<&Entry> {
        match self.entries.get(index as usize) {
            Some(Entry::Unusable) | None => Err(Self::bad_index(index, "a usable entry")),
            Some(entry) => Ok(entry),
        }
    }

    fn bad_index(index: u16, expected: &str) -> StubError {
        StubError::malformed(0, format!("constant pool index {index} is not {expected}"))
    }

    pub fn utf8(&self, index: u16) -> StubResult<&SmolStr> {
        match self.entry(index)? {
            Entry::Utf8(s) => Ok(s),
            _ => Err(Self::bad_index(index, "a Utf8 constant")),
        }
    }

    /// Internal name of a `CONSTANT_Class` entry.
    pub fn class_name(&self, index: u16) -> StubResult<&SmolStr> {
        match self.entry(index)? {
            Entry::Class(name) => self.utf8(*name),
            _ => Err(Self::bad_index(index, "a Class constant")),
        }
    }

    /// Like [`class_name`](Self::class_name), with index 0 meaning absent.
    pub fn optional_class_name(&self, index: u16) -> StubResult<Option<&SmolStr>> {
        if index == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(Some)
        }
    }

    pub fn optional_utf8(&self, index: u16) -> StubResult<Option<&SmolStr>> {
        if index == 0 {
            Ok(None)
        } else {
            self.utf8(index).map(Some)
        }
    }

    pub fn integer(&self, index: u16) -> StubResult<i32> {
        match self.entry(index)? {
            Entry::Integer(v) => Ok(*v),
            _ => Err(Self::bad_index(index, "an Integer constant")),
        }
    }

    pub fn long(&self, index: u16) -> StubResult<i64> {
        match self.entry(index)? {
            Entry::Long(v) => Ok(*v),
            _ => Err(Self::bad_index(index, "a Long constant")),
        }
    }

    pub fn float(&self, index: u16) -> StubResult<f32> {
        match self.entry(index)? {
            Entry::Float(v) => Ok(*v),
            _ => Err(Self::bad_index(index, "a Float constant")),
        }
    }

    pub fn double(&self, index: u16) -> StubResult<f64> {
        match self.entry(index)? {
            Entry::Double(v) => Ok(*v),
            _ => Err(Self::bad_index(index, "a Double constant")),
        }
    }

    /// Text of a `CONSTANT_String` entry.
    pub fn string(&self, index: u16) -> StubResult<&SmolStr> {
        match self.entry(index)? {
            Entry::String(utf8) => self.utf8(*utf8),
            _ => Err(Self::bad_index(index, "a String constant")),
        }
    }
}

/// Decodes the JVM's modified UTF-8: `U+0000` is encoded on two bytes and
/// supplementary characters as surrogate pairs of three bytes each.
fn decode_modified_utf8(bytes: &[u8]) -> Option<SmolStr> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        // standard UTF-8 and modified UTF-8 agree whenever the former
        // accepts the input (no NUL byte can appear in modified UTF-8)
        if !s.contains('\0') {
            return Some(SmolStr::new(s));
        }
        return None;
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let (unit, width) = match b {
            0x01..=0x7F => (b as u16, 1),
            0xC0..=0xDF => {
                let b2 = *bytes.get(i + 1)?;
                if b2 & 0xC0 != 0x80 {
                    return None;
                }
                ((((b & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16, 2)
            }
            0xE0..=0xEF => {
                let b2 = *bytes.get(i + 1)?;
                let b3 = *bytes.get(i + 2)?;
                if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                    return None;
                }
                (
                    (((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16,
                    3,
                )
            }
            _ => return None,
        };
        units.push(unit);
        i += width;
    }
    Some(SmolStr::from(String::from_utf16_lossy(&units)))
}
