//! Big-endian cursor over class-file bytes.

use super::error::{StubError, StubResult};

#[derive(Clone)]
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Offset of `bytes[0]` in the whole class file, for error messages.
    base: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, base: 0 }
    }

    /// Absolute offset in the class file.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn bytes(&mut self, len: usize) -> StubResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(StubError::malformed(
                self.offset(),
                format!("unexpected end of input: need {len} bytes, {} left", self.remaining()),
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> StubResult<()> {
        self.bytes(len).map(|_| ())
    }

    /// A reader over the next `len` bytes; the receiver skips past them.
    pub fn sub_reader(&mut self, len: usize) -> StubResult<ByteReader<'a>> {
        let base = self.offset();
        let bytes = self.bytes(len)?;
        Ok(ByteReader { bytes, pos: 0, base })
    }

    pub fn u8(&mut self) -> StubResult<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> StubResult<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> StubResult<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn u64(&mut self) -> StubResult<u64> {
        let hi = self.u32()? as u64;
        let lo = self.u32()? as u64;
        Ok((hi << 32) | lo)
    }

    /// Fails unless every byte was consumed.
    pub fn expect_end(&self, what: &str) -> StubResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(StubError::malformed(
                self.offset(),
                format!("{} trailing bytes after {what}", self.remaining()),
            ))
        }
    }
}
