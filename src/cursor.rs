//! Bounds-checked byte cursors over compressed and uncompressed headers.
//!
//! Both cursors are thin wrappers around the `bytes` traits: [`FieldReader`]
//! drives a `&[u8]` through [`Buf`], [`FieldWriter`] drives a `&mut [u8]`
//! through [`BufMut`]. Every access is checked first so a short input becomes
//! a [`LowpanParsingError::NotEnoughData`] and a short output becomes a
//! [`LowpanBuildingError::BufferTooSmall`], never a panic.

use bytes::{Buf, BufMut};

use crate::error::{LowpanBuildingError, LowpanParsingError, ParseContext};

/// Sequential reader that tracks how many bytes have been consumed.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> FieldReader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            buf: data,
            consumed: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Unread bytes, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    fn ensure(&self, needed: usize, context: ParseContext) -> Result<(), LowpanParsingError> {
        if self.buf.remaining() < needed {
            return Err(LowpanParsingError::NotEnoughData {
                needed: self.consumed + needed,
                got: self.consumed + self.buf.remaining(),
                context,
            });
        }
        Ok(())
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self, context: ParseContext) -> Result<u8, LowpanParsingError> {
        self.ensure(1, context)?;
        Ok(self.buf.chunk()[0])
    }

    pub fn read_u8(&mut self, context: ParseContext) -> Result<u8, LowpanParsingError> {
        self.ensure(1, context)?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self, context: ParseContext) -> Result<u16, LowpanParsingError> {
        self.ensure(2, context)?;
        self.consumed += 2;
        Ok(self.buf.get_u16())
    }

    pub fn read_array<const N: usize>(
        &mut self,
        context: ParseContext,
    ) -> Result<[u8; N], LowpanParsingError> {
        self.ensure(N, context)?;
        let mut out = [0u8; N];
        self.buf.copy_to_slice(&mut out);
        self.consumed += N;
        Ok(out)
    }

    /// Reads `len` bytes as a borrowed slice.
    pub fn read_slice(
        &mut self,
        len: usize,
        context: ParseContext,
    ) -> Result<&'a [u8], LowpanParsingError> {
        self.ensure(len, context)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        self.consumed += len;
        Ok(head)
    }
}

/// Sequential writer over a caller-owned, fixed-size output slice.
#[derive(Debug)]
pub struct FieldWriter<'a> {
    buf: &'a mut [u8],
    capacity: usize,
}

impl<'a> FieldWriter<'a> {
    /// Creates a writer positioned at the start of `out`.
    pub fn new(out: &'a mut [u8]) -> Self {
        let capacity = out.len();
        Self { buf: out, capacity }
    }

    /// Bytes written so far.
    pub fn written(&self) -> usize {
        self.capacity - self.buf.remaining_mut()
    }

    fn ensure(&self, needed: usize, context: ParseContext) -> Result<(), LowpanBuildingError> {
        if self.buf.remaining_mut() < needed {
            return Err(LowpanBuildingError::BufferTooSmall {
                needed: self.written() + needed,
                available: self.capacity,
                context,
            });
        }
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8, context: ParseContext) -> Result<(), LowpanBuildingError> {
        self.ensure(1, context)?;
        self.buf.put_u8(value);
        Ok(())
    }

    /// Writes a big-endian `u16`.
    pub fn put_u16(&mut self, value: u16, context: ParseContext) -> Result<(), LowpanBuildingError> {
        self.ensure(2, context)?;
        self.buf.put_u16(value);
        Ok(())
    }

    pub fn put_slice(
        &mut self,
        value: &[u8],
        context: ParseContext,
    ) -> Result<(), LowpanBuildingError> {
        self.ensure(value.len(), context)?;
        self.buf.put_slice(value);
        Ok(())
    }
}
