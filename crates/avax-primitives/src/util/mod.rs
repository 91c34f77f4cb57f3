//! Utility types for binary serialization.
//!
//! Provides `AvaxReader` and `AvaxWriter`, the cursor reader and buffer
//! writer used by every Avalanche codec type. All multi-byte integers on the
//! Avalanche wire are big-endian; variable-length arrays are prefixed with a
//! 4-byte count and strings with a 2-byte length.

use crate::PrimitivesError;

// ---------------------------------------------------------------------------
// AvaxReader
// ---------------------------------------------------------------------------

/// A cursor-based reader for Avalanche codec binary data.
///
/// Wraps a byte slice and maintains a read position. The position plays the
/// role of the "offset" threaded through every `from_bytes` call of the
/// codec: reading a field advances it by exactly the field's width.
pub struct AvaxReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> AvaxReader<'a> {
    /// Create a new reader over the given byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from.
    ///
    /// # Returns
    /// An `AvaxReader` positioned at the start of the data.
    pub fn new(data: &'a [u8]) -> Self {
        AvaxReader { data, pos: 0 }
    }

    /// Create a reader positioned at `offset`.
    ///
    /// # Returns
    /// The reader, or `UnexpectedEof` if `offset` is past the end.
    pub fn at_offset(data: &'a [u8], offset: usize) -> Result<Self, PrimitivesError> {
        if offset > data.len() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        Ok(AvaxReader { data, pos: offset })
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Arguments
    /// * `n` - Number of bytes to read.
    ///
    /// # Returns
    /// A byte slice of length `n`, or an error if insufficient data remains.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes into a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a single byte and advance the position.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a big-endian u16 and advance the position by 2 bytes.
    pub fn read_u16_be(&mut self) -> Result<u16, PrimitivesError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u32 and advance the position by 4 bytes.
    pub fn read_u32_be(&mut self) -> Result<u32, PrimitivesError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian u64 and advance the position by 8 bytes.
    pub fn read_u64_be(&mut self) -> Result<u64, PrimitivesError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a byte string prefixed with its big-endian u32 length.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_u32_be()? as usize;
        self.read_bytes(len)
    }

    /// Read a UTF-8 string prefixed with its big-endian u16 length.
    pub fn read_string16(&mut self) -> Result<String, PrimitivesError> {
        let len = self.read_u16_be()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| PrimitivesError::InvalidEncoding(format!("invalid utf8: {}", e)))
    }

    /// Read a big-endian u32 element count and check it against the bytes
    /// left, given the smallest possible encoded element size.
    ///
    /// Guards `Vec::with_capacity` against hostile counts.
    pub fn read_count(&mut self, min_elem_size: usize) -> Result<usize, PrimitivesError> {
        let count = self.read_u32_be()? as usize;
        if count.saturating_mul(min_elem_size.max(1)) > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        Ok(count)
    }

    /// Return the current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Return the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// AvaxWriter
// ---------------------------------------------------------------------------

/// A buffer-based writer for Avalanche codec binary data.
///
/// Wraps a `Vec<u8>` and appends big-endian integers, fixed-width byte
/// arrays and length-prefixed byte strings.
pub struct AvaxWriter {
    buf: Vec<u8>,
}

impl AvaxWriter {
    /// Create a new empty writer.
    pub fn new() -> Self {
        AvaxWriter { buf: Vec::new() }
    }

    /// Create a new writer with a pre-allocated capacity.
    ///
    /// # Arguments
    /// * `capacity` - Initial byte capacity of the internal buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        AvaxWriter { buf: Vec::with_capacity(capacity) }
    }

    /// Append raw bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte to the buffer.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a big-endian u16 (2 bytes) to the buffer.
    pub fn write_u16_be(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a big-endian u32 (4 bytes) to the buffer.
    pub fn write_u32_be(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a big-endian u64 (8 bytes) to the buffer.
    pub fn write_u64_be(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Append a byte string prefixed with its big-endian u32 length.
    pub fn write_len_prefixed(&mut self, bytes: &[u8]) {
        self.write_u32_be(bytes.len() as u32);
        self.write_bytes(bytes);
    }

    /// Append a UTF-8 string prefixed with its big-endian u16 length.
    pub fn write_string16(&mut self, s: &str) {
        self.write_u16_be(s.len() as u16);
        self.write_bytes(s.as_bytes());
    }

    /// Consume the writer and return the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Return a reference to the current buffer contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Return the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for AvaxWriter {
    fn default() -> Self {
        Self::new()
    }
}
