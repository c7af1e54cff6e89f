//! Forward-only byte reader with bounded operations.

use crate::error::{CursorError, CursorResult};

/// A forward-only reader over a fixed byte buffer.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read leaves the position unchanged and never yields partial data.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a new `ByteCursor` positioned at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Rewinds to the start of the buffer.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Reads an unsigned byte.
    pub fn read_u8(&mut self) -> CursorResult<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> CursorResult<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> CursorResult<i32> {
        Ok(i32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Borrows the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> CursorResult<&'a [u8]> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Skips `len` bytes.
    pub fn skip(&mut self, len: usize) -> CursorResult<()> {
        self.ensure(len)?;
        self.pos += len;
        Ok(())
    }

    /// Reads a string stored in `words` packed 32-bit words.
    ///
    /// At most `4 * words - 1` bytes are significant; the string ends at the
    /// first NUL byte. The cursor always advances by `4 * words`.
    pub fn read_str(&mut self, words: usize) -> CursorResult<String> {
        if words == 0 {
            return Err(CursorError::EmptyString);
        }
        let raw = self.read_bytes(words * 4)?;
        let text = &raw[..raw.len() - 1];
        let len = text.iter().position(|&b| b == 0).unwrap_or(text.len());
        Ok(String::from_utf8_lossy(&text[..len]).into_owned())
    }

    fn ensure(&self, len: usize) -> CursorResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(CursorError::OutOfBounds {
                requested: len,
                available,
            });
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> CursorResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor() {
        let cursor = ByteCursor::new(&[]);
        assert!(cursor.is_empty());
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn read_from_empty_fails() {
        let mut cursor = ByteCursor::new(&[]);
        let result = cursor.read_u8();
        assert!(matches!(result, Err(CursorError::OutOfBounds { .. })));
    }

    #[test]
    fn read_u32_little_endian() {
        let mut cursor = ByteCursor::new(&[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(cursor.read_u32().unwrap(), 0x1234_5678);
        assert!(cursor.is_empty());
    }

    #[test]
    fn read_i32_negative() {
        let mut cursor = ByteCursor::new(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(cursor.read_i32().unwrap(), -1);
    }

    #[test]
    fn short_read_does_not_advance() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        let err = cursor.read_u32().unwrap_err();
        assert_eq!(
            err,
            CursorError::OutOfBounds {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u8().unwrap(), 1);
    }

    #[test]
    fn reset_rewinds_to_start() {
        let mut cursor = ByteCursor::new(&[9, 8]);
        cursor.read_u8().unwrap();
        cursor.read_u8().unwrap();
        cursor.reset();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.read_u8().unwrap(), 9);
    }

    #[test]
    fn read_str_stops_at_nul() {
        let mut bytes = [0u8; 12];
        bytes[..3].copy_from_slice(b"Foo");
        bytes[5] = b'x';
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.read_str(3).unwrap(), "Foo");
        assert_eq!(cursor.position(), 12);
    }

    #[test]
    fn read_str_ignores_last_byte() {
        let bytes = *b"Hello World!";
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.read_str(3).unwrap(), "Hello World");
    }

    #[test]
    fn read_str_zero_words_fails() {
        let mut cursor = ByteCursor::new(&[0; 4]);
        assert_eq!(cursor.read_str(0), Err(CursorError::EmptyString));
    }

    #[test]
    fn skip_past_end_fails() {
        let mut cursor = ByteCursor::new(&[0; 2]);
        assert!(cursor.skip(3).is_err());
        cursor.skip(2).unwrap();
        assert!(cursor.is_empty());
    }
}
