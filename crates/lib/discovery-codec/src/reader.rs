//! Bounds-checked cursor over the encoded bytes.

use crate::DecodeError;

/// A forward-only reader that never reads past the end of its input.
pub(crate) struct Reader<'a> {
    /// The whole input.
    bytes: &'a [u8],

    /// Offset of the next unread byte.
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of the input.
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Number of unread bytes.
    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Read a little-endian `u32`.
    pub(crate) fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let offset = self.offset;
        let Some(chunk) = self.bytes.get(offset..offset + size_of::<u32>()) else {
            return Err(DecodeError::Truncated { offset });
        };

        let mut raw = [0; size_of::<u32>()];
        raw.copy_from_slice(chunk);
        self.offset += raw.len();

        Ok(u32::from_le_bytes(raw))
    }

    /// Read a length-prefixed UTF-8 string, borrowing from the input.
    pub(crate) fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let prefix_offset = self.offset;
        let length = self.read_u32()?;

        let remaining = self.remaining();
        let len = match usize::try_from(length) {
            Ok(len) if len <= remaining => len,
            _ => {
                return Err(DecodeError::LengthOutOfBounds {
                    offset: prefix_offset,
                    length,
                    remaining,
                });
            }
        };

        let start = self.offset;
        let raw = &self.bytes[start..start + len];
        self.offset += len;

        core::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { offset: start })
    }
}
