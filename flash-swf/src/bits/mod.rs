//! Bit granular cursors over an in-memory byte buffer
//!
//! Positions are always measured in bits from the start of the buffer. Packed fields are read and
//! written most significant bit first, byte-aligned words are big-endian unless the `_le` variant
//! is used.

use std::borrow::Cow;

use crate::errors::{Error, Result};

/// Reading of bit packed data
pub mod read;
/// Field width computation
pub mod width;
/// Writing of bit packed data
pub mod write;

pub use read::BitReader;
pub use write::BitWriter;

/// The largest width of a single packed field
pub const MAX_FIELD_BITS: u32 = 32;

/// Round a bit position up to the next byte boundary
#[inline]
pub(crate) fn align_up(position: usize) -> usize {
    (position + 7) & !7
}

pub(crate) fn check_width(width: u32) -> Result<()> {
    if width > MAX_FIELD_BITS {
        return Err(Error::range("bit width", width, 0, MAX_FIELD_BITS as i64));
    }
    Ok(())
}

pub(crate) fn check_word_bytes(bytes: usize) -> Result<()> {
    if !(1..=4).contains(&bytes) {
        return Err(Error::range("word size", bytes as i64, 1, 4));
    }
    Ok(())
}

/// The character encoding of strings
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Encoding {
    /// UTF-8, used from version 6 onwards
    Utf8,
    /// ISO-8859-1, used by earlier versions
    Latin1,
}

impl Encoding {
    /// Get the encoding used for strings by the given format version
    pub fn for_version(version: u8) -> Self {
        if version >= 6 {
            Encoding::Utf8
        } else {
            Encoding::Latin1
        }
    }

    pub(crate) fn decode(self, bytes: &[u8], offset: usize) -> Result<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidString { offset }),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    pub(crate) fn encode(self, s: &str) -> Result<Cow<'_, [u8]>> {
        match self {
            Encoding::Utf8 => Ok(Cow::Borrowed(s.as_bytes())),
            Encoding::Latin1 => s
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| Error::range("Latin-1 character", u32::from(c), 0, 0xFF)))
                .collect::<Result<Vec<u8>>>()
                .map(Cow::Owned),
        }
    }

    /// Number of bytes `s` occupies in this encoding
    pub fn encoded_len(self, s: &str) -> usize {
        match self {
            Encoding::Utf8 => s.len(),
            Encoding::Latin1 => s.chars().count(),
        }
    }
}

/// Remove trailing NUL padding from a fixed length string
pub(crate) fn strip_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_rejects_wide_characters() {
        assert_eq!(
            Encoding::Latin1.encode("snow \u{2603}").unwrap_err().kind(),
            crate::errors::ErrorKind::RangeViolation
        );
        assert_eq!(Encoding::Latin1.encode("caf\u{e9}").unwrap().into_owned(), b"caf\xe9");
    }

    #[test]
    fn utf8_is_validated_on_decode() {
        assert_eq!(
            Encoding::Utf8.decode(&[0x66, 0xff], 12),
            Err(Error::InvalidString { offset: 12 })
        );
        assert_eq!(Encoding::Latin1.decode(&[0x66, 0xff], 12).unwrap(), "f\u{ff}");
    }

    #[test]
    fn strips_only_trailing_nul() {
        assert_eq!(strip_nul(b"a\0b\0\0"), b"a\0b");
        assert_eq!(strip_nul(b"\0\0"), b"");
    }
}
