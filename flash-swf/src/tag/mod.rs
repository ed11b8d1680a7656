//! Framing of top-level tags
//!
//! Every tag starts with a 16-bit word holding a 10-bit type code and a 6-bit length. A length of
//! `0x3F` escapes to the extended form, where the real length follows as a 32-bit word.

use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::Context;
use crate::errors::{Error, Result};

/// Type codes of tags
mod code;
/// Reading of tag frames
pub mod read;
/// Writing of tag frames
pub mod write;

pub use code::TagCode;
pub use read::{Frame, Frames};

/// The largest type code that fits in the header
pub const MAX_TAG_CODE: u16 = 0x3FF;

/// The value of the 6-bit length field that announces an extended header
pub const LENGTH_ESCAPE: u16 = 0x3F;

/// The largest length that can be written with the short header
pub const MAX_SHORT_LENGTH: u32 = LENGTH_ESCAPE as u32 - 1;

/// The type and payload length of a tag
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TagHeader {
    /// The raw type code
    pub code: u16,

    /// Length of the payload in bytes, not including the header
    pub length: u32,

    /// Whether the header uses the extended form
    pub long: bool,
}

impl TagHeader {
    /// Create the header for a payload of `length` bytes, picking the shortest legal form
    pub fn new(code: u16, length: u32) -> Result<Self> {
        if code > MAX_TAG_CODE {
            return Err(Error::range("tag code", code, 0, i64::from(MAX_TAG_CODE)));
        }
        let long = length > MAX_SHORT_LENGTH
            || TagCode::try_from(code).is_ok_and(TagCode::requires_long_header);
        Ok(Self { code, length, long })
    }

    /// Create the header for a payload, forcing the extended form
    pub fn new_long(code: u16, length: u32) -> Result<Self> {
        Ok(Self {
            long: true,
            ..Self::new(code, length)?
        })
    }

    /// Whether the extended form was chosen although the short one would have done
    ///
    /// Only such headers have to be remembered to write a tag back byte for byte.
    pub fn is_needlessly_long(&self) -> bool {
        self.long
            && self.length <= MAX_SHORT_LENGTH
            && !TagCode::try_from(self.code).is_ok_and(TagCode::requires_long_header)
    }

    /// The known tag type, if any
    pub fn tag_code(&self) -> Option<TagCode> {
        TagCode::try_from(self.code).ok()
    }

    /// Number of bytes the header occupies
    pub fn encoded_len(&self) -> usize {
        if self.long { 6 } else { 2 }
    }

    /// Number of bytes of the header and the payload
    pub fn total_len(&self) -> usize {
        self.encoded_len() + self.length as usize
    }
}

impl TagHeader {
    /// Read a header, the length of the payload isn't checked against the input
    pub fn read(input: &mut BitReader<'_>) -> Result<Self> {
        let word = input.read_u16()?;
        let code = word >> 6;
        let short_length = word & LENGTH_ESCAPE;
        if short_length == LENGTH_ESCAPE {
            let length = input.read_u32()?;
            log::trace!("tag {code}: extended header, {length} bytes");
            Ok(Self {
                code,
                length,
                long: true,
            })
        } else {
            Ok(Self {
                code,
                length: u32::from(short_length),
                long: false,
            })
        }
    }
}

impl Decode for TagHeader {
    fn decode(input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        Self::read(input)
    }
}

impl Encode for TagHeader {
    type Layout = usize;

    fn layout(&self, _context: &mut Context) -> Result<usize> {
        if self.code > MAX_TAG_CODE {
            return Err(Error::range("tag code", self.code, 0, i64::from(MAX_TAG_CODE)));
        }
        if !self.long && self.length > MAX_SHORT_LENGTH {
            return Err(Error::range("short tag length", self.length, 0, i64::from(MAX_SHORT_LENGTH)));
        }
        Ok(self.encoded_len())
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, _context: &mut Context) -> Result<()> {
        if self.long {
            out.write_u16((self.code << 6) | LENGTH_ESCAPE)?;
            out.write_u32(self.length)
        } else {
            // `layout` has checked the length fits in 6 bits
            out.write_u16((self.code << 6) | self.length as u16)
        }
    }
}
