use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::bits::width::{fits_signed, fits_unsigned};
use crate::bits::{align_up, check_width, check_word_bytes, Encoding};
use crate::errors::{Error, Result};

/// A write cursor over a buffer of fixed length
///
/// The length is the measured size of whatever is being encoded, so writing past the end means a
/// record wrote more than it declared and fails with [`Error::BufferExhausted`].
#[derive(Clone, Debug)]
pub struct BitWriter {
    data: Vec<u8>,
    position: usize,
}

impl BitWriter {
    /// Create a zero filled writer of `length` bytes
    pub fn with_length(length: usize) -> Self {
        Self {
            data: vec![0; length],
            position: 0,
        }
    }

    /// The current position, in bits
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The current position in bytes, rounded down
    #[inline]
    pub fn byte_position(&self) -> usize {
        self.position / 8
    }

    /// The length of the buffer in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer has no room at all
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether every bit of the buffer has been passed
    pub fn at_end(&self) -> bool {
        self.position >= self.data.len() * 8
    }

    /// Whether the cursor is on a byte boundary
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.position % 8 == 0
    }

    /// Jump to an absolute bit position
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() * 8 {
            return Err(Error::BufferExhausted {
                position: self.position,
                requested: position.saturating_sub(self.position),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Move forward by `bits`, leaving the skipped bits untouched
    pub fn skip(&mut self, bits: usize) -> Result<()> {
        self.ensure(bits)?;
        self.position += bits;
        Ok(())
    }

    /// Advance to the next byte boundary, padding with zero bits
    pub fn align(&mut self) -> Result<()> {
        let target = align_up(self.position);
        while self.position < target {
            self.write_bit(false)?;
        }
        Ok(())
    }

    fn ensure(&self, bits: usize) -> Result<()> {
        if self.position + bits > self.data.len() * 8 {
            return Err(Error::BufferExhausted {
                position: self.position,
                requested: bits,
            });
        }
        Ok(())
    }

    /// Write a single bit
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.ensure(1)?;
        let mask = 0x80u8 >> (self.position % 8);
        let byte = &mut self.data[self.position / 8];
        if bit {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        self.position += 1;
        Ok(())
    }

    /// Write `value` as an unsigned field of `width` bits
    pub fn write_ubits(&mut self, width: u32, value: u32) -> Result<()> {
        check_width(width)?;
        if !fits_unsigned(value, width) {
            let max = (1i64 << width) - 1;
            return Err(Error::range("unsigned field", value, 0, max));
        }
        self.ensure(width as usize)?;
        for bit in (0..width).rev() {
            self.write_bit((value >> bit) & 1 == 1)?;
        }
        Ok(())
    }

    /// Write `value` as a two's complement field of `width` bits
    pub fn write_sbits(&mut self, width: u32, value: i32) -> Result<()> {
        check_width(width)?;
        if !fits_signed(value, width) {
            let (min, max) = match width {
                0 => (0, 0),
                w => (-(1i64 << (w - 1)), (1i64 << (w - 1)) - 1),
            };
            return Err(Error::range("signed field", value, min, max));
        }
        let mask = if width == 32 { u32::MAX } else { (1u32 << width) - 1 };
        self.write_ubits(width, value as u32 & mask)
    }

    /// Write a byte-aligned big-endian word of `bytes` (1 to 4) bytes
    pub fn write_word(&mut self, bytes: usize, value: i64, signed: bool) -> Result<()> {
        self.write_word_with::<BigEndian>(bytes, value, signed)
    }

    /// Write a byte-aligned little-endian word, used by embedded foreign formats
    pub fn write_word_le(&mut self, bytes: usize, value: i64, signed: bool) -> Result<()> {
        self.write_word_with::<LittleEndian>(bytes, value, signed)
    }

    fn write_word_with<B: ByteOrder>(&mut self, bytes: usize, value: i64, signed: bool) -> Result<()> {
        check_word_bytes(bytes)?;
        let bits = bytes as u32 * 8;
        let (min, max) = if signed {
            (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
        } else {
            (0, (1i64 << bits) - 1)
        };
        if value < min || value > max {
            return Err(Error::range("word", value, min, max));
        }

        self.align()?;
        self.ensure(bytes * 8)?;
        let start = self.position / 8;
        let raw = (value as u64) & ((1u64 << bits) - 1);
        B::write_uint(&mut self.data[start..start + bytes], raw, bytes);
        self.position += bytes * 8;
        Ok(())
    }

    /// Write an aligned unsigned byte
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_word(1, i64::from(value), false)
    }

    /// Write an aligned big-endian unsigned 16 bit word
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_word(2, i64::from(value), false)
    }

    /// Write an aligned big-endian signed 16 bit word
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_word(2, i64::from(value), true)
    }

    /// Write an aligned big-endian unsigned 32 bit word
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_word(4, i64::from(value), false)
    }

    /// Write an aligned big-endian signed 32 bit word
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_word(4, i64::from(value), true)
    }

    /// Write an aligned big-endian IEEE 754 single
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_u32(value.to_bits())
    }

    /// Write raw bytes from the next byte boundary
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.align()?;
        self.ensure(bytes.len() * 8)?;
        let start = self.position / 8;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len() * 8;
        Ok(())
    }

    /// Write the bytes of a string without a terminator or length
    pub fn write_string(&mut self, s: &str, encoding: Encoding) -> Result<()> {
        let bytes = encoding.encode(s)?;
        self.write_bytes(&bytes)
    }

    /// Write a string followed by a NUL terminator
    pub fn write_terminated_string(&mut self, s: &str, encoding: Encoding) -> Result<()> {
        let bytes = encoding.encode(s)?;
        if bytes.contains(&0) {
            return Err(Error::range("string NUL byte", 0, 1, 0xFF));
        }
        self.write_bytes(&bytes)?;
        self.write_u8(0)
    }

    /// Overwrite a big-endian word at an earlier position and come back to the current one
    pub fn patch_word(&mut self, at: usize, bytes: usize, value: i64, signed: bool) -> Result<()> {
        let resume = self.position;
        self.seek(at)?;
        let patched = self.write_word(bytes, value, signed);
        self.position = resume;
        patched
    }

    /// The written buffer
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer, returning the buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
