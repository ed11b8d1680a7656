use nom::number::Endianness;

use crate::bits::{align_up, check_width, check_word_bytes, strip_nul, Encoding};
use crate::errors::{Error, Result};
use crate::nom_utils::{take_bits, take_terminated, take_word};

/// A read cursor over a byte slice with bit granular positioning
///
/// A reader may be limited to a window of the slice (see [`BitReader::limited`]), any access past
/// the end of the window fails with [`Error::BufferExhausted`] even if the slice has more data.
/// Positions stay absolute so that errors and offsets can be reported relative to the whole buffer.
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader over the whole of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            limit: data.len() * 8,
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

    /// The end of the readable window, in bits
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of bits left before the end of the window
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.limit.saturating_sub(self.position)
    }

    /// Number of whole bytes left after aligning to the next byte boundary
    pub fn remaining_bytes(&self) -> usize {
        self.limit.saturating_sub(align_up(self.position)) / 8
    }

    /// Whether the cursor is at the end of the window
    #[inline]
    pub fn at_end(&self) -> bool {
        self.position >= self.limit
    }

    /// Whether the cursor is on a byte boundary
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.position % 8 == 0
    }

    /// The underlying buffer
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Jump to an absolute bit position inside the window
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(Error::BufferExhausted {
                position: self.position,
                requested: position.saturating_sub(self.position),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Move forward by `bits`
    pub fn skip(&mut self, bits: usize) -> Result<()> {
        self.ensure(bits)?;
        self.position += bits;
        Ok(())
    }

    /// Move forward by `bytes` whole bytes, starting from the next byte boundary
    pub fn skip_bytes(&mut self, bytes: usize) -> Result<()> {
        self.align();
        self.skip(bytes * 8)
    }

    /// Advance to the next byte boundary, does nothing if already aligned
    #[inline]
    pub fn align(&mut self) {
        self.position = align_up(self.position).min(self.limit.max(self.position));
    }

    /// A reader over the next `bytes` bytes (from the next byte boundary)
    ///
    /// The returned reader shares the buffer and positions of this one, this reader is not moved.
    pub fn limited(&self, bytes: usize) -> Result<BitReader<'a>> {
        let start = align_up(self.position);
        let limit = start + bytes * 8;
        if limit > self.limit {
            return Err(Error::BufferExhausted {
                position: start,
                requested: bytes * 8,
            });
        }
        Ok(BitReader {
            data: self.data,
            position: start,
            limit,
        })
    }

    fn ensure(&self, bits: usize) -> Result<()> {
        if self.position + bits > self.limit {
            return Err(Error::BufferExhausted {
                position: self.position,
                requested: bits,
            });
        }
        Ok(())
    }

    /// The next byte boundary, if `bits` more bits can be read from there
    fn ensure_aligned(&self, bits: usize) -> Result<usize> {
        let start = align_up(self.position);
        if start + bits > self.limit {
            return Err(Error::BufferExhausted {
                position: start,
                requested: bits,
            });
        }
        Ok(start)
    }

    fn exhausted(&self, bits: usize) -> Error {
        Error::BufferExhausted {
            position: self.position,
            requested: bits,
        }
    }

    /// The unread bytes of the window, starting at the next byte boundary
    fn window(&self) -> &'a [u8] {
        let start = align_up(self.position).min(self.limit) / 8;
        &self.data[start..self.limit / 8]
    }

    /// Read a single bit as a flag
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_ubits(1)? == 1)
    }

    /// Read an unsigned field of `width` bits
    pub fn read_ubits(&mut self, width: u32) -> Result<u32> {
        check_width(width)?;
        let bits = width as usize;
        self.ensure(bits)?;
        if bits == 0 {
            return Ok(0);
        }

        // `ensure` keeps the window end past the position, so the slice is never empty here
        let input = (&self.data[self.position / 8..self.limit.div_ceil(8)], self.position % 8);
        let (_, value) = take_bits(input, width).map_err(|_| self.exhausted(bits))?;
        self.position += bits;
        Ok(value)
    }

    /// Read a two's complement signed field of `width` bits
    pub fn read_sbits(&mut self, width: u32) -> Result<i32> {
        let value = self.read_ubits(width)?;
        if width == 0 || width == 32 {
            return Ok(value as i32);
        }
        let shift = 32 - width;
        Ok(((value << shift) as i32) >> shift)
    }

    /// Read a byte-aligned word of `bytes` (1 to 4) bytes, big-endian
    ///
    /// Signed words are sign extended from their own width.
    pub fn read_word(&mut self, bytes: usize, signed: bool) -> Result<i64> {
        self.read_word_with(bytes, signed, Endianness::Big)
    }

    /// Read a byte-aligned little-endian word, used by embedded foreign formats
    pub fn read_word_le(&mut self, bytes: usize, signed: bool) -> Result<i64> {
        self.read_word_with(bytes, signed, Endianness::Little)
    }

    fn read_word_with(&mut self, bytes: usize, signed: bool, endian: Endianness) -> Result<i64> {
        check_word_bytes(bytes)?;
        let start = self.ensure_aligned(bytes * 8)?;
        let (_, value) = take_word(self.window(), bytes, endian).map_err(|_| self.exhausted(bytes * 8))?;
        self.position = start + bytes * 8;

        let bits = bytes as u32 * 8;
        if signed && (value >> (bits - 1)) & 1 == 1 {
            Ok(i64::from(value) - (1i64 << bits))
        } else {
            Ok(i64::from(value))
        }
    }

    /// Read an aligned unsigned byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_word(1, false)? as u8)
    }

    /// Read an aligned big-endian unsigned 16 bit word
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_word(2, false)? as u16)
    }

    /// Read an aligned big-endian signed 16 bit word
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_word(2, true)? as i16)
    }

    /// Read an aligned big-endian unsigned 32 bit word
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_word(4, false)? as u32)
    }

    /// Read an aligned big-endian signed 32 bit word
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_word(4, true)? as i32)
    }

    /// Read an aligned big-endian IEEE 754 single
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read `count` aligned bytes without copying
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let start = self.ensure_aligned(count * 8)?;
        self.position = start + count * 8;
        Ok(&self.data[start / 8..start / 8 + count])
    }

    /// Read everything up to the end of the window
    pub fn read_to_end(&mut self) -> Result<&'a [u8]> {
        let count = self.remaining_bytes();
        self.read_bytes(count)
    }

    /// Read a fixed length string, trailing NUL bytes are stripped
    pub fn read_string(&mut self, length: usize, encoding: Encoding) -> Result<String> {
        let offset = align_up(self.position) / 8;
        let bytes = self.read_bytes(length)?;
        encoding.decode(strip_nul(bytes), offset)
    }

    /// Read a NUL terminated string, the terminator is consumed
    pub fn read_terminated_string(&mut self, encoding: Encoding) -> Result<String> {
        let start = align_up(self.position).min(self.limit.max(self.position));
        let offset = start / 8;
        let (_, bytes) = take_terminated(self.window()).map_err(|_| self.exhausted(self.remaining_bits() + 8))?;
        self.position = start + (bytes.len() + 1) * 8;
        encoding.decode(bytes, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn reads_packed_fields_msb_first() {
        let data = [0b1011_0011, 0b1100_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_ubits(1).unwrap(), 1);
        assert_eq!(r.read_ubits(3).unwrap(), 0b011);
        assert_eq!(r.read_ubits(6).unwrap(), 0b0011_11);
        assert_eq!(r.position(), 10);
        assert!(!r.is_aligned());
    }

    #[test]
    fn sign_extends() {
        let data = [0b1110_0000, 0xff, 0xff, 0xff, 0xff];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_sbits(3).unwrap(), -1);
        assert_eq!(r.read_sbits(0).unwrap(), 0);
        r.align();
        assert_eq!(r.read_sbits(32).unwrap(), -1);
    }

    #[test]
    fn words_align_first_and_are_big_endian() {
        let data = [0x80, 0x12, 0x34, 0xff, 0xfe];
        let mut r = BitReader::new(&data);
        assert!(r.read_bit().unwrap());
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert!(r.at_end());
    }

    #[test]
    fn little_endian_companion() {
        let data = [0x34, 0x12, 0x00, 0x00, 0x80];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_word_le(2, false).unwrap(), 0x1234);
        assert_eq!(r.read_word_le(3, true).unwrap(), -0x80_0000);
    }

    #[test]
    fn reading_past_the_end_is_an_error() {
        let data = [0xff];
        let mut r = BitReader::new(&data);
        r.read_ubits(5).unwrap();
        assert_eq!(
            r.read_ubits(4),
            Err(Error::BufferExhausted {
                position: 5,
                requested: 4
            })
        );
        // A failed read leaves the position untouched
        assert_eq!(r.position(), 5);
        assert_eq!(r.read_ubits(3).unwrap(), 0b111);
    }

    #[test]
    fn failed_word_reads_stay_unaligned() {
        let data = [0b1010_0000, 0x12];
        let mut r = BitReader::new(&data);
        r.read_ubits(3).unwrap();
        assert_eq!(
            r.read_u16(),
            Err(Error::BufferExhausted {
                position: 8,
                requested: 16
            })
        );
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_bytes(2).unwrap_err().kind(), ErrorKind::BufferExhausted);
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_terminated_string(Encoding::Utf8).unwrap_err().kind(), ErrorKind::BufferExhausted);
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_ubits(5).unwrap(), 0);
        assert_eq!(r.read_u8().unwrap(), 0x12);
    }

    #[test]
    fn widths_above_32_are_rejected() {
        let data = [0u8; 8];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_ubits(33).unwrap_err().kind(), ErrorKind::RangeViolation);
        assert_eq!(r.read_word(5, false).unwrap_err().kind(), ErrorKind::RangeViolation);
    }

    #[test]
    fn limited_window_stops_reads() {
        let data = [1, 2, 3, 4];
        let r = BitReader::new(&data);
        let mut sub = r.limited(2).unwrap();
        assert_eq!(sub.read_u16().unwrap(), 0x0102);
        assert!(sub.at_end());
        assert_eq!(sub.read_u8().unwrap_err().kind(), ErrorKind::BufferExhausted);
        assert!(r.limited(5).is_err());
    }

    #[test]
    fn strings() {
        let data = b"abc\0\0hi\0rest";
        let mut r = BitReader::new(data);
        assert_eq!(r.read_string(5, Encoding::Utf8).unwrap(), "abc");
        assert_eq!(r.read_terminated_string(Encoding::Utf8).unwrap(), "hi");
        assert_eq!(r.remaining_bytes(), 4);
        assert_eq!(r.read_terminated_string(Encoding::Utf8).unwrap_err().kind(), ErrorKind::BufferExhausted);
    }

    #[test]
    fn seek_and_skip_are_bounded() {
        let data = [0u8; 2];
        let mut r = BitReader::new(&data);
        r.seek(16).unwrap();
        assert!(r.at_end());
        assert!(r.seek(17).is_err());
        r.seek(3).unwrap();
        assert!(r.skip(14).is_err());
        r.skip(13).unwrap();
        assert!(r.at_end());
    }
}
