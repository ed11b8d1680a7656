use nom::bits::complete::take;
use nom::bytes::complete::take_until;
use nom::number::complete::{be_u8, be_u16, be_u24, be_u32, le_u16, le_u24, le_u32};
use nom::number::Endianness;
use nom::IResult;

/// Input of the nom bit parsers, a byte slice plus the bit offset into its first byte
pub(crate) type BitInput<'a> = (&'a [u8], usize);

pub(crate) type BitResult<'a, T> = IResult<BitInput<'a>, T, nom::error::Error<BitInput<'a>>>;

pub(crate) type ByteResult<'a, T> = IResult<&'a [u8], T, nom::error::Error<&'a [u8]>>;

/// Take `count` bits (at most 32), most significant bit first
pub(crate) fn take_bits(i: BitInput<'_>, count: u32) -> BitResult<'_, u32> {
    take(count as usize)(i)
}

/// Read an unsigned word of 1 to 4 bytes with the given byte order
pub(crate) fn take_word(i: &[u8], bytes: usize, endian: Endianness) -> ByteResult<'_, u32> {
    match (bytes, endian) {
        (1, _) => be_u8(i).map(|(i, v)| (i, u32::from(v))),
        (2, Endianness::Little) => le_u16(i).map(|(i, v)| (i, u32::from(v))),
        (2, _) => be_u16(i).map(|(i, v)| (i, u32::from(v))),
        (3, Endianness::Little) => le_u24(i),
        (3, _) => be_u24(i),
        (4, Endianness::Little) => le_u32(i),
        _ => be_u32(i),
    }
}

/// Take the bytes of a NUL terminated string, without the terminator
pub(crate) fn take_terminated(i: &[u8]) -> ByteResult<'_, &[u8]> {
    let (i, s) = take_until(&[0u8][..])(i)?;
    Ok((&i[1..], s))
}
