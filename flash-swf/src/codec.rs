//! The two-phase contract shared by every record
//!
//! Encoding a record is split in two: [`Encode::layout`] works out how many bytes the record
//! occupies along with any choices the writer needs (field widths, wide or narrow forms), then
//! [`Encode::write_laid_out`] emits exactly that many bytes. The layout is a separate value handed
//! from one phase to the next, records never cache anything on themselves.
//!
//! Records implementing these traits are byte-aligned: they start on a byte boundary and their
//! length is a whole number of bytes. Bit-packed members of a record are encoded by the record
//! that owns them.

use std::any::type_name;

use crate::bits::{BitReader, BitWriter};
use crate::context::Context;
use crate::errors::{Error, Result};

/// The result of the first encoding phase
pub trait Layout {
    /// Number of bytes the record will occupy
    fn byte_len(&self) -> usize;
}

impl Layout for usize {
    #[inline]
    fn byte_len(&self) -> usize {
        *self
    }
}

/// A record that can be written
pub trait Encode {
    /// Choices made while measuring that the writer needs to repeat exactly
    type Layout: Layout;

    /// Measure the record under `context`
    fn layout(&self, context: &mut Context) -> Result<Self::Layout>;

    /// Write the record as laid out, the cursor must end exactly `layout.byte_len()` bytes later
    fn write_laid_out(&self, layout: &Self::Layout, out: &mut BitWriter, context: &mut Context) -> Result<()>;

    /// Number of bytes [`Encode::encode`] will write
    fn measure(&self, context: &mut Context) -> Result<usize> {
        Ok(self.layout(context)?.byte_len())
    }

    /// Measure and write the record
    fn encode(&self, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        let layout = self.layout(context)?;
        self.encode_with(&layout, out, context)
    }

    /// Write a record that has already been laid out, checking the written length
    fn encode_with(&self, layout: &Self::Layout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        out.align()?;
        let start = out.position();
        self.write_laid_out(layout, out, context)?;
        check_consumed(record_name::<Self>(), start, out.position(), layout.byte_len())
    }
}

/// A record that can be read
pub trait Decode: Sized {
    /// Read the record from the current position of `input`
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self>;
}

/// The unqualified name of a record type, used in error reports
pub(crate) fn record_name<T: ?Sized>() -> &'static str {
    let name = type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Check that a record starting at bit `start` and ending at bit `end` is `declared` bytes long
pub(crate) fn check_consumed(record: &'static str, start: usize, end: usize, declared: usize) -> Result<()> {
    let actual = end as i64 - start as i64;
    let expected = declared as i64 * 8;
    if actual == expected {
        return Ok(());
    }

    // Partial bytes count as a whole byte in the direction of the error
    let difference = actual - expected;
    let discrepancy = difference.signum() * ((difference.abs() + 7) / 8);
    Err(Error::StructuralMismatch {
        record,
        offset: start / 8,
        declared,
        discrepancy,
    })
}

/// Encode a single record into a buffer of exactly its measured size
pub fn to_bytes<T: Encode + ?Sized>(value: &T, context: &mut Context) -> Result<Vec<u8>> {
    let layout = value.layout(context)?;
    let mut out = BitWriter::with_length(layout.byte_len());
    value.encode_with(&layout, &mut out, context)?;
    Ok(out.into_bytes())
}

/// Decode a single record that must occupy the whole of `data`
pub fn from_bytes<T: Decode>(data: &[u8], context: &mut Context) -> Result<T> {
    let mut input = BitReader::new(data);
    let value = T::decode(&mut input, context)?;
    input.align();
    check_consumed(record_name::<T>(), 0, input.position(), data.len())?;
    Ok(value)
}

/// Decode a record of a declared length, it must consume exactly `length` bytes
///
/// The record can't read past its length, and on success `input` is left at the end of it.
pub fn decode_exact<T: Decode>(input: &mut BitReader<'_>, context: &mut Context, length: usize) -> Result<T> {
    let mut window = input.limited(length)?;
    let start = window.position();
    let value = T::decode(&mut window, context)?;
    window.align();
    check_consumed(record_name::<T>(), start, window.position(), length)?;
    input.seek(window.limit())?;
    Ok(value)
}

/// Decode a record of a declared length, skipping whatever the record leaves unread
///
/// Used for members that end with a terminator and may be followed by padding up to the length
/// their container gave them.
pub fn decode_within<T: Decode>(input: &mut BitReader<'_>, context: &mut Context, length: usize) -> Result<T> {
    let mut window = input.limited(length)?;
    let value = T::decode(&mut window, context)?;
    let residual = window.remaining_bits();
    if residual >= 8 {
        log::trace!(
            "{}: skipping {} bytes of padding at byte {}",
            record_name::<T>(),
            residual / 8,
            window.byte_position()
        );
    }
    input.seek(window.limit())?;
    Ok(value)
}

/// Lay out every record of a list
pub fn layout_all<T: Encode>(items: &[T], context: &mut Context) -> Result<Vec<T::Layout>> {
    items.iter().map(|item| item.layout(context)).collect()
}

/// Total length of a laid out list
pub fn total_len<L: Layout>(layouts: &[L]) -> usize {
    layouts.iter().map(Layout::byte_len).sum()
}

/// Write every record of a list with the layouts from [`layout_all`]
pub fn write_all<T: Encode>(items: &[T], layouts: &[T::Layout], out: &mut BitWriter, context: &mut Context) -> Result<()> {
    for (item, layout) in items.iter().zip(layouts) {
        item.encode_with(layout, out, context)?;
    }
    Ok(())
}

/// Read `count` records
pub fn decode_list<T: Decode>(input: &mut BitReader<'_>, context: &mut Context, count: usize) -> Result<Vec<T>> {
    // Don't trust `count` with the allocation, every record is at least a byte
    let mut items = Vec::with_capacity(count.min(input.remaining_bytes()));
    for _ in 0..count {
        items.push(T::decode(input, context)?);
    }
    Ok(items)
}
