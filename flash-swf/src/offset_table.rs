//! Back-patched offset tables
//!
//! A table of offsets precedes the variable length records it points at, so when writing it the
//! offsets aren't known yet. The table is written as zeroed [`Slot`]s, each slot is resolved with
//! the real value once the writer reaches the record, and the cursor returns to where it was.

use crate::bits::{BitReader, BitWriter};
use crate::codec::{decode_within, Decode};
use crate::context::Context;
use crate::errors::{Error, Result};

/// The size of each entry of an offset table
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OffsetWidth {
    /// Two byte entries
    Narrow,
    /// Four byte entries
    Wide,
}

impl OffsetWidth {
    /// Number of bytes per entry
    pub fn bytes(self) -> usize {
        match self {
            OffsetWidth::Narrow => 2,
            OffsetWidth::Wide => 4,
        }
    }

    /// The largest offset an entry can hold
    pub fn max(self) -> u64 {
        (1u64 << (self.bytes() * 8)) - 1
    }

    /// The narrowest width able to hold `offset`
    pub fn fitting(offset: usize) -> Self {
        if offset as u64 <= OffsetWidth::Narrow.max() {
            OffsetWidth::Narrow
        } else {
            OffsetWidth::Wide
        }
    }
}

/// The point offsets are measured from
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Origin {
    /// The first byte of the table itself
    TableStart,
    /// The first byte after the table, so the first entry is always 0
    TableEnd,
}

/// Compute the offsets of records of the given sizes, with the trailing sentinel
///
/// `table_len` is added to every offset, pass the byte length of the table when offsets are
/// measured from its start.
pub fn offsets_for(sizes: &[usize], table_len: usize) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(sizes.len() + 1);
    let mut next = table_len;
    offsets.push(next);
    for size in sizes {
        next += size;
        offsets.push(next);
    }
    offsets
}

/// A reserved word of the output, to be filled in later
#[derive(Debug)]
#[must_use = "a reserved slot is left zeroed unless it is resolved"]
pub struct Slot {
    position: usize,
    bytes: usize,
}

impl Slot {
    /// Write a zeroed placeholder word of `bytes` bytes at the next byte boundary
    pub fn reserve(out: &mut BitWriter, bytes: usize) -> Result<Self> {
        out.align()?;
        let position = out.position();
        out.write_word(bytes, 0, false)?;
        Ok(Self { position, bytes })
    }

    /// Bit position of the placeholder
    pub fn position(&self) -> usize {
        self.position
    }

    /// Overwrite the placeholder with `value`, the cursor is left where it was
    pub fn resolve(self, out: &mut BitWriter, value: usize) -> Result<()> {
        let max = (1u64 << (self.bytes * 8)) - 1;
        if value as u64 > max {
            return Err(Error::range("offset", value as i64, 0, max as i64));
        }
        out.patch_word(self.position, self.bytes, value as i64, false)
    }
}

/// An offset table being written
///
/// Created with one slot per record plus the sentinel. Call [`OffsetTable::mark`] right before
/// writing each record and [`OffsetTable::finish`] after the last one.
#[derive(Debug)]
pub struct OffsetTable {
    origin: usize,
    slots: std::vec::IntoIter<Slot>,
    count: usize,
    marked: usize,
}

impl OffsetTable {
    /// Reserve a table for `count` records
    pub fn reserve(out: &mut BitWriter, count: usize, width: OffsetWidth, origin: Origin) -> Result<Self> {
        out.align()?;
        let start = out.position();
        let slots = (0..=count)
            .map(|_| Slot::reserve(out, width.bytes()))
            .collect::<Result<Vec<_>>>()?;
        let origin = match origin {
            Origin::TableStart => start,
            Origin::TableEnd => out.position(),
        };
        Ok(Self {
            origin,
            slots: slots.into_iter(),
            count,
            marked: 0,
        })
    }

    /// Bit position the offsets are measured from
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Record that the next record starts at the current position
    pub fn mark(&mut self, out: &mut BitWriter) -> Result<()> {
        if self.marked == self.count {
            return Err(Error::range("offset table entry", self.marked as i64 + 1, 1, self.count as i64));
        }
        self.resolve_next(out)
    }

    /// Record the end of the last record in the sentinel
    pub fn finish(mut self, out: &mut BitWriter) -> Result<()> {
        if self.marked != self.count {
            return Err(Error::StructuralMismatch {
                record: "OffsetTable",
                offset: self.origin / 8,
                declared: self.count,
                discrepancy: self.marked as i64 - self.count as i64,
            });
        }
        self.resolve_next(out)
    }

    fn resolve_next(&mut self, out: &mut BitWriter) -> Result<()> {
        out.align()?;
        let offset = (out.position() - self.origin) / 8;
        let slot = self.slots.next().ok_or(Error::BufferExhausted {
            position: out.position(),
            requested: 0,
        })?;
        self.marked += 1;
        slot.resolve(out, offset)
    }
}

/// An offset table that has been read
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Offsets {
    origin: usize,
    entries: Vec<u32>,
}

impl Offsets {
    /// Read a table of `count` entries plus the sentinel
    ///
    /// Offsets must not decrease, otherwise the record between them would have a negative length.
    pub fn read(input: &mut BitReader<'_>, count: usize, width: OffsetWidth, origin: Origin) -> Result<Self> {
        input.align();
        let start = input.position();
        let needed = (count + 1) * width.bytes();
        if needed > input.remaining_bytes() {
            return Err(Error::BufferExhausted {
                position: start,
                requested: needed * 8,
            });
        }

        let mut entries = Vec::with_capacity(count + 1);
        for _ in 0..=count {
            let entry = input.read_word(width.bytes(), false)? as u32;
            if let Some(&previous) = entries.last() {
                if entry < previous {
                    return Err(Error::range("offset", entry, i64::from(previous), width.max() as i64));
                }
            }
            entries.push(entry);
        }
        let origin = match origin {
            Origin::TableStart => start,
            Origin::TableEnd => input.position(),
        };
        Ok(Self { origin, entries })
    }

    /// Every offset, the sentinel included
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Number of records the table points at
    pub fn len(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Whether the table points at no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The byte length of every record
    pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.windows(2).map(|pair| (pair[1] - pair[0]) as usize)
    }

    /// Bit position of the offset at `index`
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.entries.get(index).map(|&entry| self.origin + entry as usize * 8)
    }

    /// Bit position the sentinel points at
    pub fn end(&self) -> usize {
        self.origin + self.entries.last().copied().unwrap_or(0) as usize * 8
    }

    /// Decode each record at its offset, leaving `input` at the sentinel
    ///
    /// A record may end before the next offset, the gap is skipped.
    pub fn decode_each<T: Decode>(&self, input: &mut BitReader<'_>, context: &mut Context) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(self.len());
        for (index, length) in self.lengths().enumerate() {
            if let Some(position) = self.position_of(index) {
                input.seek(position)?;
            }
            items.push(decode_within(input, context, length)?);
        }
        input.seek(self.end())?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[derive(Debug, PartialEq)]
    struct Blob(Vec<u8>);

    impl Decode for Blob {
        fn decode(input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
            Ok(Blob(input.read_to_end()?.to_vec()))
        }
    }

    fn write_table(sizes: &[usize], width: OffsetWidth, origin: Origin) -> Vec<u8> {
        let table_len = (sizes.len() + 1) * width.bytes();
        let mut out = BitWriter::with_length(table_len + sizes.iter().sum::<usize>());
        let mut table = OffsetTable::reserve(&mut out, sizes.len(), width, origin).unwrap();
        for (i, &size) in sizes.iter().enumerate() {
            table.mark(&mut out).unwrap();
            out.write_bytes(&vec![i as u8 + 1; size]).unwrap();
        }
        table.finish(&mut out).unwrap();
        assert!(out.at_end());
        out.into_bytes()
    }

    #[test]
    fn offsets_from_the_first_record() {
        let bytes = write_table(&[10, 0, 7], OffsetWidth::Narrow, Origin::TableEnd);
        let mut input = BitReader::new(&bytes);
        let offsets = Offsets::read(&mut input, 3, OffsetWidth::Narrow, Origin::TableEnd).unwrap();
        assert_eq!(offsets.entries(), &[0, 10, 10, 17]);
        assert_eq!(offsets.lengths().collect::<Vec<_>>(), vec![10, 0, 7]);
        assert_eq!(offsets_for(&[10, 0, 7], 0), vec![0, 10, 10, 17]);
    }

    #[test]
    fn offsets_from_the_table() {
        let bytes = write_table(&[10, 0, 7], OffsetWidth::Wide, Origin::TableStart);
        assert_eq!(&bytes[..16], &[0, 0, 0, 16, 0, 0, 0, 26, 0, 0, 0, 26, 0, 0, 0, 33]);

        let mut input = BitReader::new(&bytes);
        let offsets = Offsets::read(&mut input, 3, OffsetWidth::Wide, Origin::TableStart).unwrap();
        let blobs: Vec<Blob> = offsets.decode_each(&mut input, &mut Context::default()).unwrap();
        assert_eq!(blobs, vec![Blob(vec![1; 10]), Blob(vec![]), Blob(vec![3; 7])]);
        assert!(input.at_end());
    }

    #[test]
    fn every_record_must_be_marked() {
        let mut out = BitWriter::with_length(16);
        let mut table = OffsetTable::reserve(&mut out, 2, OffsetWidth::Narrow, Origin::TableEnd).unwrap();
        table.mark(&mut out).unwrap();
        assert_eq!(table.finish(&mut out).unwrap_err().kind(), ErrorKind::StructuralMismatch);

        let mut out = BitWriter::with_length(16);
        let mut table = OffsetTable::reserve(&mut out, 1, OffsetWidth::Narrow, Origin::TableEnd).unwrap();
        table.mark(&mut out).unwrap();
        assert_eq!(table.mark(&mut out).unwrap_err().kind(), ErrorKind::RangeViolation);
    }

    #[test]
    fn narrow_slots_reject_large_offsets() {
        let mut out = BitWriter::with_length(2);
        let slot = Slot::reserve(&mut out, 2).unwrap();
        assert_eq!(
            slot.resolve(&mut out, 65536),
            Err(Error::RangeViolation {
                field: "offset",
                value: 65536,
                min: 0,
                max: 65535
            })
        );
        assert_eq!(OffsetWidth::fitting(65535), OffsetWidth::Narrow);
        assert_eq!(OffsetWidth::fitting(65536), OffsetWidth::Wide);
    }

    #[test]
    fn decreasing_offsets_are_rejected() {
        let data = [0, 4, 0, 2, 0, 6];
        let mut input = BitReader::new(&data);
        let error = Offsets::read(&mut input, 2, OffsetWidth::Narrow, Origin::TableStart).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RangeViolation);
    }
}
