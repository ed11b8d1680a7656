use enumset::{EnumSet, EnumSetType};

use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::Context;
use crate::errors::Result;

/// A capability a movie declares before its first frame
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug, Hash)]
pub enum FileAttribute {
    UseDirectBlit,
    UseGpu,
    HasMetadata,
    ActionScript3,
    SuppressCrossDomainCaching,
    RelativeUrls,
    /// Allow network access when played from the local file system
    UseNetwork,
}

const ATTRIBUTE_BITS: [(FileAttribute, u32); 7] = [
    (FileAttribute::UseDirectBlit, 0x4000_0000),
    (FileAttribute::UseGpu, 0x2000_0000),
    (FileAttribute::HasMetadata, 0x1000_0000),
    (FileAttribute::ActionScript3, 0x0800_0000),
    (FileAttribute::SuppressCrossDomainCaching, 0x0400_0000),
    (FileAttribute::RelativeUrls, 0x0200_0000),
    (FileAttribute::UseNetwork, 0x0100_0000),
];

/// The body of the `FileAttributes` tag
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FileAttributes(pub EnumSet<FileAttribute>);

impl Decode for FileAttributes {
    fn decode(input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        let bits = input.read_u32()?;
        let known = ATTRIBUTE_BITS.iter().fold(0, |all, (_, bit)| all | bit);
        if bits & !known != 0 {
            log::trace!("file attributes: reserved bits {:#010x} set", bits & !known);
        }
        Ok(Self(
            ATTRIBUTE_BITS
                .iter()
                .filter(|(_, bit)| bits & bit != 0)
                .map(|(attribute, _)| *attribute)
                .collect(),
        ))
    }
}

impl Encode for FileAttributes {
    type Layout = usize;

    fn layout(&self, _context: &mut Context) -> Result<usize> {
        Ok(4)
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, _context: &mut Context) -> Result<()> {
        let bits = ATTRIBUTE_BITS
            .iter()
            .filter(|(attribute, _)| self.0.contains(*attribute))
            .fold(0, |bits, (_, bit)| bits | bit);
        out.write_u32(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    #[test]
    fn flags_live_in_the_first_byte() {
        let attributes = FileAttributes(FileAttribute::ActionScript3 | FileAttribute::UseNetwork);
        let mut context = Context::default();
        let bytes = to_bytes(&attributes, &mut context).unwrap();
        assert_eq!(bytes, vec![0x09, 0, 0, 0]);
        assert_eq!(from_bytes::<FileAttributes>(&bytes, &mut context).unwrap(), attributes);
    }

    #[test]
    fn reserved_bits_are_dropped() {
        let attributes = from_bytes::<FileAttributes>(&[0x88, 0, 0, 0xff], &mut Context::default()).unwrap();
        assert_eq!(attributes, FileAttributes(FileAttribute::ActionScript3.into()));
    }
}
