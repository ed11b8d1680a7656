use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::Context;
use crate::errors::{Error, Result};

/// The identifier of a character definition, unique within a movie
///
/// Zero is reserved, so valid identifiers are 1 to 65535.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "u16"))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CharacterId(u16);

impl TryFrom<u16> for CharacterId {
    type Error = Error;

    fn try_from(id: u16) -> Result<Self> {
        Self::new(u32::from(id))
    }
}

impl CharacterId {
    /// Create an identifier, zero is rejected
    pub fn new(id: u32) -> Result<Self> {
        match u16::try_from(id) {
            Ok(id) if id != 0 => Ok(Self(id)),
            _ => Err(Error::range("character id", id, 1, i64::from(u16::MAX))),
        }
    }

    /// The numeric value
    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl Decode for CharacterId {
    fn decode(input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        Self::new(u32::from(input.read_u16()?))
    }
}

impl Encode for CharacterId {
    type Layout = usize;

    fn layout(&self, _context: &mut Context) -> Result<usize> {
        Ok(2)
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, _context: &mut Context) -> Result<()> {
        out.write_u16(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::from_bytes;
    use crate::errors::ErrorKind;

    #[test]
    fn zero_and_overflow_are_rejected_at_creation() {
        assert_eq!(CharacterId::new(0).unwrap_err().kind(), ErrorKind::RangeViolation);
        assert_eq!(CharacterId::new(65536).unwrap_err().kind(), ErrorKind::RangeViolation);
        assert_eq!(CharacterId::new(65535).unwrap().get(), 65535);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn zero_is_rejected_when_deserialized() {
        assert!(serde_json::from_str::<CharacterId>("0").is_err());
        assert_eq!(serde_json::from_str::<CharacterId>("7").unwrap().get(), 7);
        assert_eq!(serde_json::to_string(&CharacterId::new(7).unwrap()).unwrap(), "7");
    }

    #[test]
    fn zero_is_rejected_when_read() {
        let error = from_bytes::<CharacterId>(&[0, 0], &mut Context::default()).unwrap_err();
        assert_eq!(
            error,
            Error::RangeViolation {
                field: "character id",
                value: 0,
                min: 1,
                max: 65535
            }
        );
    }
}
