use crate::bits::width::prefixed_width;
use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode, Layout};
use crate::context::Context;
use crate::errors::{Error, Result};

/// Width of the field holding the coordinate width
const NBITS_WIDTH: u32 = 5;

/// The largest coordinate a rectangle can hold
pub const MAX_COORDINATE: i32 = (1 << 30) - 1;

/// The smallest coordinate a rectangle can hold
pub const MIN_COORDINATE: i32 = -(1 << 30);

/// An axis aligned rectangle, in twips
///
/// The four coordinates share one width, the smallest that holds the most extreme of them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(try_from = "BoundsFields"))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Bounds {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
}

/// The unchecked coordinates of a deserialized [`Bounds`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BoundsFields {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
}

#[cfg(feature = "serde")]
impl TryFrom<BoundsFields> for Bounds {
    type Error = Error;

    fn try_from(fields: BoundsFields) -> Result<Self> {
        Self::new(fields.x_min, fields.x_max, fields.y_min, fields.y_max)
    }
}

impl Bounds {
    /// Create a rectangle, every coordinate must fit in 31 signed bits
    pub fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Result<Self> {
        for value in [x_min, x_max, y_min, y_max] {
            if !(MIN_COORDINATE..=MAX_COORDINATE).contains(&value) {
                return Err(Error::range(
                    "rectangle coordinate",
                    value,
                    i64::from(MIN_COORDINATE),
                    i64::from(MAX_COORDINATE),
                ));
            }
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn x_min(&self) -> i32 {
        self.x_min
    }

    pub fn x_max(&self) -> i32 {
        self.x_max
    }

    pub fn y_min(&self) -> i32 {
        self.y_min
    }

    pub fn y_max(&self) -> i32 {
        self.y_max
    }

    fn coordinates(&self) -> [i32; 4] {
        [self.x_min, self.x_max, self.y_min, self.y_max]
    }
}

/// The width chosen for the coordinates of a [`Bounds`]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BoundsLayout {
    /// Bits per coordinate
    pub nbits: u32,
}

impl Layout for BoundsLayout {
    fn byte_len(&self) -> usize {
        (NBITS_WIDTH + 4 * self.nbits).div_ceil(8) as usize
    }
}

impl Decode for Bounds {
    fn decode(input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        input.align();
        let nbits = input.read_ubits(NBITS_WIDTH)?;
        let x_min = input.read_sbits(nbits)?;
        let x_max = input.read_sbits(nbits)?;
        let y_min = input.read_sbits(nbits)?;
        let y_max = input.read_sbits(nbits)?;
        input.align();
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

impl Encode for Bounds {
    type Layout = BoundsLayout;

    fn layout(&self, _context: &mut Context) -> Result<BoundsLayout> {
        let nbits = prefixed_width("rectangle coordinate width", self.coordinates(), NBITS_WIDTH)?;
        Ok(BoundsLayout { nbits })
    }

    fn write_laid_out(&self, layout: &BoundsLayout, out: &mut BitWriter, _context: &mut Context) -> Result<()> {
        out.align()?;
        out.write_ubits(NBITS_WIDTH, layout.nbits)?;
        for value in self.coordinates() {
            out.write_sbits(layout.nbits, value)?;
        }
        out.align()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};
    use crate::errors::ErrorKind;

    #[test]
    fn minimal_width_is_chosen() {
        let mut context = Context::default();
        let bounds = Bounds::new(-100, 100, -100, 100).unwrap();
        let layout = bounds.layout(&mut context).unwrap();
        assert_eq!(layout.nbits, 8);
        assert_eq!(layout.byte_len(), 5);

        let bounds = Bounds::new(0, 11000, 0, 8000).unwrap();
        assert_eq!(bounds.layout(&mut context).unwrap().nbits, 15);
        assert_eq!(to_bytes(&bounds, &mut context).unwrap(), vec![0x78, 0x00, 0x05, 0x5f, 0x00, 0x00, 0x0f, 0xa0, 0x00]);
    }

    #[test]
    fn padded_on_both_sides() {
        let mut context = Context::default();
        let bounds = Bounds::new(-100, 100, -100, 100).unwrap();
        let mut out = BitWriter::with_length(7);
        out.write_bit(true).unwrap();
        bounds.encode(&mut out, &mut context).unwrap();
        assert_eq!(out.position(), 48);
        out.write_u8(0xaa).unwrap();

        let bytes = out.into_bytes();
        assert_eq!(bytes, vec![0x80, 0x44, 0xe3, 0x24, 0xe3, 0x20, 0xaa]);

        let mut input = BitReader::new(&bytes);
        assert!(input.read_bit().unwrap());
        assert_eq!(Bounds::decode(&mut input, &mut context).unwrap(), bounds);
        assert_eq!(input.read_u8().unwrap(), 0xaa);
    }

    #[test]
    fn empty_rectangle_has_zero_width() {
        let mut context = Context::default();
        assert_eq!(to_bytes(&Bounds::default(), &mut context).unwrap(), vec![0]);
        assert_eq!(from_bytes::<Bounds>(&[0], &mut context).unwrap(), Bounds::default());
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert_eq!(
            Bounds::new(0, 1 << 30, 0, 0).unwrap_err().kind(),
            ErrorKind::RangeViolation
        );
        assert!(Bounds::new(MIN_COORDINATE, MAX_COORDINATE, 0, 0).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn coordinates_are_checked_when_deserialized() {
        let json = format!(r#"{{"x_min":{},"x_max":0,"y_min":0,"y_max":0}}"#, i32::MIN);
        assert!(serde_json::from_str::<Bounds>(&json).is_err());

        let bounds = Bounds::new(-100, 100, -100, 100).unwrap();
        let json = serde_json::to_string(&bounds).unwrap();
        assert_eq!(serde_json::from_str::<Bounds>(&json).unwrap(), bounds);
    }
}
