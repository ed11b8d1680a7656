use crate::bits::width::prefixed_width;
use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode, Layout};
use crate::context::Context;
use crate::errors::Result;
use crate::types::Fixed16;

const NBITS_WIDTH: u32 = 5;

/// A 2D affine transformation matrix
///
/// Scale and rotation terms are optional on the wire and default to the identity, the translation
/// is always present.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Transform {
    /// Horizontal and vertical scale
    pub scale: Option<(Fixed16, Fixed16)>,

    /// The two rotate and skew terms
    pub rotate_skew: Option<(Fixed16, Fixed16)>,

    /// Horizontal translation in twips
    pub translate_x: i32,

    /// Vertical translation in twips
    pub translate_y: i32,
}

impl Transform {
    /// A transform that only moves
    pub fn translate(x: i32, y: i32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::default()
        }
    }
}

/// Field widths chosen for a [`Transform`]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TransformLayout {
    scale_bits: Option<u32>,
    rotate_bits: Option<u32>,
    translate_bits: u32,
}

impl TransformLayout {
    /// Number of bits the transform occupies, without padding
    fn bit_len(&self) -> u32 {
        let pair = |bits: Option<u32>| bits.map_or(0, |n| NBITS_WIDTH + 2 * n);
        2 + pair(self.scale_bits) + pair(self.rotate_bits) + NBITS_WIDTH + 2 * self.translate_bits
    }
}

impl Layout for TransformLayout {
    fn byte_len(&self) -> usize {
        self.bit_len().div_ceil(8) as usize
    }
}

fn read_pair(input: &mut BitReader<'_>) -> Result<(i32, i32)> {
    let nbits = input.read_ubits(NBITS_WIDTH)?;
    Ok((input.read_sbits(nbits)?, input.read_sbits(nbits)?))
}

fn write_pair(out: &mut BitWriter, nbits: u32, (a, b): (i32, i32)) -> Result<()> {
    out.write_ubits(NBITS_WIDTH, nbits)?;
    out.write_sbits(nbits, a)?;
    out.write_sbits(nbits, b)
}

fn pair_width(pair: Option<(Fixed16, Fixed16)>) -> Result<Option<u32>> {
    pair.map(|(a, b)| prefixed_width("matrix term width", [a.0, b.0], NBITS_WIDTH))
        .transpose()
}

impl Decode for Transform {
    fn decode(input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        input.align();
        let scale = if input.read_bit()? {
            let (x, y) = read_pair(input)?;
            Some((Fixed16(x), Fixed16(y)))
        } else {
            None
        };
        let rotate_skew = if input.read_bit()? {
            let (r0, r1) = read_pair(input)?;
            Some((Fixed16(r0), Fixed16(r1)))
        } else {
            None
        };
        let (translate_x, translate_y) = read_pair(input)?;
        input.align();
        Ok(Self {
            scale,
            rotate_skew,
            translate_x,
            translate_y,
        })
    }
}

impl Encode for Transform {
    type Layout = TransformLayout;

    fn layout(&self, _context: &mut Context) -> Result<TransformLayout> {
        Ok(TransformLayout {
            scale_bits: pair_width(self.scale)?,
            rotate_bits: pair_width(self.rotate_skew)?,
            translate_bits: prefixed_width(
                "matrix translation width",
                [self.translate_x, self.translate_y],
                NBITS_WIDTH,
            )?,
        })
    }

    fn write_laid_out(&self, layout: &TransformLayout, out: &mut BitWriter, _context: &mut Context) -> Result<()> {
        out.align()?;
        for (pair, bits) in [(self.scale, layout.scale_bits), (self.rotate_skew, layout.rotate_bits)] {
            match (pair, bits) {
                (Some((a, b)), Some(nbits)) => {
                    out.write_bit(true)?;
                    write_pair(out, nbits, (a.0, b.0))?;
                }
                _ => out.write_bit(false)?,
            }
        }
        write_pair(out, layout.translate_bits, (self.translate_x, self.translate_y))?;
        out.align()
    }
}
