use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode, Layout};
use crate::context::Context;
use crate::errors::Result;
use crate::types::{CharacterId, Color, Fixed8, Gradient, Transform, TransformLayout};
use crate::variant::{decode_variant, unsupported, Variant};

/// How an area is painted
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FillStyle {
    Solid(Color),

    LinearGradient {
        transform: Transform,
        gradient: Gradient,
    },

    RadialGradient {
        transform: Transform,
        gradient: Gradient,
    },

    /// A radial gradient whose focal point is moved along the horizontal axis
    FocalGradient {
        transform: Transform,
        gradient: Gradient,
        /// -1.0 to 1.0, from the left edge to the right edge
        focal_point: Fixed8,
    },

    Bitmap {
        id: CharacterId,
        transform: Transform,
        /// Tile the bitmap instead of clamping its edge pixels
        repeating: bool,
        smoothed: bool,
    },
}

/// Layout of a [`FillStyle`], the transform widths and the total length
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FillStyleLayout {
    transform: Option<TransformLayout>,
    bytes: usize,
}

impl Layout for FillStyleLayout {
    fn byte_len(&self) -> usize {
        self.bytes
    }
}

impl Variant for FillStyle {
    const FAMILY: &'static str = "fill style";

    fn discriminant(&self) -> u8 {
        match self {
            FillStyle::Solid(_) => 0x00,
            FillStyle::LinearGradient { .. } => 0x10,
            FillStyle::RadialGradient { .. } => 0x12,
            FillStyle::FocalGradient { .. } => 0x13,
            FillStyle::Bitmap {
                repeating, smoothed, ..
            } => {
                let clipped = if *repeating { 0 } else { 1 };
                let hard_edged = if *smoothed { 0 } else { 2 };
                0x40 | clipped | hard_edged
            }
        }
    }

    fn decode_variant(discriminant: u8, input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        Ok(match discriminant {
            0x00 => FillStyle::Solid(Color::decode(input, context)?),
            0x10 => FillStyle::LinearGradient {
                transform: Transform::decode(input, context)?,
                gradient: Gradient::decode(input, context)?,
            },
            0x12 => FillStyle::RadialGradient {
                transform: Transform::decode(input, context)?,
                gradient: Gradient::decode(input, context)?,
            },
            0x13 => FillStyle::FocalGradient {
                transform: Transform::decode(input, context)?,
                gradient: Gradient::decode(input, context)?,
                focal_point: Fixed8(input.read_i16()?),
            },
            0x40..=0x43 => FillStyle::Bitmap {
                id: CharacterId::decode(input, context)?,
                transform: Transform::decode(input, context)?,
                repeating: discriminant & 1 == 0,
                smoothed: discriminant & 2 == 0,
            },
            d => return Err(unsupported::<Self>(d)),
        })
    }
}

impl Decode for FillStyle {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        decode_variant(input, context)
    }
}

impl Encode for FillStyle {
    type Layout = FillStyleLayout;

    fn layout(&self, context: &mut Context) -> Result<FillStyleLayout> {
        let (transform, body) = match self {
            FillStyle::Solid(color) => (None, color.measure(context)?),
            FillStyle::LinearGradient { transform, gradient } | FillStyle::RadialGradient { transform, gradient } => {
                let transform = transform.layout(context)?;
                let body = transform.byte_len() + gradient.measure(context)?;
                (Some(transform), body)
            }
            FillStyle::FocalGradient {
                transform, gradient, ..
            } => {
                let transform = transform.layout(context)?;
                let body = transform.byte_len() + gradient.measure(context)? + 2;
                (Some(transform), body)
            }
            FillStyle::Bitmap { transform, .. } => {
                let transform = transform.layout(context)?;
                let body = 2 + transform.byte_len();
                (Some(transform), body)
            }
        };
        Ok(FillStyleLayout {
            transform,
            bytes: 1 + body,
        })
    }

    fn write_laid_out(&self, layout: &FillStyleLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        out.write_u8(self.discriminant())?;
        let write_transform = |transform: &Transform, out: &mut BitWriter, context: &mut Context| match &layout.transform {
            Some(laid_out) => transform.encode_with(laid_out, out, context),
            None => transform.encode(out, context),
        };
        match self {
            FillStyle::Solid(color) => color.encode(out, context),
            FillStyle::LinearGradient { transform, gradient } | FillStyle::RadialGradient { transform, gradient } => {
                write_transform(transform, out, context)?;
                gradient.encode(out, context)
            }
            FillStyle::FocalGradient {
                transform,
                gradient,
                focal_point,
            } => {
                write_transform(transform, out, context)?;
                gradient.encode(out, context)?;
                out.write_i16(focal_point.0)
            }
            FillStyle::Bitmap { id, transform, .. } => {
                id.encode(out, context)?;
                write_transform(transform, out, context)
            }
        }
    }
}
