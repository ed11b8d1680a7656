use enumset::{EnumSet, EnumSetType};

use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode, Layout};
use crate::context::{Context, Flag};
use crate::errors::{Error, Result};
use crate::tag::TagCode;
use crate::types::{Color, FillStyle, FillStyleLayout, Fixed8};
use crate::variant::{unsupported, Variant};

/// The shape drawn at the ends of an open line
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CapStyle {
    #[default]
    Round,
    None,
    Square,
}

impl CapStyle {
    fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            0 => Ok(CapStyle::Round),
            1 => Ok(CapStyle::None),
            2 => Ok(CapStyle::Square),
            other => Err(Error::UnsupportedVariant {
                family: "cap style",
                discriminant: other,
            }),
        }
    }

    fn bits(self) -> u32 {
        match self {
            CapStyle::Round => 0,
            CapStyle::None => 1,
            CapStyle::Square => 2,
        }
    }
}

/// The shape drawn where two segments of a line meet
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum JoinStyle {
    #[default]
    Round,
    Bevel,
    /// Mitered, with the miter limit factor
    Miter(Fixed8),
}

impl JoinStyle {
    fn bits(self) -> u32 {
        match self {
            JoinStyle::Round => 0,
            JoinStyle::Bevel => 1,
            JoinStyle::Miter(_) => 2,
        }
    }
}

/// Boolean options of an extended line style
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug, Hash)]
pub enum LineFlag {
    /// Don't scale the stroke width horizontally
    NoHScale,
    /// Don't scale the stroke width vertically
    NoVScale,
    /// Snap the stroke to whole pixels
    PixelHinting,
    /// Don't close the stroke when it ends where it started
    NoClose,
}

/// The paint of an extended line style
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LineFill {
    Color(Color),
    Fill(FillStyle),
}

/// How the outline of a shape is stroked
///
/// Shapes defined with `DefineShape4` use the extended form, all others the plain one. The form
/// is selected by the enclosing tag rather than by a byte in the data.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LineStyle {
    Plain {
        /// Width in twips
        width: u16,
        color: Color,
    },

    Extended {
        /// Width in twips
        width: u16,
        start_cap: CapStyle,
        end_cap: CapStyle,
        join: JoinStyle,
        flags: EnumSet<LineFlag>,
        fill: LineFill,
    },
}

const PLAIN: u8 = 1;
const EXTENDED: u8 = 2;

impl LineStyle {
    /// The form of line style used inside the current tag
    pub(crate) fn discriminant_for(context: &Context) -> u8 {
        if context.tag() == Some(TagCode::DefineShape4) {
            EXTENDED
        } else {
            PLAIN
        }
    }

    /// Fail if this form of line style can't be written inside the current tag
    fn check_form(&self, context: &Context) -> Result<()> {
        let expected = Self::discriminant_for(context);
        if self.discriminant() != expected {
            return Err(unsupported::<Self>(self.discriminant()));
        }
        Ok(())
    }
}

impl Variant for LineStyle {
    const FAMILY: &'static str = "line style";

    fn discriminant(&self) -> u8 {
        match self {
            LineStyle::Plain { .. } => PLAIN,
            LineStyle::Extended { .. } => EXTENDED,
        }
    }

    fn decode_variant(discriminant: u8, input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        match discriminant {
            PLAIN => Ok(LineStyle::Plain {
                width: input.read_u16()?,
                color: Color::decode(input, context)?,
            }),
            EXTENDED => {
                let width = input.read_u16()?;
                let start_cap = CapStyle::from_bits(input.read_ubits(2)?)?;
                let join_bits = input.read_ubits(2)?;
                let has_fill = input.read_bit()?;
                let mut flags = EnumSet::new();
                for flag in [LineFlag::NoHScale, LineFlag::NoVScale, LineFlag::PixelHinting] {
                    if input.read_bit()? {
                        flags.insert(flag);
                    }
                }
                input.skip(5)?;
                if input.read_bit()? {
                    flags.insert(LineFlag::NoClose);
                }
                let end_cap = CapStyle::from_bits(input.read_ubits(2)?)?;
                let join = match join_bits {
                    0 => JoinStyle::Round,
                    1 => JoinStyle::Bevel,
                    2 => JoinStyle::Miter(Fixed8(input.read_i16()?)),
                    other => {
                        return Err(Error::UnsupportedVariant {
                            family: "join style",
                            discriminant: other,
                        });
                    }
                };
                let fill = if has_fill {
                    LineFill::Fill(FillStyle::decode(input, context)?)
                } else {
                    let mut scope = context.push(Flag::Transparent, true);
                    LineFill::Color(Color::decode(input, &mut scope)?)
                };
                Ok(LineStyle::Extended {
                    width,
                    start_cap,
                    end_cap,
                    join,
                    flags,
                    fill,
                })
            }
            d => Err(unsupported::<Self>(d)),
        }
    }
}

impl Decode for LineStyle {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let discriminant = Self::discriminant_for(context);
        context.resolve(discriminant, input)
    }
}

/// Layout of a [`LineStyle`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineStyleLayout {
    fill: Option<FillStyleLayout>,
    bytes: usize,
}

impl Layout for LineStyleLayout {
    fn byte_len(&self) -> usize {
        self.bytes
    }
}

impl Encode for LineStyle {
    type Layout = LineStyleLayout;

    fn layout(&self, context: &mut Context) -> Result<LineStyleLayout> {
        self.check_form(context)?;
        Ok(match self {
            LineStyle::Plain { color, .. } => LineStyleLayout {
                fill: None,
                bytes: 2 + color.measure(context)?,
            },
            LineStyle::Extended { join, fill, .. } => {
                let miter = if matches!(join, JoinStyle::Miter(_)) { 2 } else { 0 };
                let (fill, paint) = match fill {
                    LineFill::Fill(style) => {
                        let layout = style.layout(context)?;
                        let bytes = layout.byte_len();
                        (Some(layout), bytes)
                    }
                    LineFill::Color(_) => (None, 4),
                };
                LineStyleLayout {
                    fill,
                    bytes: 2 + 2 + miter + paint,
                }
            }
        })
    }

    fn write_laid_out(&self, layout: &LineStyleLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        match self {
            LineStyle::Plain { width, color } => {
                out.write_u16(*width)?;
                color.encode(out, context)
            }
            LineStyle::Extended {
                width,
                start_cap,
                end_cap,
                join,
                flags,
                fill,
            } => {
                out.write_u16(*width)?;
                out.write_ubits(2, start_cap.bits())?;
                out.write_ubits(2, join.bits())?;
                out.write_bit(matches!(fill, LineFill::Fill(_)))?;
                out.write_bit(flags.contains(LineFlag::NoHScale))?;
                out.write_bit(flags.contains(LineFlag::NoVScale))?;
                out.write_bit(flags.contains(LineFlag::PixelHinting))?;
                out.write_ubits(5, 0)?;
                out.write_bit(flags.contains(LineFlag::NoClose))?;
                out.write_ubits(2, end_cap.bits())?;
                if let JoinStyle::Miter(limit) = join {
                    out.write_i16(limit.0)?;
                }
                match (fill, &layout.fill) {
                    (LineFill::Fill(style), Some(laid_out)) => style.encode_with(laid_out, out, context),
                    (LineFill::Fill(style), None) => style.encode(out, context),
                    (LineFill::Color(color), _) => {
                        let mut scope = context.push(Flag::Transparent, true);
                        color.encode(out, &mut scope)
                    }
                }
            }
        }
    }
}
