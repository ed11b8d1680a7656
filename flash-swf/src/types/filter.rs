//! Bitmap filters applied to display objects
//!
//! Filter colors always carry alpha, whatever the enclosing tag says.

use enumset::{EnumSet, EnumSetType};

use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::{Context, Flag};
use crate::errors::{Error, Result};
use crate::types::{Color, Fixed16, Fixed8};
use crate::variant::{decode_variant, unsupported, Variant};

/// Compositing options shared by the shadow, glow and bevel filters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug, Hash)]
pub enum FilterFlag {
    /// Apply to the inside of the object
    Inner,
    /// Hide the object itself
    Knockout,
    /// Composite the filter with the object
    CompositeSource,
    /// Draw the bevel over the object
    OnTop,
}

/// Blur radius, shared by most filters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Blur {
    pub x: Fixed16,
    pub y: Fixed16,
}

/// Parameters common to the drop shadow, glow and bevel families
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Glow {
    pub blur: Blur,
    /// Radians
    pub angle: Fixed16,
    pub distance: Fixed16,
    pub strength: Fixed8,
    pub flags: EnumSet<FilterFlag>,
    pub passes: u8,
}

/// A color stop of a gradient filter
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FilterStop {
    pub color: Color,
    pub ratio: u8,
}

/// A filter, identified on the wire by a leading type byte
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    DropShadow { color: Color, glow: Glow },
    Blur { blur: Blur, passes: u8 },
    Glow { color: Color, glow: Glow },
    Bevel { shadow: Color, highlight: Color, glow: Glow },
    GradientGlow { stops: Vec<FilterStop>, glow: Glow },
    Convolution {
        columns: u8,
        rows: u8,
        divisor: f32,
        bias: f32,
        matrix: Vec<f32>,
        default_color: Color,
        clamp: bool,
        preserve_alpha: bool,
    },
    /// A 4x5 matrix, row major
    ColorMatrix(Box<[f32; 20]>),
    GradientBevel { stops: Vec<FilterStop>, glow: Glow },
}

fn read_blur(input: &mut BitReader<'_>) -> Result<Blur> {
    Ok(Blur {
        x: Fixed16(input.read_i32()?),
        y: Fixed16(input.read_i32()?),
    })
}

fn write_blur(out: &mut BitWriter, blur: &Blur) -> Result<()> {
    out.write_i32(blur.x.0)?;
    out.write_i32(blur.y.0)
}

/// Read the glow parameters, `on_top` selects the bevel form with 4 bits of passes
fn read_glow(input: &mut BitReader<'_>, angled: bool, on_top: bool) -> Result<Glow> {
    let blur = read_blur(input)?;
    let (angle, distance) = if angled {
        (Fixed16(input.read_i32()?), Fixed16(input.read_i32()?))
    } else {
        (Fixed16::default(), Fixed16::default())
    };
    let strength = Fixed8(input.read_i16()?);
    let mut flags = EnumSet::new();
    for flag in [FilterFlag::Inner, FilterFlag::Knockout, FilterFlag::CompositeSource] {
        if input.read_bit()? {
            flags.insert(flag);
        }
    }
    let passes = if on_top {
        if input.read_bit()? {
            flags.insert(FilterFlag::OnTop);
        }
        input.read_ubits(4)?
    } else {
        input.read_ubits(5)?
    };
    Ok(Glow {
        blur,
        angle,
        distance,
        strength,
        flags,
        passes: passes as u8,
    })
}

fn write_glow(out: &mut BitWriter, glow: &Glow, angled: bool, on_top: bool) -> Result<()> {
    write_blur(out, &glow.blur)?;
    if angled {
        out.write_i32(glow.angle.0)?;
        out.write_i32(glow.distance.0)?;
    }
    out.write_i16(glow.strength.0)?;
    for flag in [FilterFlag::Inner, FilterFlag::Knockout, FilterFlag::CompositeSource] {
        out.write_bit(glow.flags.contains(flag))?;
    }
    if on_top {
        out.write_bit(glow.flags.contains(FilterFlag::OnTop))?;
        out.write_ubits(4, u32::from(glow.passes))
    } else {
        out.write_ubits(5, u32::from(glow.passes))
    }
}

/// Length of the glow parameters
fn glow_len(angled: bool) -> usize {
    8 + if angled { 8 } else { 0 } + 2 + 1
}

fn read_stops(input: &mut BitReader<'_>, context: &mut Context) -> Result<Vec<FilterStop>> {
    let count = input.read_u8()? as usize;
    let mut colors = Vec::with_capacity(count);
    for _ in 0..count {
        colors.push(Color::decode(input, context)?);
    }
    let ratios = input.read_bytes(count)?;
    Ok(colors
        .into_iter()
        .zip(ratios)
        .map(|(color, &ratio)| FilterStop { color, ratio })
        .collect())
}

fn write_stops(out: &mut BitWriter, stops: &[FilterStop], context: &mut Context) -> Result<()> {
    out.write_u8(stop_count(stops)?)?;
    for stop in stops {
        stop.color.encode(out, context)?;
    }
    for stop in stops {
        out.write_u8(stop.ratio)?;
    }
    Ok(())
}

fn stop_count(stops: &[FilterStop]) -> Result<u8> {
    u8::try_from(stops.len()).map_err(|_| Error::range("filter gradient stops", stops.len() as i64, 0, 255))
}

impl Variant for Filter {
    const FAMILY: &'static str = "filter";

    fn discriminant(&self) -> u8 {
        match self {
            Filter::DropShadow { .. } => 0,
            Filter::Blur { .. } => 1,
            Filter::Glow { .. } => 2,
            Filter::Bevel { .. } => 3,
            Filter::GradientGlow { .. } => 4,
            Filter::Convolution { .. } => 5,
            Filter::ColorMatrix(_) => 6,
            Filter::GradientBevel { .. } => 7,
        }
    }

    fn decode_variant(discriminant: u8, input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let mut scope = context.push(Flag::Transparent, true);
        let context = &mut *scope;
        Ok(match discriminant {
            0 => Filter::DropShadow {
                color: Color::decode(input, context)?,
                glow: read_glow(input, true, false)?,
            },
            1 => {
                let blur = read_blur(input)?;
                let passes = input.read_ubits(5)? as u8;
                input.skip(3)?;
                Filter::Blur { blur, passes }
            }
            2 => Filter::Glow {
                color: Color::decode(input, context)?,
                glow: read_glow(input, false, false)?,
            },
            3 => Filter::Bevel {
                shadow: Color::decode(input, context)?,
                highlight: Color::decode(input, context)?,
                glow: read_glow(input, true, true)?,
            },
            4 => Filter::GradientGlow {
                stops: read_stops(input, context)?,
                glow: read_glow(input, true, true)?,
            },
            5 => {
                let columns = input.read_u8()?;
                let rows = input.read_u8()?;
                let divisor = input.read_f32()?;
                let bias = input.read_f32()?;
                let cells = usize::from(columns) * usize::from(rows);
                let mut matrix = Vec::with_capacity(cells);
                for _ in 0..cells {
                    matrix.push(input.read_f32()?);
                }
                let default_color = Color::decode(input, context)?;
                input.skip(6)?;
                let clamp = input.read_bit()?;
                let preserve_alpha = input.read_bit()?;
                Filter::Convolution {
                    columns,
                    rows,
                    divisor,
                    bias,
                    matrix,
                    default_color,
                    clamp,
                    preserve_alpha,
                }
            }
            6 => {
                let mut matrix = [0.0; 20];
                for cell in matrix.iter_mut() {
                    *cell = input.read_f32()?;
                }
                Filter::ColorMatrix(Box::new(matrix))
            }
            7 => Filter::GradientBevel {
                stops: read_stops(input, context)?,
                glow: read_glow(input, true, true)?,
            },
            d => return Err(unsupported::<Self>(d)),
        })
    }
}

impl Decode for Filter {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        decode_variant(input, context)
    }
}

impl Encode for Filter {
    type Layout = usize;

    fn layout(&self, _context: &mut Context) -> Result<usize> {
        let body = match self {
            Filter::DropShadow { .. } => 4 + glow_len(true),
            Filter::Blur { .. } => 9,
            Filter::Glow { .. } => 4 + glow_len(false),
            Filter::Bevel { .. } => 8 + glow_len(true),
            Filter::GradientGlow { stops, .. } | Filter::GradientBevel { stops, .. } => {
                1 + usize::from(stop_count(stops)?) * 5 + glow_len(true)
            }
            Filter::Convolution {
                columns, rows, matrix, ..
            } => {
                let cells = usize::from(*columns) * usize::from(*rows);
                if matrix.len() != cells {
                    return Err(Error::range("convolution matrix cells", matrix.len() as i64, cells as i64, cells as i64));
                }
                2 + 8 + 4 * cells + 4 + 1
            }
            Filter::ColorMatrix(_) => 80,
        };
        Ok(1 + body)
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        out.write_u8(self.discriminant())?;
        let mut scope = context.push(Flag::Transparent, true);
        let context = &mut *scope;
        match self {
            Filter::DropShadow { color, glow } => {
                color.encode(out, context)?;
                write_glow(out, glow, true, false)
            }
            Filter::Blur { blur, passes } => {
                write_blur(out, blur)?;
                out.write_ubits(5, u32::from(*passes))?;
                out.write_ubits(3, 0)
            }
            Filter::Glow { color, glow } => {
                color.encode(out, context)?;
                write_glow(out, glow, false, false)
            }
            Filter::Bevel {
                shadow,
                highlight,
                glow,
            } => {
                shadow.encode(out, context)?;
                highlight.encode(out, context)?;
                write_glow(out, glow, true, true)
            }
            Filter::GradientGlow { stops, glow } | Filter::GradientBevel { stops, glow } => {
                write_stops(out, stops, context)?;
                write_glow(out, glow, true, true)
            }
            Filter::Convolution {
                columns,
                rows,
                divisor,
                bias,
                matrix,
                default_color,
                clamp,
                preserve_alpha,
            } => {
                out.write_u8(*columns)?;
                out.write_u8(*rows)?;
                out.write_f32(*divisor)?;
                out.write_f32(*bias)?;
                for cell in matrix {
                    out.write_f32(*cell)?;
                }
                default_color.encode(out, context)?;
                out.write_ubits(6, 0)?;
                out.write_bit(*clamp)?;
                out.write_bit(*preserve_alpha)
            }
            Filter::ColorMatrix(matrix) => {
                for cell in matrix.iter() {
                    out.write_f32(*cell)?;
                }
                Ok(())
            }
        }
    }
}

/// Read a filter list, a count byte followed by the filters
pub fn read_filters(input: &mut BitReader<'_>, context: &mut Context) -> Result<Vec<Filter>> {
    let count = input.read_u8()? as usize;
    crate::codec::decode_list(input, context, count)
}

/// Write a filter list with its count byte
pub fn write_filters(out: &mut BitWriter, filters: &[Filter], context: &mut Context) -> Result<()> {
    let count = u8::try_from(filters.len()).map_err(|_| Error::range("filter count", filters.len() as i64, 0, 0xFF))?;
    out.write_u8(count)?;
    for filter in filters {
        filter.encode(out, context)?;
    }
    Ok(())
}
