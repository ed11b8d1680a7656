use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::types::Color;
use crate::variant::{unsupported, Variant};

/// The most records a gradient can have, the count is a 4 bit field
pub const MAX_GRADIENT_RECORDS: usize = 15;

/// How a gradient fills the area outside of its range
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SpreadMode {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

/// The color space colors are interpolated in
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum InterpolationMode {
    #[default]
    Rgb,
    LinearRgb,
}

impl Variant for SpreadMode {
    const FAMILY: &'static str = "spread mode";

    fn discriminant(&self) -> u8 {
        match self {
            SpreadMode::Pad => 0,
            SpreadMode::Reflect => 1,
            SpreadMode::Repeat => 2,
        }
    }

    fn decode_variant(discriminant: u8, _input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        match discriminant {
            0 => Ok(SpreadMode::Pad),
            1 => Ok(SpreadMode::Reflect),
            2 => Ok(SpreadMode::Repeat),
            d => Err(unsupported::<Self>(d)),
        }
    }
}

impl Variant for InterpolationMode {
    const FAMILY: &'static str = "interpolation mode";

    fn discriminant(&self) -> u8 {
        match self {
            InterpolationMode::Rgb => 0,
            InterpolationMode::LinearRgb => 1,
        }
    }

    fn decode_variant(discriminant: u8, _input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
        match discriminant {
            0 => Ok(InterpolationMode::Rgb),
            1 => Ok(InterpolationMode::LinearRgb),
            d => Err(unsupported::<Self>(d)),
        }
    }
}

/// A color at a position along a gradient
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GradientRecord {
    /// Position from 0 (start) to 255 (end)
    pub ratio: u8,
    pub color: Color,
}

/// A list of colors blended along a line or circle
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Gradient {
    pub spread: SpreadMode,
    pub interpolation: InterpolationMode,
    pub records: Vec<GradientRecord>,
}

impl Gradient {
    /// Create a gradient, at most 15 records are allowed
    pub fn new(spread: SpreadMode, interpolation: InterpolationMode, records: Vec<GradientRecord>) -> Result<Self> {
        check_count(records.len())?;
        Ok(Self {
            spread,
            interpolation,
            records,
        })
    }
}

fn check_count(count: usize) -> Result<()> {
    if count > MAX_GRADIENT_RECORDS {
        return Err(Error::range("gradient records", count as i64, 0, MAX_GRADIENT_RECORDS as i64));
    }
    Ok(())
}

impl Decode for Gradient {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        input.align();
        let spread = input.read_ubits(2)? as u8;
        let spread: SpreadMode = context.resolve(spread, input)?;
        let interpolation = input.read_ubits(2)? as u8;
        let interpolation: InterpolationMode = context.resolve(interpolation, input)?;
        let count = input.read_ubits(4)? as usize;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let ratio = input.read_u8()?;
            let color = Color::decode(input, context)?;
            records.push(GradientRecord { ratio, color });
        }
        Ok(Self {
            spread,
            interpolation,
            records,
        })
    }
}

impl Encode for Gradient {
    type Layout = usize;

    fn layout(&self, context: &mut Context) -> Result<usize> {
        check_count(self.records.len())?;
        let color = Color::default().measure(context)?;
        Ok(1 + self.records.len() * (1 + color))
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        out.write_ubits(2, u32::from(self.spread.discriminant()))?;
        out.write_ubits(2, u32::from(self.interpolation.discriminant()))?;
        out.write_ubits(4, self.records.len() as u32)?;
        for record in &self.records {
            out.write_u8(record.ratio)?;
            record.color.encode(out, context)?;
        }
        Ok(())
    }
}
