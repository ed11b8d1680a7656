use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::{Context, Flag};
use crate::errors::Result;

/// An RGB color with an optional alpha channel
///
/// The alpha byte is only present when the context has [`Flag::Transparent`] set, otherwise it
/// isn't written and reads back as fully opaque.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// An opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// A color with alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Decode for Color {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let r = input.read_u8()?;
        let g = input.read_u8()?;
        let b = input.read_u8()?;
        let a = if context.get(Flag::Transparent) { input.read_u8()? } else { 255 };
        Ok(Self { r, g, b, a })
    }
}

impl Encode for Color {
    type Layout = usize;

    fn layout(&self, context: &mut Context) -> Result<usize> {
        Ok(if context.get(Flag::Transparent) { 4 } else { 3 })
    }

    fn write_laid_out(&self, layout: &usize, out: &mut BitWriter, _context: &mut Context) -> Result<()> {
        out.write_bytes(&[self.r, self.g, self.b])?;
        if *layout == 4 {
            out.write_u8(self.a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};

    #[test]
    fn alpha_follows_the_context() {
        let color = Color::rgba(1, 2, 3, 4);
        let mut context = Context::default();
        {
            let mut scope = context.push(Flag::Transparent, true);
            assert_eq!(to_bytes(&color, &mut scope).unwrap(), vec![1, 2, 3, 4]);
            assert_eq!(from_bytes::<Color>(&[1, 2, 3, 4], &mut scope).unwrap(), color);
        }
        assert!(!context.get(Flag::Transparent));
        assert_eq!(to_bytes(&color, &mut context).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn missing_alpha_is_opaque() {
        let color: Color = from_bytes(&[9, 8, 7], &mut Context::default()).unwrap();
        assert_eq!(color, Color::rgb(9, 8, 7));
        assert_eq!(color.a, 255);
    }
}
