//! Closed families of records selected by a leading discriminant byte

use crate::bits::BitReader;
use crate::context::Context;
use crate::errors::{Error, Result};

/// A family of alternatives, each identified by a one byte discriminant
pub trait Variant: Sized {
    /// Name of the family, reported with unknown discriminants
    const FAMILY: &'static str;

    /// The discriminant written before the alternative
    fn discriminant(&self) -> u8;

    /// Decode the body of the alternative identified by `discriminant`
    fn decode_variant(discriminant: u8, input: &mut BitReader<'_>, context: &mut Context) -> Result<Self>;
}

/// The error for a discriminant that no alternative of `V` claims
pub fn unsupported<V: Variant>(discriminant: u8) -> Error {
    Error::UnsupportedVariant {
        family: V::FAMILY,
        discriminant: u32::from(discriminant),
    }
}

/// Read a discriminant and decode the alternative it selects
pub fn decode_variant<V: Variant>(input: &mut BitReader<'_>, context: &mut Context) -> Result<V> {
    let discriminant = input.read_u8()?;
    context.resolve(discriminant, input)
}

impl Context {
    /// Decode the alternative of `V` for a discriminant that has already been read
    pub fn resolve<V: Variant>(&mut self, discriminant: u8, input: &mut BitReader<'_>) -> Result<V> {
        log::trace!("{} {discriminant:#04x} at bit {}", V::FAMILY, input.position());
        V::decode_variant(discriminant, input, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Shade {
        Light,
        Dark(u8),
    }

    impl Variant for Shade {
        const FAMILY: &'static str = "shade";

        fn discriminant(&self) -> u8 {
            match self {
                Shade::Light => 1,
                Shade::Dark(_) => 2,
            }
        }

        fn decode_variant(discriminant: u8, input: &mut BitReader<'_>, _context: &mut Context) -> Result<Self> {
            match discriminant {
                1 => Ok(Shade::Light),
                2 => Ok(Shade::Dark(input.read_u8()?)),
                d => Err(unsupported::<Self>(d)),
            }
        }
    }

    #[test]
    fn dispatches_on_the_leading_byte() {
        let data = [2, 9, 1];
        let mut input = BitReader::new(&data);
        let mut context = Context::default();
        let dark: Shade = decode_variant(&mut input, &mut context).unwrap();
        assert_eq!(dark, Shade::Dark(9));
        assert_eq!(dark.discriminant(), 2);
        assert_eq!(decode_variant::<Shade>(&mut input, &mut context).unwrap(), Shade::Light);
    }

    #[test]
    fn unknown_discriminants_are_errors() {
        let data = [0x33];
        let mut input = BitReader::new(&data);
        assert_eq!(
            decode_variant::<Shade>(&mut input, &mut Context::default()),
            Err(Error::UnsupportedVariant {
                family: "shade",
                discriminant: 0x33
            })
        );
    }
}
