use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode};
use crate::context::Context;
use crate::errors::{Error, Result};

/// The body of the `FrameLabel` tag, a name for the current frame
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FrameLabel {
    pub name: String,
    /// The label can be used as a browser history anchor
    pub anchor: bool,
}

impl Decode for FrameLabel {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let name = input.read_terminated_string(context.encoding())?;
        // The anchor flag is only present when set
        let anchor = if input.remaining_bytes() > 0 {
            input.read_u8()? == 1
        } else {
            false
        };
        Ok(Self { name, anchor })
    }
}

impl Encode for FrameLabel {
    type Layout = usize;

    fn layout(&self, context: &mut Context) -> Result<usize> {
        let name = context.encoding().encode(&self.name)?;
        if name.contains(&0) {
            return Err(Error::range("string NUL byte", 0, 1, 0xFF));
        }
        Ok(name.len() + 1 + usize::from(self.anchor))
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        out.write_terminated_string(&self.name, context.encoding())?;
        if self.anchor {
            out.write_u8(1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};
    use crate::errors::ErrorKind;

    #[test]
    fn anchor_byte_is_optional() {
        let mut context = Context::default();
        let label = FrameLabel {
            name: "intro".into(),
            anchor: true,
        };
        let bytes = to_bytes(&label, &mut context).unwrap();
        assert_eq!(bytes, b"intro\0\x01");
        assert_eq!(from_bytes::<FrameLabel>(&bytes, &mut context).unwrap(), label);

        let plain = from_bytes::<FrameLabel>(b"intro\0", &mut context).unwrap();
        assert!(!plain.anchor);
    }

    #[test]
    fn latin1_before_version_6() {
        let mut context = Context::new(5);
        let label = FrameLabel {
            name: "café".into(),
            anchor: false,
        };
        assert_eq!(to_bytes(&label, &mut context).unwrap(), b"caf\xe9\0");

        let label = FrameLabel {
            name: "カフェ".into(),
            anchor: false,
        };
        assert_eq!(to_bytes(&label, &mut context).unwrap_err().kind(), ErrorKind::RangeViolation);
    }

    #[test]
    fn invalid_utf8_from_version_6() {
        let error = from_bytes::<FrameLabel>(b"\xff\0", &mut Context::new(6)).unwrap_err();
        assert_eq!(error, Error::InvalidString { offset: 0 });
    }
}
