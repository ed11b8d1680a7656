use crate::bits::BitWriter;
use crate::codec::{check_consumed, Encode};
use crate::context::Context;
use crate::errors::Result;
use crate::tag::TagHeader;

/// Write a header followed by a payload written by `f` inside the scope of the tag
///
/// `f` must write exactly `header.length` bytes.
pub fn write_framed(
    out: &mut BitWriter,
    header: TagHeader,
    record: &'static str,
    context: &mut Context,
    f: impl FnOnce(&mut BitWriter, &mut Context) -> Result<()>,
) -> Result<()> {
    header.encode(out, context)?;
    let start = out.position();
    let mut scope = match header.tag_code() {
        Some(code) => context.push_tag(code),
        None => context.scope(),
    };
    f(out, &mut *scope)?;
    out.align()?;
    check_consumed(record, start, out.position(), header.length as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::tag::TagCode;

    #[test]
    fn hundred_byte_payload_uses_the_extended_header() {
        let header = TagHeader::new(TagCode::DoAction.into(), 100).unwrap();
        let mut out = BitWriter::with_length(header.total_len());
        write_framed(&mut out, header, "DoAction", &mut Context::default(), |out, context| {
            assert_eq!(context.tag(), Some(TagCode::DoAction));
            out.write_bytes(&[7; 100])
        })
        .unwrap();

        let bytes = out.into_bytes();
        assert_eq!(&bytes[..6], &[0x03, 0x3f, 0, 0, 0, 100]);
        assert_eq!(bytes.len(), 106);
    }

    #[test]
    fn payload_must_match_the_header() {
        let header = TagHeader::new(TagCode::ShowFrame.into(), 2).unwrap();
        let mut out = BitWriter::with_length(header.total_len());
        let result = write_framed(&mut out, header, "ShowFrame", &mut Context::default(), |out, _| out.write_u8(1));
        assert_eq!(
            result,
            Err(Error::StructuralMismatch {
                record: "ShowFrame",
                offset: 2,
                declared: 2,
                discrepancy: -1
            })
        );
    }
}
