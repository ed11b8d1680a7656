use crate::bits::BitReader;
use crate::codec::{check_consumed, record_name, Decode};
use crate::context::Context;
use crate::errors::Result;
use crate::tag::{TagCode, TagHeader};

/// A tag header together with a reader limited to its payload
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    /// The decoded header
    pub header: TagHeader,

    /// Byte offset of the header in the input
    pub offset: usize,

    /// Reader over exactly the payload
    pub payload: BitReader<'a>,
}

impl<'a> Frame<'a> {
    /// Read a header and step `input` over the payload it announces
    pub fn read(input: &mut BitReader<'a>) -> Result<Self> {
        input.align();
        let offset = input.byte_position();
        let header = TagHeader::read(input)?;
        let payload = input.limited(header.length as usize)?;
        input.seek(payload.limit())?;
        log::debug!(
            "tag {} ({:?}) at byte {offset}, {} bytes",
            header.code,
            header.tag_code(),
            header.length
        );
        Ok(Self {
            header,
            offset,
            payload,
        })
    }

    /// The raw payload bytes
    pub fn data(&self) -> &'a [u8] {
        let start = self.payload.position() / 8;
        &self.payload.data()[start..self.payload.limit() / 8]
    }

    /// Decode the payload as a `T` that must consume all of it
    pub fn decode_as<T: Decode>(&self, context: &mut Context) -> Result<T> {
        self.decode_with(record_name::<T>(), context, T::decode)
    }

    /// Decode the payload with `f` inside the scope of this tag, `f` must consume all of it
    pub fn decode_with<T>(
        &self,
        record: &'static str,
        context: &mut Context,
        f: impl FnOnce(&mut BitReader<'a>, &mut Context) -> Result<T>,
    ) -> Result<T> {
        let mut payload = self.payload.clone();
        let start = payload.position();
        let mut scope = match self.header.tag_code() {
            Some(code) => context.push_tag(code),
            None => context.scope(),
        };
        let value = f(&mut payload, &mut *scope)?;
        payload.align();
        check_consumed(record, start, payload.position(), self.header.length as usize)?;
        Ok(value)
    }
}

/// Iterator over the tags of a tag list
///
/// Stops after the end tag, when the input runs out, or after the first error.
pub struct Frames<'a> {
    input: BitReader<'a>,
    done: bool,
}

impl<'a> Frames<'a> {
    /// Iterate over the tags starting at the current position of `input`
    pub fn new(input: BitReader<'a>) -> Self {
        Self { input, done: false }
    }

    /// The position following the last tag read
    pub fn position(&self) -> usize {
        self.input.position()
    }

    /// The reader over whatever follows the last tag read
    pub fn into_inner(self) -> BitReader<'a> {
        self.input
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<Frame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.input.remaining_bytes() == 0 {
            return None;
        }
        match Frame::read(&mut self.input) {
            Ok(frame) => {
                self.done = frame.header.tag_code() == Some(TagCode::End);
                Some(Ok(frame))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
