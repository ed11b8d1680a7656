use crate::bits::{BitReader, BitWriter};
use crate::codec::{check_consumed, Decode, Encode, Layout};
use crate::context::{Context, Flag};
use crate::errors::{Error, Result};
use crate::tag::write::write_framed;
use crate::tag::{Frame, TagCode, TagHeader};
use crate::types::{
    Color, DefineButton2, DefineFont, DefineFontLayout, DefineShape, DefineShapeLayout, FileAttributes, FrameLabel,
};

/// A top-level tag
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Tag {
    /// Ends a tag list
    End,
    ShowFrame,
    DefineShape(Box<DefineShape>),
    SetBackgroundColor(Color),
    /// Raw action records, they are run by the player and not interpreted here
    DoAction(Vec<u8>),
    DefineButton2(Box<DefineButton2>),
    FrameLabel(FrameLabel),
    DefineFont(Box<DefineFont>),
    FileAttributes(FileAttributes),
    /// Any other tag, kept byte for byte
    Unknown {
        code: u16,
        data: Vec<u8>,
        /// Write the extended header even when the short one would do
        ///
        /// Set when decoding only if the header was needlessly long, a length of 63 bytes or more
        /// and the bitmap codes get the extended header anyway.
        long: bool,
    },
}

/// Keep a framed tag as raw bytes
pub(crate) fn unknown(frame: &Frame<'_>) -> Tag {
    Tag::Unknown {
        code: frame.header.code,
        data: frame.data().to_vec(),
        long: frame.header.is_needlessly_long(),
    }
}

/// Decode a color without alpha, whatever the enclosing flags
fn decode_rgb(input: &mut BitReader<'_>, context: &mut Context) -> Result<Color> {
    let mut scope = context.push(Flag::Transparent, false);
    Color::decode(input, &mut scope)
}

impl Tag {
    /// Decode the body of a framed tag
    pub fn read(frame: &Frame<'_>, context: &mut Context) -> Result<Self> {
        let Some(code) = frame.header.tag_code() else {
            return Ok(unknown(frame));
        };
        Ok(match code {
            TagCode::End => {
                frame.decode_with("End", context, |_, _| Ok(()))?;
                Tag::End
            }
            TagCode::ShowFrame => {
                frame.decode_with("ShowFrame", context, |_, _| Ok(()))?;
                Tag::ShowFrame
            }
            TagCode::DefineShape | TagCode::DefineShape2 | TagCode::DefineShape3 | TagCode::DefineShape4 => {
                Tag::DefineShape(Box::new(frame.decode_as(context)?))
            }
            TagCode::SetBackgroundColor => {
                Tag::SetBackgroundColor(frame.decode_with("SetBackgroundColor", context, decode_rgb)?)
            }
            TagCode::DoAction => Tag::DoAction(frame.decode_with("DoAction", context, |payload, _| {
                Ok(payload.read_to_end()?.to_vec())
            })?),
            TagCode::DefineButton2 => Tag::DefineButton2(Box::new(frame.decode_as(context)?)),
            TagCode::FrameLabel => Tag::FrameLabel(frame.decode_as(context)?),
            TagCode::DefineFont2 | TagCode::DefineFont3 => Tag::DefineFont(Box::new(frame.decode_as(context)?)),
            TagCode::FileAttributes => Tag::FileAttributes(frame.decode_as(context)?),
            _ => unknown(frame),
        })
    }

    /// The raw type code
    pub fn code(&self) -> u16 {
        let code = match self {
            Tag::End => TagCode::End,
            Tag::ShowFrame => TagCode::ShowFrame,
            Tag::DefineShape(shape) => shape.tag_code(),
            Tag::SetBackgroundColor(_) => TagCode::SetBackgroundColor,
            Tag::DoAction(_) => TagCode::DoAction,
            Tag::DefineButton2(_) => TagCode::DefineButton2,
            Tag::FrameLabel(_) => TagCode::FrameLabel,
            Tag::DefineFont(font) => font.tag_code(),
            Tag::FileAttributes(_) => TagCode::FileAttributes,
            Tag::Unknown { code, .. } => return *code,
        };
        code.into()
    }

    /// Name of the tag for error reports
    pub fn name(&self) -> &'static str {
        match self {
            Tag::End => "End",
            Tag::ShowFrame => "ShowFrame",
            Tag::DefineShape(_) => "DefineShape",
            Tag::SetBackgroundColor(_) => "SetBackgroundColor",
            Tag::DoAction(_) => "DoAction",
            Tag::DefineButton2(_) => "DefineButton2",
            Tag::FrameLabel(_) => "FrameLabel",
            Tag::DefineFont(_) => "DefineFont",
            Tag::FileAttributes(_) => "FileAttributes",
            Tag::Unknown { .. } => "Unknown",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum BodyLayout {
    Empty,
    Bytes(usize),
    Shape(DefineShapeLayout),
    Font(DefineFontLayout),
}

impl BodyLayout {
    fn byte_len(&self) -> usize {
        match self {
            BodyLayout::Empty => 0,
            BodyLayout::Bytes(bytes) => *bytes,
            BodyLayout::Shape(layout) => layout.byte_len(),
            BodyLayout::Font(layout) => layout.byte_len(),
        }
    }
}

/// Layout of a [`Tag`], its header and the layout of its body
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TagLayout {
    header: TagHeader,
    body: BodyLayout,
}

impl TagLayout {
    /// The header the tag will be written with
    pub fn header(&self) -> TagHeader {
        self.header
    }
}

impl Layout for TagLayout {
    fn byte_len(&self) -> usize {
        self.header.total_len()
    }
}

impl Encode for Tag {
    type Layout = TagLayout;

    fn layout(&self, context: &mut Context) -> Result<TagLayout> {
        let mut scope = match TagCode::try_from(self.code()) {
            Ok(code) => context.push_tag(code),
            Err(()) => context.scope(),
        };
        let body = match self {
            Tag::End | Tag::ShowFrame => BodyLayout::Empty,
            Tag::DefineShape(shape) => BodyLayout::Shape(shape.layout(&mut scope)?),
            Tag::SetBackgroundColor(color) => {
                let mut rgb = scope.push(Flag::Transparent, false);
                BodyLayout::Bytes(color.measure(&mut rgb)?)
            }
            Tag::DoAction(data) | Tag::Unknown { data, .. } => BodyLayout::Bytes(data.len()),
            Tag::DefineButton2(button) => BodyLayout::Bytes(button.measure(&mut scope)?),
            Tag::FrameLabel(label) => BodyLayout::Bytes(label.measure(&mut scope)?),
            Tag::DefineFont(font) => BodyLayout::Font(font.layout(&mut scope)?),
            Tag::FileAttributes(attributes) => BodyLayout::Bytes(attributes.measure(&mut scope)?),
        };

        let length = body.byte_len();
        let length = u32::try_from(length).map_err(|_| Error::range("tag length", length as i64, 0, i64::from(u32::MAX)))?;
        let header = match self {
            Tag::Unknown { code, long: true, .. } => TagHeader::new_long(*code, length)?,
            _ => TagHeader::new(self.code(), length)?,
        };
        Ok(TagLayout { header, body })
    }

    fn write_laid_out(&self, layout: &TagLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        write_framed(out, layout.header, self.name(), context, |out, context| {
            match (self, &layout.body) {
                (Tag::End | Tag::ShowFrame, BodyLayout::Empty) => Ok(()),
                (Tag::DefineShape(shape), BodyLayout::Shape(shape_layout)) => {
                    shape.encode_with(shape_layout, out, context)
                }
                (Tag::SetBackgroundColor(color), BodyLayout::Bytes(bytes)) => {
                    let mut rgb = context.push(Flag::Transparent, false);
                    color.encode_with(bytes, out, &mut rgb)
                }
                (Tag::DoAction(data) | Tag::Unknown { data, .. }, BodyLayout::Bytes(_)) => out.write_bytes(data),
                (Tag::DefineButton2(button), BodyLayout::Bytes(bytes)) => button.encode_with(bytes, out, context),
                (Tag::FrameLabel(label), BodyLayout::Bytes(bytes)) => label.encode_with(bytes, out, context),
                (Tag::DefineFont(font), BodyLayout::Font(font_layout)) => font.encode_with(font_layout, out, context),
                (Tag::FileAttributes(attributes), BodyLayout::Bytes(bytes)) => {
                    attributes.encode_with(bytes, out, context)
                }
                // A layout made for another tag, nothing written matches it
                _ => check_consumed(self.name(), out.position(), out.position(), layout.body.byte_len()),
            }
        })
    }
}
