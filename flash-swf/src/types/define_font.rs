//! `DefineFont2` and `DefineFont3`
//!
//! The glyph outlines are preceded by a table of their offsets, which ends with the offset of the
//! code table that follows the last glyph. The entries are two bytes wide unless the last offset
//! needs more, then every entry is four bytes.

use enumset::{EnumSet, EnumSetType};

use crate::bits::{BitReader, BitWriter};
use crate::codec::{decode_list, layout_all, total_len, write_all, Decode, Encode, Layout};
use crate::context::{Context, Flag};
use crate::errors::{Error, Result};
use crate::offset_table::{OffsetTable, OffsetWidth, Offsets, Origin};
use crate::tag::TagCode;
use crate::types::{Bounds, BoundsLayout, CharacterId, Shape, ShapeLayout};

const HAS_LAYOUT: u8 = 0x80;
const SHIFT_JIS: u8 = 0x40;
const SMALL_TEXT: u8 = 0x20;
const ANSI: u8 = 0x10;
const WIDE_OFFSETS: u8 = 0x08;
const WIDE_CODES: u8 = 0x04;
const ITALIC: u8 = 0x02;
const BOLD: u8 = 0x01;

/// Style and encoding options of a font
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug, Hash)]
pub enum FontFlag {
    ShiftJis,
    /// Glyphs are aligned to pixels for small sizes
    SmallText,
    Ansi,
    Italic,
    Bold,
}

const FLAG_BITS: [(FontFlag, u8); 5] = [
    (FontFlag::ShiftJis, SHIFT_JIS),
    (FontFlag::SmallText, SMALL_TEXT),
    (FontFlag::Ansi, ANSI),
    (FontFlag::Italic, ITALIC),
    (FontFlag::Bold, BOLD),
];

/// The font definition tag used
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum FontVersion {
    #[default]
    Two,
    /// Glyphs are drawn at 20 times the resolution, character codes are always wide
    Three,
}

impl FontVersion {
    fn tag_code(self) -> TagCode {
        match self {
            FontVersion::Two => TagCode::DefineFont2,
            FontVersion::Three => TagCode::DefineFont3,
        }
    }
}

/// A glyph outline and the character it draws
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Glyph {
    pub code: u16,
    pub shape: Shape,
}

/// Extra spacing between a pair of characters
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KerningRecord {
    pub left: u16,
    pub right: u16,
    pub adjustment: i16,
}

/// Metrics for laying out text in a font
///
/// `advances` and `bounds` have one entry per glyph, in glyph order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FontLayout {
    pub ascent: u16,
    pub descent: u16,
    pub leading: i16,
    pub advances: Vec<i16>,
    pub bounds: Vec<Bounds>,
    pub kerning: Vec<KerningRecord>,
}

/// The body of `DefineFont2` and `DefineFont3`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DefineFont {
    pub version: FontVersion,
    pub id: CharacterId,
    pub flags: EnumSet<FontFlag>,
    pub language: u8,
    pub name: String,
    pub glyphs: Vec<Glyph>,
    pub layout: Option<FontLayout>,
}

impl DefineFont {
    /// The tag this font is written as
    pub fn tag_code(&self) -> TagCode {
        self.version.tag_code()
    }

    fn wide_codes(&self) -> bool {
        let wide = |code: u16| code > 0xFF;
        self.version == FontVersion::Three
            || self.glyphs.iter().any(|glyph| wide(glyph.code))
            || self
                .layout
                .iter()
                .flat_map(|layout| &layout.kerning)
                .any(|pair| wide(pair.left) || wide(pair.right))
    }
}

/// Glyph outlines only use fill style 1, with no line styles
fn scope_glyphs(context: &mut Context) {
    context.set_fill_bits(1);
    context.set_line_bits(0);
}

fn code_bytes(context: &Context) -> usize {
    if context.get(Flag::WideCodes) {
        2
    } else {
        1
    }
}

fn read_code(input: &mut BitReader<'_>, context: &Context) -> Result<u16> {
    Ok(input.read_word(code_bytes(context), false)? as u16)
}

fn write_code(out: &mut BitWriter, context: &Context, code: u16) -> Result<()> {
    out.write_word(code_bytes(context), i64::from(code), false)
}

fn check_per_glyph(field: &'static str, len: usize, glyphs: usize) -> Result<()> {
    if len != glyphs {
        return Err(Error::range(field, len as i64, glyphs as i64, glyphs as i64));
    }
    Ok(())
}

impl Decode for KerningRecord {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        Ok(Self {
            left: read_code(input, context)?,
            right: read_code(input, context)?,
            adjustment: input.read_i16()?,
        })
    }
}

impl Encode for KerningRecord {
    type Layout = usize;

    fn layout(&self, context: &mut Context) -> Result<usize> {
        let bytes = code_bytes(context);
        if bytes == 1 && (self.left > 0xFF || self.right > 0xFF) {
            return Err(Error::range("kerning code", self.left.max(self.right), 0, 0xFF));
        }
        Ok(2 * bytes + 2)
    }

    fn write_laid_out(&self, _layout: &usize, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        write_code(out, context, self.left)?;
        write_code(out, context, self.right)?;
        out.write_i16(self.adjustment)
    }
}

/// Read the layout of a font of `glyphs` glyphs
fn read_font_layout(input: &mut BitReader<'_>, context: &mut Context, glyphs: usize) -> Result<FontLayout> {
    let ascent = input.read_u16()?;
    let descent = input.read_u16()?;
    let leading = input.read_i16()?;
    let mut advances = Vec::with_capacity(glyphs.min(input.remaining_bytes() / 2));
    for _ in 0..glyphs {
        advances.push(input.read_i16()?);
    }
    let bounds = decode_list(input, context, glyphs)?;
    let count = usize::from(input.read_u16()?);
    let kerning = decode_list(input, context, count)?;
    Ok(FontLayout {
        ascent,
        descent,
        leading,
        advances,
        bounds,
        kerning,
    })
}

/// Layout of a [`DefineFont`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DefineFontLayout {
    offsets: OffsetWidth,
    wide_codes: bool,
    glyphs: Vec<ShapeLayout>,
    bounds: Vec<BoundsLayout>,
    bytes: usize,
}

impl Layout for DefineFontLayout {
    fn byte_len(&self) -> usize {
        self.bytes
    }
}

impl Decode for DefineFont {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let version = match context.tag() {
            Some(TagCode::DefineFont3) => FontVersion::Three,
            _ => FontVersion::Two,
        };
        let mut scope = context.push_tag(version.tag_code());
        scope_glyphs(&mut scope);

        let id = CharacterId::decode(input, &mut scope)?;
        let bits = input.read_u8()?;
        scope.set(Flag::WideOffsets, bits & WIDE_OFFSETS != 0);
        scope.set(Flag::WideCodes, bits & WIDE_CODES != 0);
        let flags = FLAG_BITS
            .iter()
            .filter(|(_, bit)| bits & bit != 0)
            .map(|(flag, _)| *flag)
            .collect();
        let language = input.read_u8()?;
        let name_len = usize::from(input.read_u8()?);
        let name = input.read_string(name_len, scope.encoding())?;

        let count = usize::from(input.read_u16()?);
        let glyphs = if count == 0 && input.remaining_bytes() == 0 {
            log::trace!("font {}: no glyphs and no offset table", id.get());
            Vec::new()
        } else {
            let width = if scope.get(Flag::WideOffsets) {
                OffsetWidth::Wide
            } else {
                OffsetWidth::Narrow
            };
            let offsets = Offsets::read(input, count, width, Origin::TableStart)?;
            let shapes: Vec<Shape> = offsets.decode_each(input, &mut scope)?;
            let mut glyphs = Vec::with_capacity(shapes.len());
            for shape in shapes {
                glyphs.push(Glyph {
                    code: read_code(input, &scope)?,
                    shape,
                });
            }
            glyphs
        };

        let layout = if bits & HAS_LAYOUT != 0 {
            Some(read_font_layout(input, &mut scope, count)?)
        } else {
            None
        };

        Ok(Self {
            version,
            id,
            flags,
            language,
            name,
            glyphs,
            layout,
        })
    }
}

impl Encode for DefineFont {
    type Layout = DefineFontLayout;

    fn layout(&self, context: &mut Context) -> Result<DefineFontLayout> {
        let mut scope = context.push_tag(self.tag_code());
        scope_glyphs(&mut scope);
        let wide_codes = self.wide_codes();
        scope.set(Flag::WideCodes, wide_codes);

        let name_len = scope.encoding().encode(&self.name)?.len();
        if name_len > 0xFF {
            return Err(Error::range("font name length", name_len as i64, 0, 0xFF));
        }
        let count = self.glyphs.len();
        if count > 0xFFFF {
            return Err(Error::range("glyph count", count as i64, 0, 0xFFFF));
        }

        let glyphs = self
            .glyphs
            .iter()
            .map(|glyph| glyph.shape.layout(&mut scope))
            .collect::<Result<Vec<_>>>()?;
        let shapes_len = total_len(&glyphs);
        let offsets = OffsetWidth::fitting((count + 1) * OffsetWidth::Narrow.bytes() + shapes_len);
        let table_len = (count + 1) * offsets.bytes();
        let codes_len = count * code_bytes(&scope);

        let (bounds, layout_len) = match &self.layout {
            Some(layout) => {
                check_per_glyph("font advances", layout.advances.len(), count)?;
                check_per_glyph("font bounds", layout.bounds.len(), count)?;
                if layout.kerning.len() > 0xFFFF {
                    return Err(Error::range("kerning count", layout.kerning.len() as i64, 0, 0xFFFF));
                }
                let bounds = layout_all(&layout.bounds, &mut scope)?;
                let kerning = layout_all(&layout.kerning, &mut scope)?;
                let len = 6 + 2 * count + total_len(&bounds) + 2 + total_len(&kerning);
                (bounds, len)
            }
            None => (Vec::new(), 0),
        };

        Ok(DefineFontLayout {
            offsets,
            wide_codes,
            glyphs,
            bounds,
            bytes: 2 + 1 + 1 + 1 + name_len + 2 + table_len + shapes_len + codes_len + layout_len,
        })
    }

    fn write_laid_out(&self, layout: &DefineFontLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        let mut scope = context.push_tag(self.tag_code());
        scope_glyphs(&mut scope);
        scope.set(Flag::WideCodes, layout.wide_codes);
        scope.set(Flag::WideOffsets, layout.offsets == OffsetWidth::Wide);

        self.id.encode(out, &mut scope)?;
        let mut bits = FLAG_BITS
            .iter()
            .filter(|(flag, _)| self.flags.contains(*flag))
            .fold(0, |bits, (_, bit)| bits | bit);
        if self.layout.is_some() {
            bits |= HAS_LAYOUT;
        }
        if layout.offsets == OffsetWidth::Wide {
            bits |= WIDE_OFFSETS;
        }
        if layout.wide_codes {
            bits |= WIDE_CODES;
        }
        out.write_u8(bits)?;
        out.write_u8(self.language)?;
        let encoding = scope.encoding();
        out.write_u8(encoding.encoded_len(&self.name) as u8)?;
        out.write_string(&self.name, encoding)?;

        out.write_u16(self.glyphs.len() as u16)?;
        let mut table = OffsetTable::reserve(out, self.glyphs.len(), layout.offsets, Origin::TableStart)?;
        for (glyph, glyph_layout) in self.glyphs.iter().zip(&layout.glyphs) {
            table.mark(out)?;
            glyph.shape.encode_with(glyph_layout, out, &mut scope)?;
        }
        // The sentinel is the offset of the code table
        table.finish(out)?;
        for glyph in &self.glyphs {
            write_code(out, &scope, glyph.code)?;
        }

        if let Some(font_layout) = &self.layout {
            out.write_u16(font_layout.ascent)?;
            out.write_u16(font_layout.descent)?;
            out.write_i16(font_layout.leading)?;
            for advance in &font_layout.advances {
                out.write_i16(*advance)?;
            }
            write_all(&font_layout.bounds, &layout.bounds, out, &mut scope)?;
            out.write_u16(font_layout.kerning.len() as u16)?;
            for record in &font_layout.kerning {
                record.encode(out, &mut scope)?;
            }
        }
        Ok(())
    }
}
