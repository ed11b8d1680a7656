//! Vector outlines: style tables and the bit packed record stream that draws with them
//!
//! A shape record stream starts with the widths of fill and line style indices. Those widths can
//! change halfway through when a style change record brings a new set of styles, so encoding has
//! to replay the stream once to find every field width before anything is written.

use crate::bits::width::{prefixed_width, signed_width, unsigned_bits};
use crate::bits::{align_up, BitReader, BitWriter};
use crate::codec::{decode_list, layout_all, total_len, write_all, Decode, Encode, Layout};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::types::{FillStyle, FillStyleLayout, LineStyle, LineStyleLayout};

/// Width of the style index width fields
const INDEX_WIDTH_BITS: u32 = 4;

/// Width of the move delta width field
const MOVE_WIDTH_BITS: u32 = 5;

/// Width of the edge delta width field, which holds the width minus 2
const EDGE_WIDTH_BITS: u32 = 4;

/// The widest edge delta
pub const MAX_EDGE_BITS: u32 = (1 << EDGE_WIDTH_BITS) + 1;

const NEW_STYLES: u32 = 0x10;
const LINE_STYLE: u32 = 0x08;
const FILL_STYLE_1: u32 = 0x04;
const FILL_STYLE_0: u32 = 0x02;
const MOVE_TO: u32 = 0x01;

/// The shape definition version of the enclosing tag, 1 outside of a shape definition
fn shape_version(context: &Context) -> u8 {
    context.tag().and_then(|tag| tag.shape_version()).unwrap_or(1)
}

/// The fill and line styles a shape record stream refers to by index
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ShapeStyles {
    pub fill_styles: Vec<FillStyle>,
    pub line_styles: Vec<LineStyle>,
}

impl ShapeStyles {
    /// Set the style index widths for these styles, index 0 means "no style"
    fn set_index_bits(&self, context: &mut Context) {
        context.set_fill_bits(unsigned_bits(self.fill_styles.len() as u32));
        context.set_line_bits(unsigned_bits(self.line_styles.len() as u32));
    }
}

/// Number of bytes a style count takes
fn count_len(count: usize, version: u8) -> Result<usize> {
    if count < 0xFF || (version < 2 && count == 0xFF) {
        Ok(1)
    } else if version >= 2 && count <= 0xFFFF {
        Ok(3)
    } else {
        let max = if version >= 2 { 0xFFFF } else { 0xFF };
        Err(Error::range("style count", count as i64, 0, max))
    }
}

fn read_count(input: &mut BitReader<'_>, version: u8) -> Result<usize> {
    let count = input.read_u8()?;
    if count == 0xFF && version >= 2 {
        Ok(usize::from(input.read_u16()?))
    } else {
        Ok(usize::from(count))
    }
}

fn write_count(out: &mut BitWriter, count: usize, version: u8) -> Result<()> {
    if count_len(count, version)? == 1 {
        out.write_u8(count as u8)
    } else {
        out.write_u8(0xFF)?;
        out.write_u16(count as u16)
    }
}

/// Layout of a [`ShapeStyles`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShapeStylesLayout {
    fills: Vec<FillStyleLayout>,
    lines: Vec<LineStyleLayout>,
    bytes: usize,
}

impl Layout for ShapeStylesLayout {
    fn byte_len(&self) -> usize {
        self.bytes
    }
}

impl Decode for ShapeStyles {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let version = shape_version(context);
        let count = read_count(input, version)?;
        let fill_styles = decode_list(input, context, count)?;
        let count = read_count(input, version)?;
        let line_styles = decode_list(input, context, count)?;
        let styles = Self {
            fill_styles,
            line_styles,
        };
        styles.set_index_bits(context);
        Ok(styles)
    }
}

impl Encode for ShapeStyles {
    type Layout = ShapeStylesLayout;

    fn layout(&self, context: &mut Context) -> Result<ShapeStylesLayout> {
        let version = shape_version(context);
        let fills = layout_all(&self.fill_styles, context)?;
        let lines = layout_all(&self.line_styles, context)?;
        let bytes = count_len(fills.len(), version)?
            + total_len(&fills)
            + count_len(lines.len(), version)?
            + total_len(&lines);
        self.set_index_bits(context);
        Ok(ShapeStylesLayout { fills, lines, bytes })
    }

    fn write_laid_out(&self, layout: &ShapeStylesLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        let version = shape_version(context);
        write_count(out, self.fill_styles.len(), version)?;
        write_all(&self.fill_styles, &layout.fills, out, context)?;
        write_count(out, self.line_styles.len(), version)?;
        write_all(&self.line_styles, &layout.lines, out, context)?;
        self.set_index_bits(context);
        Ok(())
    }
}

/// A change of pen position or style, possibly bringing a new set of styles
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct StyleChange {
    /// Absolute pen position to move to
    pub move_to: Option<(i32, i32)>,
    pub fill_style_0: Option<u32>,
    pub fill_style_1: Option<u32>,
    pub line_style: Option<u32>,
    /// Styles replacing the current ones, indices in later records refer to these
    pub new_styles: Option<ShapeStyles>,
}

impl StyleChange {
    fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.new_styles.is_some() {
            flags |= NEW_STYLES;
        }
        if self.line_style.is_some() {
            flags |= LINE_STYLE;
        }
        if self.fill_style_1.is_some() {
            flags |= FILL_STYLE_1;
        }
        if self.fill_style_0.is_some() {
            flags |= FILL_STYLE_0;
        }
        if self.move_to.is_some() {
            flags |= MOVE_TO;
        }
        flags
    }
}

/// One step of a shape outline
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShapeRecord {
    StyleChange(Box<StyleChange>),

    /// A line relative to the pen position
    StraightEdge { delta_x: i32, delta_y: i32 },

    /// A quadratic curve, each point relative to the previous one
    CurvedEdge {
        control_delta_x: i32,
        control_delta_y: i32,
        anchor_delta_x: i32,
        anchor_delta_y: i32,
    },
}

/// An outline, the record stream of a shape or a glyph
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Shape {
    pub records: Vec<ShapeRecord>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct NewStylesLayout {
    styles: ShapeStylesLayout,
    fill_bits: u32,
    line_bits: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum RecordLayout {
    StyleChange {
        move_bits: u32,
        fill_bits: u32,
        line_bits: u32,
        new_styles: Option<Box<NewStylesLayout>>,
    },
    Edge {
        nbits: u32,
    },
}

/// Layout of a [`Shape`], the width of every field of the record stream
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShapeLayout {
    fill_bits: u32,
    line_bits: u32,
    records: Vec<RecordLayout>,
    bytes: usize,
}

impl Layout for ShapeLayout {
    fn byte_len(&self) -> usize {
        self.bytes
    }
}

fn check_index_bits(fill_bits: u32, line_bits: u32) -> Result<()> {
    let max = (1 << INDEX_WIDTH_BITS) - 1;
    for bits in [fill_bits, line_bits] {
        if bits > max {
            return Err(Error::range("style index width", bits, 0, i64::from(max)));
        }
    }
    Ok(())
}

fn check_index(index: Option<u32>, bits: u32) -> Result<()> {
    match index {
        Some(index) if unsigned_bits(index) > bits => {
            Err(Error::range("style index", index, 0, (1i64 << bits) - 1))
        }
        _ => Ok(()),
    }
}

/// The width of a group of edge deltas, at least 2 since the width is stored minus 2
fn edge_width(values: impl IntoIterator<Item = i32>) -> Result<u32> {
    let width = signed_width(values).max(2);
    if width > MAX_EDGE_BITS {
        return Err(Error::range("edge delta width", width, 2, i64::from(MAX_EDGE_BITS)));
    }
    Ok(width)
}

/// Straight edges along an axis drop the zero delta
fn is_general_line(delta_x: i32, delta_y: i32) -> bool {
    (delta_x != 0) == (delta_y != 0)
}

impl Encode for Shape {
    type Layout = ShapeLayout;

    fn layout(&self, context: &mut Context) -> Result<ShapeLayout> {
        let mut scope = context.scope();
        let fill_bits = scope.fill_bits();
        let line_bits = scope.line_bits();
        check_index_bits(fill_bits, line_bits)?;

        let (mut current_fill, mut current_line) = (fill_bits, line_bits);
        let mut position = 2 * INDEX_WIDTH_BITS as usize;
        let mut records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let layout = match record {
                ShapeRecord::StyleChange(change) => {
                    if change.flags() == 0 {
                        return Err(Error::range("style change flags", 0, 1, 0x1F));
                    }
                    position += 6;
                    let move_bits = match change.move_to {
                        Some((x, y)) => {
                            let bits = prefixed_width("move delta width", [x, y], MOVE_WIDTH_BITS)?;
                            position += (MOVE_WIDTH_BITS + 2 * bits) as usize;
                            bits
                        }
                        None => 0,
                    };
                    for (index, bits) in [
                        (change.fill_style_0, current_fill),
                        (change.fill_style_1, current_fill),
                        (change.line_style, current_line),
                    ] {
                        check_index(index, bits)?;
                        if index.is_some() {
                            position += bits as usize;
                        }
                    }
                    let (fill_bits, line_bits) = (current_fill, current_line);
                    let new_styles = match &change.new_styles {
                        Some(styles) => {
                            let styles = styles.layout(&mut scope)?;
                            current_fill = scope.fill_bits();
                            current_line = scope.line_bits();
                            check_index_bits(current_fill, current_line)?;
                            position = align_up(position) + styles.byte_len() * 8 + 2 * INDEX_WIDTH_BITS as usize;
                            Some(Box::new(NewStylesLayout {
                                styles,
                                fill_bits: current_fill,
                                line_bits: current_line,
                            }))
                        }
                        None => None,
                    };
                    RecordLayout::StyleChange {
                        move_bits,
                        fill_bits,
                        line_bits,
                        new_styles,
                    }
                }
                ShapeRecord::StraightEdge { delta_x, delta_y } => {
                    let nbits = edge_width([*delta_x, *delta_y])?;
                    position += 2 + EDGE_WIDTH_BITS as usize + 1;
                    position += if is_general_line(*delta_x, *delta_y) {
                        2 * nbits as usize
                    } else {
                        1 + nbits as usize
                    };
                    RecordLayout::Edge { nbits }
                }
                ShapeRecord::CurvedEdge {
                    control_delta_x,
                    control_delta_y,
                    anchor_delta_x,
                    anchor_delta_y,
                } => {
                    let nbits = edge_width([*control_delta_x, *control_delta_y, *anchor_delta_x, *anchor_delta_y])?;
                    position += 2 + EDGE_WIDTH_BITS as usize + 4 * nbits as usize;
                    RecordLayout::Edge { nbits }
                }
            };
            records.push(layout);
        }
        // End of shape
        position += 6;

        Ok(ShapeLayout {
            fill_bits,
            line_bits,
            records,
            bytes: align_up(position) / 8,
        })
    }

    fn write_laid_out(&self, layout: &ShapeLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        let mut scope = context.scope();
        out.write_ubits(INDEX_WIDTH_BITS, layout.fill_bits)?;
        out.write_ubits(INDEX_WIDTH_BITS, layout.line_bits)?;
        for (record, record_layout) in self.records.iter().zip(&layout.records) {
            match (record, record_layout) {
                (
                    ShapeRecord::StyleChange(change),
                    RecordLayout::StyleChange {
                        move_bits,
                        fill_bits,
                        line_bits,
                        new_styles,
                    },
                ) => {
                    out.write_bit(false)?;
                    out.write_ubits(5, change.flags())?;
                    if let Some((x, y)) = change.move_to {
                        out.write_ubits(MOVE_WIDTH_BITS, *move_bits)?;
                        out.write_sbits(*move_bits, x)?;
                        out.write_sbits(*move_bits, y)?;
                    }
                    for (index, bits) in [
                        (change.fill_style_0, *fill_bits),
                        (change.fill_style_1, *fill_bits),
                        (change.line_style, *line_bits),
                    ] {
                        if let Some(index) = index {
                            out.write_ubits(bits, index)?;
                        }
                    }
                    if let (Some(styles), Some(new_layout)) = (&change.new_styles, new_styles) {
                        styles.encode_with(&new_layout.styles, out, &mut scope)?;
                        out.write_ubits(INDEX_WIDTH_BITS, new_layout.fill_bits)?;
                        out.write_ubits(INDEX_WIDTH_BITS, new_layout.line_bits)?;
                    }
                }
                (ShapeRecord::StraightEdge { delta_x, delta_y }, RecordLayout::Edge { nbits }) => {
                    out.write_bit(true)?;
                    out.write_bit(true)?;
                    out.write_ubits(EDGE_WIDTH_BITS, nbits - 2)?;
                    if is_general_line(*delta_x, *delta_y) {
                        out.write_bit(true)?;
                        out.write_sbits(*nbits, *delta_x)?;
                        out.write_sbits(*nbits, *delta_y)?;
                    } else if *delta_x == 0 {
                        out.write_bit(false)?;
                        out.write_bit(true)?;
                        out.write_sbits(*nbits, *delta_y)?;
                    } else {
                        out.write_bit(false)?;
                        out.write_bit(false)?;
                        out.write_sbits(*nbits, *delta_x)?;
                    }
                }
                (
                    ShapeRecord::CurvedEdge {
                        control_delta_x,
                        control_delta_y,
                        anchor_delta_x,
                        anchor_delta_y,
                    },
                    RecordLayout::Edge { nbits },
                ) => {
                    out.write_bit(true)?;
                    out.write_bit(false)?;
                    out.write_ubits(EDGE_WIDTH_BITS, nbits - 2)?;
                    for delta in [*control_delta_x, *control_delta_y, *anchor_delta_x, *anchor_delta_y] {
                        out.write_sbits(*nbits, delta)?;
                    }
                }
                _ => {
                    return Err(Error::StructuralMismatch {
                        record: "ShapeRecord",
                        offset: out.byte_position(),
                        declared: layout.bytes,
                        discrepancy: 0,
                    });
                }
            }
        }
        out.write_ubits(6, 0)?;
        out.align()
    }
}

impl Decode for Shape {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let mut scope = context.scope();
        input.align();
        let mut fill_bits = input.read_ubits(INDEX_WIDTH_BITS)?;
        let mut line_bits = input.read_ubits(INDEX_WIDTH_BITS)?;
        let mut records = Vec::new();
        loop {
            let is_edge = input.read_bit()?;
            if !is_edge {
                let flags = input.read_ubits(5)?;
                if flags == 0 {
                    break;
                }
                let mut change = StyleChange::default();
                if flags & MOVE_TO != 0 {
                    let bits = input.read_ubits(MOVE_WIDTH_BITS)?;
                    change.move_to = Some((input.read_sbits(bits)?, input.read_sbits(bits)?));
                }
                if flags & FILL_STYLE_0 != 0 {
                    change.fill_style_0 = Some(input.read_ubits(fill_bits)?);
                }
                if flags & FILL_STYLE_1 != 0 {
                    change.fill_style_1 = Some(input.read_ubits(fill_bits)?);
                }
                if flags & LINE_STYLE != 0 {
                    change.line_style = Some(input.read_ubits(line_bits)?);
                }
                if flags & NEW_STYLES != 0 {
                    change.new_styles = Some(ShapeStyles::decode(input, &mut scope)?);
                    fill_bits = input.read_ubits(INDEX_WIDTH_BITS)?;
                    line_bits = input.read_ubits(INDEX_WIDTH_BITS)?;
                    scope.set_fill_bits(fill_bits);
                    scope.set_line_bits(line_bits);
                }
                records.push(ShapeRecord::StyleChange(Box::new(change)));
            } else if input.read_bit()? {
                let nbits = input.read_ubits(EDGE_WIDTH_BITS)? + 2;
                let (delta_x, delta_y) = if input.read_bit()? {
                    (input.read_sbits(nbits)?, input.read_sbits(nbits)?)
                } else if input.read_bit()? {
                    (0, input.read_sbits(nbits)?)
                } else {
                    (input.read_sbits(nbits)?, 0)
                };
                records.push(ShapeRecord::StraightEdge { delta_x, delta_y });
            } else {
                let nbits = input.read_ubits(EDGE_WIDTH_BITS)? + 2;
                records.push(ShapeRecord::CurvedEdge {
                    control_delta_x: input.read_sbits(nbits)?,
                    control_delta_y: input.read_sbits(nbits)?,
                    anchor_delta_x: input.read_sbits(nbits)?,
                    anchor_delta_y: input.read_sbits(nbits)?,
                });
            }
        }
        input.align();
        Ok(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};
    use crate::errors::ErrorKind;
    use crate::tag::TagCode;
    use crate::types::Color;

    fn square() -> Shape {
        Shape {
            records: vec![
                ShapeRecord::StyleChange(Box::new(StyleChange {
                    move_to: Some((20, 20)),
                    fill_style_1: Some(1),
                    ..StyleChange::default()
                })),
                ShapeRecord::StraightEdge {
                    delta_x: 100,
                    delta_y: 0,
                },
                ShapeRecord::StraightEdge {
                    delta_x: 0,
                    delta_y: 100,
                },
                ShapeRecord::StraightEdge {
                    delta_x: -100,
                    delta_y: 0,
                },
                ShapeRecord::StraightEdge {
                    delta_x: 0,
                    delta_y: -100,
                },
            ],
        }
    }

    #[test]
    fn empty_shape_is_header_and_end() {
        let mut context = Context::default();
        context.set_fill_bits(1);
        let bytes = to_bytes(&Shape::default(), &mut context).unwrap();
        // fill bits 1, line bits 0, end record, padding
        assert_eq!(bytes, vec![0x10, 0x00]);
        assert_eq!(from_bytes::<Shape>(&bytes, &mut context).unwrap(), Shape::default());
    }

    #[test]
    fn axis_aligned_edges_drop_a_delta() {
        let mut context = Context::default();
        context.set_fill_bits(1);
        let shape = square();
        let layout = shape.layout(&mut context).unwrap();
        // header 8, style change 6 + 5 + 2 * 6 + 1, four edges of 2 + 4 + 2 + 8, end 6
        assert_eq!(layout.byte_len(), (8 + 24 + 4 * 16 + 6usize).div_ceil(8));
        let bytes = to_bytes(&shape, &mut context).unwrap();
        assert_eq!(bytes.len(), layout.byte_len());
        assert_eq!(from_bytes::<Shape>(&bytes, &mut context).unwrap(), shape);
    }

    #[test]
    fn curves() {
        let mut context = Context::default();
        let shape = Shape {
            records: vec![ShapeRecord::CurvedEdge {
                control_delta_x: 1,
                control_delta_y: -1,
                anchor_delta_x: 0,
                anchor_delta_y: 0,
            }],
        };
        let bytes = to_bytes(&shape, &mut context).unwrap();
        // header 00000000, 1 0 0000 then four 2 bit deltas, end record
        assert_eq!(bytes, vec![0x00, 0b1000_0001, 0b1100_0000, 0b0000_0000]);
        assert_eq!(from_bytes::<Shape>(&bytes, &mut context).unwrap(), shape);
    }

    #[test]
    fn edge_deltas_are_limited_to_17_bits() {
        let mut context = Context::default();
        let shape = Shape {
            records: vec![ShapeRecord::StraightEdge {
                delta_x: 1 << 16,
                delta_y: 0,
            }],
        };
        assert_eq!(
            shape.layout(&mut context).unwrap_err(),
            Error::RangeViolation {
                field: "edge delta width",
                value: 18,
                min: 2,
                max: 17
            }
        );
    }

    #[test]
    fn style_indices_must_fit_their_width() {
        let mut context = Context::default();
        context.set_fill_bits(1);
        let shape = Shape {
            records: vec![ShapeRecord::StyleChange(Box::new(StyleChange {
                fill_style_0: Some(2),
                ..StyleChange::default()
            }))],
        };
        assert_eq!(shape.layout(&mut context).unwrap_err().kind(), ErrorKind::RangeViolation);

        let empty = Shape {
            records: vec![ShapeRecord::StyleChange(Box::default())],
        };
        assert_eq!(empty.layout(&mut context).unwrap_err().kind(), ErrorKind::RangeViolation);
    }

    #[test]
    fn new_styles_widen_later_indices() {
        let mut context = Context::default();
        let mut scope = context.push_tag(TagCode::DefineShape2);
        scope.set_fill_bits(1);
        let fills = (0..3).map(|i| FillStyle::Solid(Color::rgb(i, i, i))).collect();
        let shape = Shape {
            records: vec![
                ShapeRecord::StyleChange(Box::new(StyleChange {
                    fill_style_0: Some(1),
                    new_styles: Some(ShapeStyles {
                        fill_styles: fills,
                        line_styles: vec![],
                    }),
                    ..StyleChange::default()
                })),
                ShapeRecord::StyleChange(Box::new(StyleChange {
                    fill_style_0: Some(3),
                    ..StyleChange::default()
                })),
            ],
        };
        let bytes = to_bytes(&shape, &mut scope).unwrap();
        assert_eq!(from_bytes::<Shape>(&bytes, &mut scope).unwrap(), shape);
        // The shape's own hints don't leak
        assert_eq!(scope.fill_bits(), 1);
    }

    #[test]
    fn extended_style_counts_from_version_2() {
        let mut context = Context::default();
        let styles = ShapeStyles {
            fill_styles: vec![FillStyle::Solid(Color::BLACK); 300],
            line_styles: vec![],
        };
        assert_eq!(styles.layout(&mut context).unwrap_err().kind(), ErrorKind::RangeViolation);

        let mut scope = context.push_tag(TagCode::DefineShape2);
        let bytes = to_bytes(&styles, &mut scope).unwrap();
        assert_eq!(&bytes[..3], &[0xff, 0x01, 0x2c]);
        assert_eq!(scope.fill_bits(), 9);
        assert_eq!(from_bytes::<ShapeStyles>(&bytes, &mut scope).unwrap(), styles);
    }
}
