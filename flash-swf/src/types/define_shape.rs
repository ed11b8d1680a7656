use enumset::{EnumSet, EnumSetType};

use crate::bits::{BitReader, BitWriter};
use crate::codec::{Decode, Encode, Layout};
use crate::context::{Context, Flag};
use crate::errors::Result;
use crate::tag::TagCode;
use crate::types::{Bounds, BoundsLayout, CharacterId, Shape, ShapeLayout, ShapeStyles, ShapeStylesLayout};

/// Rendering hints of a `DefineShape4`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(EnumSetType, Debug, Hash)]
pub enum ShapeFlag {
    /// Fill with the non-zero winding rule instead of even-odd
    FillWindingRule,
    /// At least one line style doesn't scale
    NonScalingStrokes,
    /// At least one line style scales
    ScalingStrokes,
}

/// Which of the four shape definition tags a shape uses
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShapeVersion {
    One,
    /// Allows more than 255 styles
    Two,
    /// Colors have an alpha channel
    Three,
    /// Extended line styles and focal gradients
    Four {
        /// Bounds of the outline without the stroke width
        edge_bounds: Bounds,
        flags: EnumSet<ShapeFlag>,
    },
}

impl ShapeVersion {
    fn tag_code(&self) -> TagCode {
        match self {
            ShapeVersion::One => TagCode::DefineShape,
            ShapeVersion::Two => TagCode::DefineShape2,
            ShapeVersion::Three => TagCode::DefineShape3,
            ShapeVersion::Four { .. } => TagCode::DefineShape4,
        }
    }

    fn is_transparent(&self) -> bool {
        matches!(self, ShapeVersion::Three | ShapeVersion::Four { .. })
    }
}

/// The body of the `DefineShape` tags
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DefineShape {
    pub version: ShapeVersion,
    pub id: CharacterId,
    pub bounds: Bounds,
    pub styles: ShapeStyles,
    pub shape: Shape,
}

impl DefineShape {
    /// The tag this shape is written as
    pub fn tag_code(&self) -> TagCode {
        self.version.tag_code()
    }
}

fn flags_to_bits(flags: EnumSet<ShapeFlag>) -> u8 {
    let mut bits = 0;
    if flags.contains(ShapeFlag::FillWindingRule) {
        bits |= 0b100;
    }
    if flags.contains(ShapeFlag::NonScalingStrokes) {
        bits |= 0b010;
    }
    if flags.contains(ShapeFlag::ScalingStrokes) {
        bits |= 0b001;
    }
    bits
}

fn flags_from_bits(bits: u8) -> EnumSet<ShapeFlag> {
    let mut flags = EnumSet::new();
    if bits & 0b100 != 0 {
        flags.insert(ShapeFlag::FillWindingRule);
    }
    if bits & 0b010 != 0 {
        flags.insert(ShapeFlag::NonScalingStrokes);
    }
    if bits & 0b001 != 0 {
        flags.insert(ShapeFlag::ScalingStrokes);
    }
    flags
}

impl Decode for DefineShape {
    /// The version is taken from the tag in `context`, version 1 when there is none
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let code = context.tag().unwrap_or(TagCode::DefineShape);
        let shape_version = code.shape_version().unwrap_or(1);
        let mut scope = context.push_tag(code);
        scope.set(Flag::Transparent, shape_version >= 3);

        let id = CharacterId::decode(input, &mut scope)?;
        let bounds = Bounds::decode(input, &mut scope)?;
        let version = match shape_version {
            4 => {
                let edge_bounds = Bounds::decode(input, &mut scope)?;
                let flags = flags_from_bits(input.read_u8()?);
                ShapeVersion::Four { edge_bounds, flags }
            }
            3 => ShapeVersion::Three,
            2 => ShapeVersion::Two,
            _ => ShapeVersion::One,
        };
        let styles = ShapeStyles::decode(input, &mut scope)?;
        let shape = Shape::decode(input, &mut scope)?;
        Ok(Self {
            version,
            id,
            bounds,
            styles,
            shape,
        })
    }
}

/// Layout of a [`DefineShape`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DefineShapeLayout {
    bounds: BoundsLayout,
    edge_bounds: Option<BoundsLayout>,
    styles: ShapeStylesLayout,
    shape: ShapeLayout,
}

impl Layout for DefineShapeLayout {
    fn byte_len(&self) -> usize {
        let edge = self.edge_bounds.map_or(0, |layout| layout.byte_len() + 1);
        2 + self.bounds.byte_len() + edge + self.styles.byte_len() + self.shape.byte_len()
    }
}

impl Encode for DefineShape {
    type Layout = DefineShapeLayout;

    fn layout(&self, context: &mut Context) -> Result<DefineShapeLayout> {
        let mut scope = context.push_tag(self.tag_code());
        scope.set(Flag::Transparent, self.version.is_transparent());

        let bounds = self.bounds.layout(&mut scope)?;
        let edge_bounds = match &self.version {
            ShapeVersion::Four { edge_bounds, .. } => Some(edge_bounds.layout(&mut scope)?),
            _ => None,
        };
        // Sets the index widths the outline is laid out with
        let styles = self.styles.layout(&mut scope)?;
        let shape = self.shape.layout(&mut scope)?;
        Ok(DefineShapeLayout {
            bounds,
            edge_bounds,
            styles,
            shape,
        })
    }

    fn write_laid_out(&self, layout: &DefineShapeLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        let mut scope = context.push_tag(self.tag_code());
        scope.set(Flag::Transparent, self.version.is_transparent());

        self.id.encode(out, &mut scope)?;
        self.bounds.encode_with(&layout.bounds, out, &mut scope)?;
        if let (ShapeVersion::Four { edge_bounds, flags }, Some(edge_layout)) = (&self.version, &layout.edge_bounds) {
            edge_bounds.encode_with(edge_layout, out, &mut scope)?;
            out.write_u8(flags_to_bits(*flags))?;
        }
        self.styles.encode_with(&layout.styles, out, &mut scope)?;
        self.shape.encode_with(&layout.shape, out, &mut scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};
    use crate::types::{Color, FillStyle, LineStyle, ShapeRecord, StyleChange};

    fn triangle(version: ShapeVersion) -> DefineShape {
        DefineShape {
            version,
            id: CharacterId::new(1).unwrap(),
            bounds: Bounds::new(0, 200, 0, 200).unwrap(),
            styles: ShapeStyles {
                fill_styles: vec![FillStyle::Solid(Color::rgba(255, 0, 0, 128))],
                line_styles: vec![LineStyle::Plain {
                    width: 20,
                    color: Color::rgba(0, 0, 0, 255),
                }],
            },
            shape: Shape {
                records: vec![
                    ShapeRecord::StyleChange(Box::new(StyleChange {
                        move_to: Some((0, 0)),
                        fill_style_0: Some(1),
                        line_style: Some(1),
                        ..StyleChange::default()
                    })),
                    ShapeRecord::StraightEdge {
                        delta_x: 200,
                        delta_y: 0,
                    },
                    ShapeRecord::StraightEdge {
                        delta_x: -100,
                        delta_y: 200,
                    },
                    ShapeRecord::StraightEdge {
                        delta_x: -100,
                        delta_y: -200,
                    },
                ],
            },
        }
    }

    #[test]
    fn version_3_carries_alpha() {
        let shape = triangle(ShapeVersion::Three);
        let mut context = Context::default();
        let bytes = to_bytes(&shape, &mut context).unwrap();
        assert_eq!(&bytes[..2], &[0, 1]);
        // id, bounds, fill count, fill type, rgba
        assert_eq!(&bytes[8..14], &[1, 0x00, 255, 0, 0, 128]);

        let mut scope = context.push_tag(TagCode::DefineShape3);
        assert_eq!(from_bytes::<DefineShape>(&bytes, &mut scope).unwrap(), shape);
    }

    #[test]
    fn version_1_drops_alpha() {
        let shape = triangle(ShapeVersion::One);
        let mut context = Context::default();
        let bytes = to_bytes(&shape, &mut context).unwrap();
        assert_eq!(&bytes[8..13], &[1, 0x00, 255, 0, 0]);
        assert!(!context.get(Flag::Transparent));
        assert_eq!(context.tag(), None);
    }

    #[test]
    fn version_4_flags_follow_the_edge_bounds() {
        let shape = DefineShape {
            styles: ShapeStyles::default(),
            shape: Shape::default(),
            ..triangle(ShapeVersion::Four {
                edge_bounds: Bounds::new(0, 0, 0, 0).unwrap(),
                flags: ShapeFlag::FillWindingRule | ShapeFlag::ScalingStrokes,
            })
        };
        let mut context = Context::default();
        let bytes = to_bytes(&shape, &mut context).unwrap();
        // id, 6 byte bounds, empty edge bounds, flags, two empty style counts, empty shape
        assert_eq!(&bytes[8..], &[0x00, 0b0000_0101, 0, 0, 0x00, 0x00]);

        let mut scope = context.push_tag(TagCode::DefineShape4);
        assert_eq!(from_bytes::<DefineShape>(&bytes, &mut scope).unwrap(), shape);
    }
}
