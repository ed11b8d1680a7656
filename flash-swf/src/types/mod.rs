//! The records of the format, from colors and rectangles up to whole movies

mod bounds;
mod button;
mod character_id;
mod color;
mod define_font;
mod define_shape;
mod file_attributes;
mod fill_style;
/// Bitmap filters
pub mod filter;
mod fixed;
mod frame_label;
mod gradient;
mod line_style;
mod movie;
/// Shape outlines and their styles
pub mod shape;
mod tag;
mod transform;

pub use bounds::{Bounds, BoundsLayout, MAX_COORDINATE, MIN_COORDINATE};
pub use button::{ButtonAction, ButtonEvent, DefineButton2, KeyCode};
pub use character_id::CharacterId;
pub use color::Color;
pub use define_font::{DefineFont, DefineFontLayout, FontFlag, FontLayout, FontVersion, Glyph, KerningRecord};
pub use define_shape::{DefineShape, DefineShapeLayout, ShapeFlag, ShapeVersion};
pub use file_attributes::{FileAttribute, FileAttributes};
pub use fill_style::{FillStyle, FillStyleLayout};
pub use filter::{Blur, Filter, FilterFlag, FilterStop, Glow};
pub use fixed::{Fixed16, Fixed8};
pub use frame_label::FrameLabel;
pub use gradient::{Gradient, GradientRecord, InterpolationMode, SpreadMode, MAX_GRADIENT_RECORDS};
pub use line_style::{CapStyle, JoinStyle, LineFill, LineFlag, LineStyle, LineStyleLayout};
pub(crate) use movie::{decode_movie, read_tag};
pub use movie::{Movie, MovieHeader, MovieLayout};
pub use shape::{Shape, ShapeLayout, ShapeRecord, ShapeStyles, ShapeStylesLayout, StyleChange};
pub use tag::{Tag, TagLayout};
pub use transform::{Transform, TransformLayout};
