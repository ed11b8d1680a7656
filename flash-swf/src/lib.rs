//! Bit-exact reading and writing of SWF records
//!
//! The building blocks are a bit granular cursor ([`bits`]), a context of flags that nested
//! records inherit ([`context`]), and the two-phase [`codec`] contract every record implements:
//! lay the record out first, then write exactly the bytes the layout promised. Tags are framed by
//! [`tag`], offset tables are back-patched by [`offset_table`], and families of records selected
//! by a discriminant go through [`variant`].
//!
//! Example of use
//! ```
//! use flash_swf::read::Reader;
//! use flash_swf::write::write_to_bytes;
//! use flash_swf::types::{Bounds, Color, Movie, MovieHeader, Tag};
//!
//! let movie = Movie {
//!     header: MovieHeader {
//!         version: 10,
//!         frame_size: Bounds::new(0, 11000, 0, 8000).expect("valid stage size"),
//!         frame_rate: 24 << 8,
//!         frame_count: 1,
//!     },
//!     tags: vec![Tag::SetBackgroundColor(Color::WHITE), Tag::ShowFrame, Tag::End],
//! };
//! let bytes = write_to_bytes(&movie).expect("Failed to write movie");
//! let parsed = Reader::default().parse(&bytes).expect("Failed to parse movie");
//! assert_eq!(parsed, movie);
//! ```

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

/// Bit cursors and field widths
pub mod bits;
/// The layout and write contract of records
pub mod codec;
/// Flags inherited by nested records
pub mod context;
/// Errors returned by every codec operation
pub mod errors;
mod nom_utils;
/// Back-patched offset tables
pub mod offset_table;
/// Reading of whole movies
pub mod read;
/// Tag headers and framing
pub mod tag;
/// The record catalog
pub mod types;
/// Records selected by a discriminant
pub mod variant;
/// Writing of whole movies
pub mod write;

pub use codec::{Decode, Encode, Layout};
pub use context::{Context, Flag};
pub use errors::{Error, ErrorKind, Result};
