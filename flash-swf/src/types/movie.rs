use crate::bits::{BitReader, BitWriter};
use crate::codec::{layout_all, total_len, write_all, Decode, Encode, Layout};
use crate::context::Context;
use crate::errors::{Error, Result};
use crate::tag::{Frame, Frames};
use crate::types::tag::unknown;
use crate::types::{Bounds, BoundsLayout, Tag, TagLayout};

const SIGNATURE: &[u8; 3] = b"FWS";
const ZLIB_SIGNATURE: &[u8; 3] = b"CWS";
const LZMA_SIGNATURE: &[u8; 3] = b"ZWS";

/// The fixed part of the file before the frame size
const PREFIX_LEN: usize = 3 + 1 + 4;

/// Global properties of a movie
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MovieHeader {
    /// Format version, decides how strings are encoded
    pub version: u8,
    /// Stage size in twips
    pub frame_size: Bounds,
    /// Frames per second, 8.8 fixed point
    pub frame_rate: u16,
    pub frame_count: u16,
}

/// A whole uncompressed movie
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Movie {
    pub header: MovieHeader,
    pub tags: Vec<Tag>,
}

impl MovieHeader {
    /// Read the header and switch `context` to its version
    ///
    /// The declared file length has to match the length of `input`.
    pub fn read(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        let signature = input.read_bytes(3)?;
        if signature != SIGNATURE {
            let family = if signature == ZLIB_SIGNATURE || signature == LZMA_SIGNATURE {
                "compression"
            } else {
                "signature"
            };
            return Err(Error::UnsupportedVariant {
                family,
                discriminant: u32::from(signature[0]),
            });
        }

        let version = input.read_u8()?;
        context.set_version(version);
        log::debug!("movie version {version}");

        let declared = input.read_u32()? as usize;
        let actual = input.data().len();
        if declared != actual {
            return Err(Error::StructuralMismatch {
                record: "Movie",
                offset: 0,
                declared,
                discrepancy: actual as i64 - declared as i64,
            });
        }

        Ok(Self {
            version,
            frame_size: Bounds::decode(input, context)?,
            frame_rate: input.read_u16()?,
            frame_count: input.read_u16()?,
        })
    }
}

/// Decode a movie, in lenient mode tags whose body fails to decode are kept as unknown tags
pub(crate) fn decode_movie(input: &mut BitReader<'_>, context: &mut Context, lenient: bool) -> Result<Movie> {
    let header = MovieHeader::read(input, context)?;
    let mut frames = Frames::new(input.clone());
    let mut tags = Vec::new();
    for frame in frames.by_ref() {
        let frame = frame?;
        tags.push(read_tag(&frame, context, lenient)?);
    }
    *input = frames.into_inner();
    Ok(Movie { header, tags })
}

/// Decode a framed tag, in lenient mode a body that fails to decode is kept as an unknown tag
pub(crate) fn read_tag(frame: &Frame<'_>, context: &mut Context, lenient: bool) -> Result<Tag> {
    match Tag::read(frame, context) {
        Ok(tag) => Ok(tag),
        Err(e) if lenient => {
            log::warn!(
                "Keeping tag {} at byte {} undecoded: {e}",
                frame.header.code,
                frame.offset
            );
            Ok(unknown(frame))
        }
        Err(e) => Err(e),
    }
}

impl Decode for Movie {
    fn decode(input: &mut BitReader<'_>, context: &mut Context) -> Result<Self> {
        decode_movie(input, context, false)
    }
}

/// Layout of a [`Movie`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MovieLayout {
    frame_size: BoundsLayout,
    tags: Vec<TagLayout>,
}

impl Layout for MovieLayout {
    fn byte_len(&self) -> usize {
        PREFIX_LEN + self.frame_size.byte_len() + 2 + 2 + total_len(&self.tags)
    }
}

impl Encode for Movie {
    type Layout = MovieLayout;

    fn layout(&self, context: &mut Context) -> Result<MovieLayout> {
        context.set_version(self.header.version);
        let frame_size = self.header.frame_size.layout(context)?;
        let tags = layout_all(&self.tags, context)?;
        let layout = MovieLayout { frame_size, tags };
        let length = layout.byte_len();
        if u32::try_from(length).is_err() {
            return Err(Error::range("file length", length as i64, 0, i64::from(u32::MAX)));
        }
        Ok(layout)
    }

    fn write_laid_out(&self, layout: &MovieLayout, out: &mut BitWriter, context: &mut Context) -> Result<()> {
        context.set_version(self.header.version);
        out.write_bytes(SIGNATURE)?;
        out.write_u8(self.header.version)?;
        // `layout` has checked the length fits
        out.write_u32(layout.byte_len() as u32)?;
        self.header.frame_size.encode_with(&layout.frame_size, out, context)?;
        out.write_u16(self.header.frame_rate)?;
        out.write_u16(self.header.frame_count)?;
        write_all(&self.tags, &layout.tags, out, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};
    use crate::types::Color;

    fn movie() -> Movie {
        Movie {
            header: MovieHeader {
                version: 10,
                frame_size: Bounds::new(0, 11000, 0, 8000).unwrap(),
                frame_rate: 24 << 8,
                frame_count: 1,
            },
            tags: vec![Tag::SetBackgroundColor(Color::WHITE), Tag::ShowFrame, Tag::End],
        }
    }

    #[test]
    fn file_length_is_the_whole_file() {
        let mut context = Context::default();
        let bytes = to_bytes(&movie(), &mut context).unwrap();
        assert_eq!(&bytes[..4], b"FWS\x0a");
        assert_eq!(&bytes[4..8], &(bytes.len() as u32).to_be_bytes());
        assert_eq!(&bytes[bytes.len() - 4..], &[0x00, 0x40, 0x00, 0x00]);
        assert_eq!(from_bytes::<Movie>(&bytes, &mut context).unwrap(), movie());
    }

    #[test]
    fn wrong_file_length() {
        let mut context = Context::default();
        let mut bytes = to_bytes(&movie(), &mut context).unwrap();
        bytes.push(0);
        assert_eq!(
            from_bytes::<Movie>(&bytes, &mut context).unwrap_err(),
            Error::StructuralMismatch {
                record: "Movie",
                offset: 0,
                declared: bytes.len() - 1,
                discrepancy: 1
            }
        );
    }

    #[test]
    fn compressed_movies_are_not_handled() {
        let error = from_bytes::<Movie>(b"CWS\x0a\0\0\0\x08", &mut Context::default()).unwrap_err();
        assert_eq!(
            error,
            Error::UnsupportedVariant {
                family: "compression",
                discriminant: u32::from(b'C')
            }
        );
    }

    #[test]
    fn version_selects_string_encoding() {
        let mut context = Context::default();
        let mut old = movie();
        old.header.version = 5;
        to_bytes(&old, &mut context).unwrap();
        assert_eq!(context.version(), 5);
    }
}
