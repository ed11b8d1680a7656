//! Handles reading of movies
use crate::bits::BitReader;
use crate::context::Context;
use crate::errors::Result;
use crate::tag::Frames;
use crate::types::{decode_movie, read_tag, Movie, Tag};

/// The main entry point of decoding a movie
///
/// Example of use
/// ```no_run
/// use std::fs::File;
/// use std::io::Read;
/// use flash_swf::read::Reader;
/// let mut x = File::open("tests/swf/movie.swf").expect("Couldn't open file");
/// let mut data = Vec::new();
/// let _ = x.read_to_end(&mut data).expect("Unable to read file");
/// let movie = Reader::default().parse(&data).expect("Failed to parse swf file");
/// println!("{:#?}", movie);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Reader {
    /// Keep tags whose body fails to decode as [`Tag::Unknown`] instead of failing
    ///
    /// Errors in tag headers still fail, the tags that follow can't be found without them.
    pub lenient: bool,
}

impl Reader {
    /// A reader that keeps going past malformed tags
    pub fn lenient() -> Self {
        Self { lenient: true }
    }

    /// Read a given buffer as a movie, anything after the end tag is ignored
    pub fn parse(&self, data: &[u8]) -> Result<Movie> {
        let mut input = BitReader::new(data);
        let mut context = Context::default();
        let movie = decode_movie(&mut input, &mut context, self.lenient)?;
        if !input.at_end() {
            log::debug!("{} bytes after the end tag", input.remaining_bytes());
        }
        Ok(movie)
    }

    /// Read a list of tags that isn't wrapped in a movie, up to the end tag
    pub fn parse_tags(&self, data: &[u8], version: u8) -> Result<Vec<Tag>> {
        let mut context = Context::new(version);
        let mut tags = Vec::new();
        for frame in Frames::new(BitReader::new(data)) {
            tags.push(read_tag(&frame?, &mut context, self.lenient)?);
        }
        Ok(tags)
    }
}
