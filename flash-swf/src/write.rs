//! Handles writing of movies
use crate::codec::to_bytes;
use crate::context::Context;
use crate::errors::Result;
use crate::types::{Movie, Tag};

/// Handles writing a given movie
#[derive(Debug, Default, Clone, Copy)]
pub struct Writer;

impl Writer {
    /// Write a given movie, the file length in the header is filled in
    pub fn write(&self, movie: &Movie) -> Result<Vec<u8>> {
        let mut context = Context::new(movie.header.version);
        let bytes = to_bytes(movie, &mut context)?;
        log::debug!("wrote {} tags, {} bytes", movie.tags.len(), bytes.len());
        Ok(bytes)
    }

    /// Write a list of tags without a movie header
    pub fn write_tags(&self, tags: &[Tag], version: u8) -> Result<Vec<u8>> {
        let mut context = Context::new(version);
        let mut bytes = Vec::new();
        for tag in tags {
            bytes.extend(to_bytes(tag, &mut context)?);
        }
        Ok(bytes)
    }
}

/// Write a movie with the default [`Writer`]
pub fn write_to_bytes(movie: &Movie) -> Result<Vec<u8>> {
    Writer.write(movie)
}
