use thiserror::Error;

/// Enum for representing encoding and decoding errors
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A record did not occupy exactly the number of bytes it declared
    #[error(
        "{record} at byte {offset}: declared {declared} bytes but position is off by {discrepancy} bytes"
    )]
    StructuralMismatch {
        /// Name of the record type being encoded or decoded
        record: &'static str,
        /// Byte offset of the start of the record in the stream
        offset: usize,
        /// Length the record declared, in bytes
        declared: usize,
        /// Actual length minus declared length, in bytes
        discrepancy: i64,
    },

    /// A discriminant with no registered decoder
    #[error("Unsupported {family} variant {discriminant:#x}")]
    UnsupportedVariant {
        /// The family of alternatives being resolved
        family: &'static str,
        /// The discriminant that was read
        discriminant: u32,
    },

    /// A value that does not fit the field it is assigned to
    #[error("{field} value {value} is outside {min}..={max}")]
    RangeViolation {
        /// Name of the field
        field: &'static str,
        /// The rejected value
        value: i64,
        /// Smallest accepted value
        min: i64,
        /// Largest accepted value
        max: i64,
    },

    /// Out of bounds read or write
    #[error("Out of bounds: {requested} bits requested at bit {position}")]
    BufferExhausted {
        /// Bit position of the cursor when the access was attempted
        position: usize,
        /// Number of bits requested
        requested: usize,
    },

    /// A string that is not valid in the encoding required by the format version
    #[error("Invalid string at byte {offset}")]
    InvalidString {
        /// Byte offset of the start of the string
        offset: usize,
    },
}

/// The category of an [`Error`], for callers that only need to branch on the kind of failure
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// See [`Error::StructuralMismatch`]
    StructuralMismatch,
    /// See [`Error::UnsupportedVariant`]
    UnsupportedVariant,
    /// See [`Error::RangeViolation`]
    RangeViolation,
    /// See [`Error::BufferExhausted`]
    BufferExhausted,
    /// See [`Error::InvalidString`]
    InvalidString,
}

impl Error {
    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::StructuralMismatch { .. } => ErrorKind::StructuralMismatch,
            Error::UnsupportedVariant { .. } => ErrorKind::UnsupportedVariant,
            Error::RangeViolation { .. } => ErrorKind::RangeViolation,
            Error::BufferExhausted { .. } => ErrorKind::BufferExhausted,
            Error::InvalidString { .. } => ErrorKind::InvalidString,
        }
    }

    pub(crate) fn range(field: &'static str, value: impl Into<i64>, min: i64, max: i64) -> Self {
        Error::RangeViolation {
            field,
            value: value.into(),
            min,
            max,
        }
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
