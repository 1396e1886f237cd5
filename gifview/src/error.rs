// error.rs
//
// Copyright (c) 2026  Douglas Lau
//
use std::fmt;
use std::io;

/// Errors encountered while loading a GIF
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error from reading the source.
    Io(io::Error),
    /// A read ran past the end of the buffer.
    UnexpectedEof,
    /// First 6 bytes are not `GIF87a` or `GIF89a`.
    InvalidSignature,
    /// Unrecognized block introducer (only image, extension and trailer
    /// are valid).
    InvalidBlockType(u8),
    /// Compressed LZW data invalid, or decoded to the wrong pixel count.
    CorruptLzwStream,
    /// Pixel data references an index outside of the
    /// [ColorTable](block/struct.ColorTable.html) in effect.
    InconsistentColorTable,
    /// Graphic control or plain text extension has an invalid fixed body
    /// length.
    MalformedExtension,
    /// Image larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage,
}

/// Gifview result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::InvalidBlockType(code) => {
                write!(fmt, "InvalidBlockType ({code:#04x})")
            }
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
