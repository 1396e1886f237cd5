// private.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! Private module for top-level items
use crate::{Result, block::Document, decode};
use std::io::Read;

/// GIF file decoder
///
/// The entire source is read, then decoded into a [Document].  Decoding
/// fails on the first error; no partial documents are produced.
///
/// ## Example: Decode a GIF
/// ```
/// use gifview::Decoder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` as "gif"
/// let doc = Decoder::new(gif).decode()?;
/// for graphic in doc.graphics() {
///     if let Some(image) = graphic.image() {
///         assert_eq!(image.pixels(), &[1, 0, 0, 1]);
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// [Document]: block/struct.Document.html
pub struct Decoder<R: Read> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Check pixel indices against color tables
    strict_color_indices: bool,
}

impl<R: Read> Decoder<R> {
    /// Create a new GIF decoder.
    pub fn new(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(1 << 25),
            strict_color_indices: true,
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Set whether pixels must index into the effective color table.
    ///
    /// When enabled (the default), an out-of-range index fails with
    /// `InconsistentColorTable`.  The transparent color index is exempt.
    pub fn strict_color_indices(mut self, strict: bool) -> Self {
        self.strict_color_indices = strict;
        self
    }

    /// Read the source and decode it into a document.
    pub fn decode(mut self) -> Result<Document> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        decode::decode_document(
            &buf,
            self.max_image_sz,
            self.strict_color_indices,
        )
    }
}
