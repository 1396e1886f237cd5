// decode.rs
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! GIF block decoding and document assembly
use crate::block::*;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::lzw::{self, Decompressor};
use log::{debug, warn};

/// Application extensions which carry an animation loop count
const LOOPING_APPS: [&[u8]; 2] = [b"NETSCAPE2.0", b"ANIMEXTS1.0"];

/// One decoded block, following the screen descriptor
#[derive(Debug)]
pub(crate) enum Block {
    GraphicControl(GraphicControl),
    PlainText(PlainText),
    Comment(Vec<u8>),
    /// Application extension, with loop count if recognized
    Application(Option<u16>),
    /// Unknown extension (discarded)
    Unknown(u8),
    Image(Image),
    Trailer,
}

/// Iterator of [Block]s within a GIF buffer.
///
/// The [preamble](BlockDecoder::preamble) must be read first.
pub(crate) struct BlockDecoder<'a> {
    /// Cursor into the buffer
    cursor: Cursor<'a>,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Flag indicating iteration is done
    done: bool,
}

impl Iterator for BlockDecoder<'_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cursor.is_empty() {
            debug!("end of input without trailer");
            self.done = true;
            return None;
        }
        let res = self.next_block();
        match res {
            Ok(Block::Trailer) => {
                self.done = true;
                if !self.cursor.is_empty() {
                    warn!(
                        "{} bytes after trailer ignored",
                        self.cursor.remaining()
                    );
                }
            }
            Err(_) => self.done = true,
            _ => (),
        }
        Some(res)
    }
}

impl<'a> BlockDecoder<'a> {
    /// Create a new block decoder
    pub fn new(buf: &'a [u8], max_image_sz: Option<usize>) -> Self {
        BlockDecoder {
            cursor: Cursor::new(buf),
            max_image_sz,
            done: false,
        }
    }

    /// Read the header, logical screen descriptor and global color table
    pub fn preamble(&mut self) -> Result<(Version, LogicalScreenDesc)> {
        let version = self.decode_header()?;
        let screen = LogicalScreenDesc::from_cursor(&mut self.cursor)?;
        debug!(
            "{version} screen: {}x{} ({} global colors)",
            screen.screen_width(),
            screen.screen_height(),
            screen.color_table_len()
        );
        Ok((version, screen))
    }

    /// Decode signature and version
    fn decode_header(&mut self) -> Result<Version> {
        let len = self.cursor.remaining();
        if len < 6 {
            // a short header still has to look like a GIF
            let buf = self.cursor.read_exact(len.min(3))?;
            if !b"GIF".starts_with(buf) {
                return Err(Error::InvalidSignature);
            }
            return Err(Error::UnexpectedEof);
        }
        let buf = self.cursor.read_exact(6)?;
        let version = Version::from(&buf[3..]);
        if &buf[..3] != b"GIF" || version == Version::Unknown {
            return Err(Error::InvalidSignature);
        }
        Ok(version)
    }

    /// Decode the next block (including all sub-blocks)
    fn next_block(&mut self) -> Result<Block> {
        let pos = self.cursor.position();
        let code = self.cursor.read_u8()?;
        let block = match BlockCode::from_u8(code) {
            Some(BlockCode::Extension) => self.decode_extension()?,
            Some(BlockCode::ImageDesc) => Block::Image(self.decode_image()?),
            Some(BlockCode::Trailer) => Block::Trailer,
            None => return Err(Error::InvalidBlockType(code)),
        };
        debug!(
            "block @{pos}: {} ({} bytes)",
            block.name(),
            self.cursor.position() - pos
        );
        Ok(block)
    }

    /// Read the fixed-size body of an extension
    fn fixed_body(&mut self, sz: usize) -> Result<&'a [u8]> {
        let len = self.cursor.read_u8()?;
        if usize::from(len) != sz {
            return Err(Error::MalformedExtension);
        }
        self.cursor.read_exact(sz)
    }

    /// Decode an extension block
    fn decode_extension(&mut self) -> Result<Block> {
        let label = self.cursor.read_u8()?;
        Ok(match ExtensionCode::from(label) {
            ExtensionCode::GraphicControl => {
                let body = self.fixed_body(4)?;
                self.cursor.skip_sub_block_chain()?;
                Block::GraphicControl(GraphicControl::from_buf(body))
            }
            ExtensionCode::PlainText => {
                let body = self.fixed_body(12)?;
                let text = self.cursor.read_sub_block_chain()?;
                Block::PlainText(PlainText::from_buf(body, text))
            }
            ExtensionCode::Comment => {
                Block::Comment(self.cursor.read_sub_block_chain()?)
            }
            ExtensionCode::Application => {
                let blocks = self.cursor.read_sub_blocks()?;
                Block::Application(loop_count(&blocks))
            }
            ExtensionCode::Unknown(label) => {
                self.cursor.skip_sub_block_chain()?;
                Block::Unknown(label)
            }
        })
    }

    /// Decode an image descriptor, local color table and image data
    fn decode_image(&mut self) -> Result<Image> {
        let c = &mut self.cursor;
        let mut image = Image {
            left: c.read_u16_le()?,
            top: c.read_u16_le()?,
            width: c.read_u16_le()?,
            height: c.read_u16_le()?,
            flags: c.read_u8()?,
            ..Default::default()
        };
        if image.has_local_color_table() {
            let len = image.color_table_len();
            let table = ColorTable::from_cursor(c, len, image.is_sorted())?;
            image.local_color_table = Some(table);
        }
        let image_sz = image.image_sz();
        if let Some(max) = self.max_image_sz {
            if image_sz > max {
                debug!("image size {image_sz} exceeds {max}");
                return Err(Error::TooLargeImage);
            }
        }
        let min_code_bits = c.read_u8()?;
        let data = c.read_sub_block_chain()?;
        let mut dec = Decompressor::new(min_code_bits)?;
        let pixels = dec.decompress(&data, image_sz)?;
        image.pixels = if image.interlaced() {
            let width = usize::from(image.width);
            lzw::deinterlace(&pixels, width, usize::from(image.height))
        } else {
            pixels
        };
        Ok(image)
    }
}

/// Get loop count from application extension sub-blocks
fn loop_count(blocks: &[&[u8]]) -> Option<u16> {
    match blocks {
        [app, data, ..] if LOOPING_APPS.contains(app) => match *data {
            [1, lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
            _ => None,
        },
        _ => None,
    }
}

impl Block {
    /// Get a short name for logging
    fn name(&self) -> &'static str {
        match self {
            Block::GraphicControl(_) => "GraphicControl",
            Block::PlainText(_) => "PlainText",
            Block::Comment(_) => "Comment",
            Block::Application(_) => "Application",
            Block::Unknown(_) => "Unknown",
            Block::Image(_) => "Image",
            Block::Trailer => "Trailer",
        }
    }
}

impl ColorTable {
    /// Read a color table with `len` entries
    fn from_cursor(c: &mut Cursor, len: usize, sorted: bool) -> Result<Self> {
        let rgb = c.read_exact(len * 3)?;
        Ok(Self::with_colors(rgb, sorted))
    }
}

impl LogicalScreenDesc {
    /// Read a logical screen descriptor and global color table
    fn from_cursor(c: &mut Cursor) -> Result<Self> {
        let mut screen = LogicalScreenDesc {
            screen_width: c.read_u16_le()?,
            screen_height: c.read_u16_le()?,
            flags: c.read_u8()?,
            background_color_idx: c.read_u8()?,
            pixel_aspect_ratio: c.read_u8()?,
            global_color_table: None,
        };
        if screen.has_global_color_table() {
            let len = screen.color_table_len();
            let table = ColorTable::from_cursor(c, len, screen.is_sorted())?;
            screen.global_color_table = Some(table);
        }
        Ok(screen)
    }
}

impl GraphicControl {
    /// Decode a graphic control extension body
    fn from_buf(buf: &[u8]) -> Self {
        GraphicControl {
            flags: buf[0],
            delay_time_cs: u16::from_le_bytes([buf[1], buf[2]]),
            transparent_color_idx: buf[3],
        }
    }
}

impl PlainText {
    /// Decode a plain text extension body
    fn from_buf(buf: &[u8], text: Vec<u8>) -> Self {
        PlainText {
            left: u16::from_le_bytes([buf[0], buf[1]]),
            top: u16::from_le_bytes([buf[2], buf[3]]),
            width: u16::from_le_bytes([buf[4], buf[5]]),
            height: u16::from_le_bytes([buf[6], buf[7]]),
            cell_width: buf[8],
            cell_height: buf[9],
            fg_color_idx: buf[10],
            bg_color_idx: buf[11],
            text,
        }
    }
}

/// Document assembler, pairing graphic control extensions with graphics
struct Assembler {
    /// Document being assembled
    doc: Document,
    /// Pending graphic control extension
    control: Option<GraphicControl>,
    /// Check pixel indices against color tables
    strict_color_indices: bool,
}

impl Assembler {
    /// Handle one block
    fn handle_block(&mut self, block: Block) -> Result<()> {
        match block {
            Block::GraphicControl(control) => {
                if self.control.replace(control).is_some() {
                    warn!("graphic control replaced before use");
                }
            }
            Block::PlainText(text) => {
                let control = self.control.take();
                let kind = GraphicKind::PlainText(text);
                self.doc.graphics.push(Graphic { control, kind });
            }
            Block::Comment(comment) => self.doc.comments.push(comment),
            Block::Application(Some(count)) => {
                self.doc.loop_count = Some(count)
            }
            Block::Application(None) => (),
            Block::Unknown(label) => {
                warn!("unknown extension {label:#04x} discarded")
            }
            Block::Image(image) => {
                let control = self.control.take();
                self.check_color_indices(&image, control)?;
                let kind = GraphicKind::Image(image);
                self.doc.graphics.push(Graphic { control, kind });
            }
            Block::Trailer => (),
        }
        Ok(())
    }

    /// Check that all pixels index into the effective color table
    fn check_color_indices(
        &self,
        image: &Image,
        control: Option<GraphicControl>,
    ) -> Result<()> {
        let Some(table) = self.doc.effective_color_table(image) else {
            warn!("image {} has no color table", self.doc.graphics.len());
            return Ok(());
        };
        if !self.strict_color_indices {
            return Ok(());
        }
        let len = table.len();
        let transparent = control.and_then(|c| c.transparent_color());
        let bad = image
            .pixels()
            .iter()
            .find(|&&p| usize::from(p) >= len && Some(p) != transparent);
        match bad {
            Some(p) => {
                debug!("color index {p} outside table of {len}");
                Err(Error::InconsistentColorTable)
            }
            None => Ok(()),
        }
    }

    /// Finish assembling the document
    fn finish(self) -> Document {
        if self.control.is_some() {
            warn!("graphic control without graphic discarded");
        }
        self.doc
    }
}

/// Decode a complete GIF buffer into a document
pub(crate) fn decode_document(
    buf: &[u8],
    max_image_sz: Option<usize>,
    strict_color_indices: bool,
) -> Result<Document> {
    let mut blocks = BlockDecoder::new(buf, max_image_sz);
    let (version, screen) = blocks.preamble()?;
    let mut asm = Assembler {
        doc: Document {
            version,
            screen,
            ..Default::default()
        },
        control: None,
        strict_color_indices,
    };
    for block in blocks {
        asm.handle_block(block?)?;
    }
    Ok(asm.finish())
}
