// block.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Decoded GIF document model
use std::fmt;

/// Bytes per color table entry
const CHANNELS: usize = 3;

/// GIF format version
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// Unrecognized version
    #[default]
    Unknown,
    /// GIF87a
    Gif87a,
    /// GIF89a
    Gif89a,
}

impl From<&[u8]> for Version {
    fn from(v: &[u8]) -> Self {
        match v {
            b"87a" => Version::Gif87a,
            b"89a" => Version::Gif89a,
            _ => Version::Unknown,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Version::Unknown => write!(fmt, "GIF???"),
            Version::Gif87a => write!(fmt, "GIF87a"),
            Version::Gif89a => write!(fmt, "GIF89a"),
        }
    }
}

/// Top-level block introducer
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BlockCode {
    Extension,
    ImageDesc,
    Trailer,
}

impl BlockCode {
    pub fn from_u8(t: u8) -> Option<Self> {
        match t {
            b'!' => Some(BlockCode::Extension), // (0x21) Extension introducer
            b',' => Some(BlockCode::ImageDesc), // (0x2C) Image separator
            b';' => Some(BlockCode::Trailer),   // (0x3B) GIF trailer
            _ => None,
        }
    }
}

/// Extension block label
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    PlainText,
    GraphicControl,
    Comment,
    Application,
    Unknown(u8),
}

impl From<u8> for ExtensionCode {
    fn from(n: u8) -> Self {
        match n {
            0x01 => ExtensionCode::PlainText,
            0xF9 => ExtensionCode::GraphicControl,
            0xFE => ExtensionCode::Comment,
            0xFF => ExtensionCode::Application,
            _ => ExtensionCode::Unknown(n),
        }
    }
}

/// Table of RGB colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    colors: Vec<[u8; CHANNELS]>,
    sorted: bool,
}

impl ColorTable {
    /// Create a color table from packed RGB bytes
    pub fn with_colors(rgb: &[u8], sorted: bool) -> Self {
        let colors = rgb
            .chunks_exact(CHANNELS)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        ColorTable { colors, sorted }
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get all entries
    pub fn colors(&self) -> &[[u8; CHANNELS]] {
        &self.colors
    }

    /// Get one entry
    pub fn get(&self, idx: u8) -> Option<[u8; CHANNELS]> {
        self.colors.get(usize::from(idx)).copied()
    }

    /// Check if entries are sorted by decreasing importance
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
}

/// Get color table length from a 3-bit size exponent
pub(crate) fn color_table_len(exponent: u8) -> usize {
    2 << (exponent & 0b0111)
}

/// Logical screen descriptor, with optional global color table
#[derive(Debug, Default, Clone)]
pub struct LogicalScreenDesc {
    pub(crate) screen_width: u16,
    pub(crate) screen_height: u16,
    pub(crate) flags: u8,
    pub(crate) background_color_idx: u8,
    pub(crate) pixel_aspect_ratio: u8,
    pub(crate) global_color_table: Option<ColorTable>,
}

impl LogicalScreenDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }
    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn has_global_color_table(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }
    /// Bits per primary color of the source image, minus one
    pub fn color_resolution(&self) -> u8 {
        (self.flags & Self::COLOR_RESOLUTION) >> 4
    }
    pub fn is_sorted(&self) -> bool {
        self.flags & Self::COLOR_TABLE_ORDERING != 0
    }
    /// Declared number of global color table entries
    pub fn color_table_len(&self) -> usize {
        if self.has_global_color_table() {
            color_table_len(self.flags & Self::COLOR_TABLE_SIZE)
        } else {
            0
        }
    }
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
    pub fn global_color_table(&self) -> Option<&ColorTable> {
        self.global_color_table.as_ref()
    }
}

/// Method of disposing a graphic before the next one is drawn
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// Reserved value (4-7)
    Undefined,
    /// No disposal specified
    #[default]
    None,
    /// Leave graphic in place
    DoNotDispose,
    /// Restore area to background
    RestoreBackground,
    /// Restore area to what was there before the graphic
    RestorePrevious,
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        match n & 0b0111 {
            0 => DisposalMethod::None,
            1 => DisposalMethod::DoNotDispose,
            2 => DisposalMethod::RestoreBackground,
            3 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::Undefined,
        }
    }
}

/// Graphic control extension
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
    pub(crate) flags: u8,
    pub(crate) delay_time_cs: u16, // delay in centiseconds
    pub(crate) transparent_color_idx: u8,
}

impl GraphicControl {
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }
    pub fn user_input(&self) -> bool {
        self.flags & Self::USER_INPUT != 0
    }
    pub fn transparent_color_flag(&self) -> bool {
        self.flags & Self::TRANSPARENT_COLOR != 0
    }
    /// Delay time, in hundredths of a second
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }
    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }
    /// Get the transparent color index, if the flag is set
    pub fn transparent_color(&self) -> Option<u8> {
        self.transparent_color_flag()
            .then_some(self.transparent_color_idx)
    }
}

/// Table-based image, with decompressed indexed pixels
#[derive(Debug, Default, Clone)]
pub struct Image {
    pub(crate) left: u16,
    pub(crate) top: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) flags: u8,
    pub(crate) local_color_table: Option<ColorTable>,
    pub(crate) pixels: Vec<u8>,
}

impl Image {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn left(&self) -> u16 {
        self.left
    }
    pub fn top(&self) -> u16 {
        self.top
    }
    pub fn width(&self) -> u16 {
        self.width
    }
    pub fn height(&self) -> u16 {
        self.height
    }
    pub fn flags(&self) -> u8 {
        self.flags
    }
    pub fn interlaced(&self) -> bool {
        self.flags & Self::INTERLACED != 0
    }
    pub fn has_local_color_table(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }
    pub fn is_sorted(&self) -> bool {
        self.flags & Self::COLOR_TABLE_ORDERING != 0
    }
    /// Declared number of local color table entries
    pub fn color_table_len(&self) -> usize {
        if self.has_local_color_table() {
            color_table_len(self.flags & Self::COLOR_TABLE_SIZE)
        } else {
            0
        }
    }
    pub fn local_color_table(&self) -> Option<&ColorTable> {
        self.local_color_table.as_ref()
    }
    /// Image size in pixels
    pub fn image_sz(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
    /// Color table indices, in top-to-bottom row order
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Plain text extension
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlainText {
    pub(crate) left: u16,
    pub(crate) top: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) cell_width: u8,
    pub(crate) cell_height: u8,
    pub(crate) fg_color_idx: u8,
    pub(crate) bg_color_idx: u8,
    pub(crate) text: Vec<u8>,
}

impl PlainText {
    /// Text grid left position
    pub fn left(&self) -> u16 {
        self.left
    }
    /// Text grid top position
    pub fn top(&self) -> u16 {
        self.top
    }
    /// Text grid width
    pub fn width(&self) -> u16 {
        self.width
    }
    /// Text grid height
    pub fn height(&self) -> u16 {
        self.height
    }
    pub fn cell_width(&self) -> u8 {
        self.cell_width
    }
    pub fn cell_height(&self) -> u8 {
        self.cell_height
    }
    pub fn fg_color_idx(&self) -> u8 {
        self.fg_color_idx
    }
    pub fn bg_color_idx(&self) -> u8 {
        self.bg_color_idx
    }
    pub fn text(&self) -> &[u8] {
        &self.text
    }
}

/// Content of a graphic block
#[derive(Debug, Clone)]
pub enum GraphicKind {
    Image(Image),
    PlainText(PlainText),
}

/// Graphic block: an image or plain text, with optional graphic control
#[derive(Debug, Clone)]
pub struct Graphic {
    pub control: Option<GraphicControl>,
    pub kind: GraphicKind,
}

impl Graphic {
    pub fn control(&self) -> Option<&GraphicControl> {
        self.control.as_ref()
    }
    /// Delay time in centiseconds (0 without graphic control)
    pub fn delay_time_cs(&self) -> u16 {
        self.control.map_or(0, |c| c.delay_time_cs())
    }
    pub fn disposal_method(&self) -> DisposalMethod {
        self.control.map(|c| c.disposal_method()).unwrap_or_default()
    }
    pub fn transparent_color(&self) -> Option<u8> {
        self.control.and_then(|c| c.transparent_color())
    }
    pub fn image(&self) -> Option<&Image> {
        match &self.kind {
            GraphicKind::Image(img) => Some(img),
            GraphicKind::PlainText(_) => None,
        }
    }
    pub fn plain_text(&self) -> Option<&PlainText> {
        match &self.kind {
            GraphicKind::PlainText(txt) => Some(txt),
            GraphicKind::Image(_) => None,
        }
    }
}

/// Decoded GIF document.
///
/// Graphics form a circular sequence for animation: the last graphic is
/// followed by the first.
#[derive(Debug, Default, Clone)]
pub struct Document {
    pub(crate) version: Version,
    pub(crate) screen: LogicalScreenDesc,
    pub(crate) graphics: Vec<Graphic>,
    pub(crate) comments: Vec<Vec<u8>>,
    pub(crate) loop_count: Option<u16>,
}

impl Document {
    pub fn version(&self) -> Version {
        self.version
    }
    pub fn screen(&self) -> &LogicalScreenDesc {
        &self.screen
    }
    pub fn graphics(&self) -> &[Graphic] {
        &self.graphics
    }
    /// Comment extension payloads, in file order
    pub fn comments(&self) -> &[Vec<u8>] {
        &self.comments
    }
    /// Animation loop count from a NETSCAPE2.0 extension (0 means forever)
    pub fn loop_count(&self) -> Option<u16> {
        self.loop_count
    }
    /// Get the color table in effect for an image
    pub fn effective_color_table<'a>(
        &'a self,
        image: &'a Image,
    ) -> Option<&'a ColorTable> {
        image
            .local_color_table()
            .or_else(|| self.screen.global_color_table())
    }
    /// Sum of every graphic's delay, in centiseconds
    pub fn total_delay_cs(&self) -> u64 {
        self.graphics
            .iter()
            .map(|g| u64::from(g.delay_time_cs()))
            .sum()
    }
}
