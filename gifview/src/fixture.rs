// fixture.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Test utilities for building GIF byte streams.
//!
//! No validation is performed, so malformed files can be built too.
use std::collections::HashMap;

/// Bit packer, least-significant bit first
#[derive(Default)]
struct BitWriter {
    buf: Vec<u8>,
    code: u32,
    n_bits: u8,
}

impl BitWriter {
    fn pack(&mut self, code: u16, bits: u8) {
        self.code |= u32::from(code) << self.n_bits;
        self.n_bits += bits;
        while self.n_bits >= 8 {
            self.buf.push(self.code as u8);
            self.code >>= 8;
            self.n_bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.n_bits > 0 {
            self.buf.push(self.code as u8);
        }
        self.buf
    }
}

/// Encode pixels as literal codes, each preceded by a clear code.
///
/// The code width never grows, which keeps streams easy to reason about.
pub fn lzw_literals(min_code_bits: u8, pixels: &[u8]) -> Vec<u8> {
    let clear = 1 << min_code_bits;
    let bits = min_code_bits + 1;
    let mut w = BitWriter::default();
    for p in pixels {
        w.pack(clear, bits);
        w.pack(u16::from(*p), bits);
    }
    w.pack(clear + 1, bits);
    w.finish()
}

/// Compress pixels with a dictionary encoder.
///
/// When `clear_when_full` is false, the table stops growing at 4096
/// entries and encoding continues with 12-bit codes.
pub fn lzw_compress(
    min_code_bits: u8,
    pixels: &[u8],
    clear_when_full: bool,
) -> Vec<u8> {
    let clear: u16 = 1 << min_code_bits;
    let end = clear + 1;
    let mut dict = HashMap::new();
    let mut next = end + 1;
    let mut bits = min_code_bits + 1;
    let mut w = BitWriter::default();
    w.pack(clear, bits);
    let mut cur: Option<u16> = None;
    for &b in pixels {
        let c = match cur {
            None => {
                cur = Some(b.into());
                continue;
            }
            Some(c) => c,
        };
        if let Some(&n) = dict.get(&(c, b)) {
            cur = Some(n);
            continue;
        }
        w.pack(c, bits);
        if next < 4096 {
            dict.insert((c, b), next);
            next += 1;
            if next > (1 << bits) && bits < 12 {
                bits += 1;
            }
        } else if clear_when_full {
            w.pack(clear, bits);
            dict.clear();
            next = end + 1;
            bits = min_code_bits + 1;
        }
        cur = Some(b.into());
    }
    if let Some(c) = cur {
        w.pack(c, bits);
    }
    w.pack(end, bits);
    w.finish()
}

/// Pseudo-random bytes
pub fn noise(len: usize) -> Vec<u8> {
    let mut x: u32 = 0x2545_F491;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12345);
            (x >> 16) as u8
        })
        .collect()
}

/// Split data into a sub-block chain
pub fn sub_blocks(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(data.len() + data.len() / 255 + 2);
    for chunk in data.chunks(255) {
        buf.push(chunk.len() as u8);
        buf.extend_from_slice(chunk);
    }
    buf.push(0);
    buf
}

/// Get the size exponent for a color table
fn table_exponent(colors: &[[u8; 3]]) -> u8 {
    let len = colors.len();
    assert!(len.is_power_of_two() && (2..=256).contains(&len));
    colors.len().trailing_zeros() as u8 - 1
}

/// GIF file builder
pub struct Gif {
    buf: Vec<u8>,
}

impl Gif {
    /// Start a GIF89a with an optional global color table
    pub fn new(width: u16, height: u16, global: &[[u8; 3]]) -> Self {
        let mut buf = b"GIF89a".to_vec();
        buf.extend_from_slice(&width.to_le_bytes());
        buf.extend_from_slice(&height.to_le_bytes());
        if global.is_empty() {
            buf.extend_from_slice(&[0, 0, 0]);
        } else {
            buf.extend_from_slice(&[0x80 | table_exponent(global), 0, 0]);
            for c in global {
                buf.extend_from_slice(c);
            }
        }
        Gif { buf }
    }

    /// Append raw bytes
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a graphic control extension
    pub fn control(self, flags: u8, delay_cs: u16, transparent: u8) -> Self {
        let [lo, hi] = delay_cs.to_le_bytes();
        self.raw(&[0x21, 0xF9, 4, flags, lo, hi, transparent, 0])
    }

    /// Append an image with a literal-coded LZW stream
    pub fn image(
        self,
        (left, top, width, height): (u16, u16, u16, u16),
        interlaced: bool,
        local: &[[u8; 3]],
        min_code_bits: u8,
        pixels: &[u8],
    ) -> Self {
        let data = lzw_literals(min_code_bits, pixels);
        let rect = (left, top, width, height);
        self.image_data(rect, interlaced, local, min_code_bits, &data)
    }

    /// Append an image with pre-compressed LZW data
    pub fn image_data(
        self,
        (left, top, width, height): (u16, u16, u16, u16),
        interlaced: bool,
        local: &[[u8; 3]],
        min_code_bits: u8,
        data: &[u8],
    ) -> Self {
        let mut b = vec![0x2C];
        for v in [left, top, width, height] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        let mut flags = if interlaced { 0x40 } else { 0 };
        if !local.is_empty() {
            flags |= 0x80 | table_exponent(local);
        }
        b.push(flags);
        for c in local {
            b.extend_from_slice(c);
        }
        b.push(min_code_bits);
        b.extend_from_slice(&sub_blocks(data));
        self.raw(&b)
    }

    /// Append a plain text extension
    pub fn plain_text(self, grid: (u16, u16, u16, u16), text: &[u8]) -> Self {
        let mut b = vec![0x21, 0x01, 12];
        for v in [grid.0, grid.1, grid.2, grid.3] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        b.extend_from_slice(&[8, 16, 1, 0]);
        b.extend_from_slice(&sub_blocks(text));
        self.raw(&b)
    }

    /// Append a comment extension
    pub fn comment(self, text: &[u8]) -> Self {
        let mut b = vec![0x21, 0xFE];
        b.extend_from_slice(&sub_blocks(text));
        self.raw(&b)
    }

    /// Append a NETSCAPE2.0 looping extension
    pub fn loop_count(self, count: u16) -> Self {
        let [lo, hi] = count.to_le_bytes();
        let mut b = vec![0x21, 0xFF, 11];
        b.extend_from_slice(b"NETSCAPE2.0");
        b.extend_from_slice(&[3, 1, lo, hi, 0]);
        self.raw(&b)
    }

    /// Append the trailer and finish
    pub fn trailer(self) -> Vec<u8> {
        self.raw(&[0x3B]).buf
    }

    /// Finish without a trailer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Two-color palette: black and white
pub const BW: [[u8; 3]; 2] = [[0, 0, 0], [255, 255, 255]];

/// Four-color palette
pub const RGBW: [[u8; 3]; 4] =
    [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]];

/// 10x10 sample image, with 4-entry global table and graphic control
pub const SAMPLE: &[u8] = include_bytes!("../res/sample.gif");

/// Indexed pixels of SAMPLE
pub const SAMPLE_PIXELS: [u8; 100] = [
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
    1, 1, 1, 1, 1, 2, 2, 2, 2, 2, //
    1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
    1, 1, 1, 0, 0, 0, 0, 2, 2, 2, //
    2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
    2, 2, 2, 0, 0, 0, 0, 1, 1, 1, //
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
    2, 2, 2, 2, 2, 1, 1, 1, 1, 1, //
];
