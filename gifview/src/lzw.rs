// lzw.rs
//
// Copyright (c) 2020-2026  Douglas Lau
//
//! Lempel-Ziv-Welch decompression for GIF
use crate::error::{Error, Result};
use log::debug;
use std::cmp::Ordering;
use std::ops::AddAssign;

/// Code Bits
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
struct Bits(u8);

impl From<u8> for Bits {
    fn from(bits: u8) -> Self {
        Bits(bits.min(Self::MAX.0))
    }
}

impl From<Bits> for u8 {
    fn from(bits: Bits) -> Self {
        bits.0
    }
}

impl AddAssign<u8> for Bits {
    fn add_assign(&mut self, rhs: u8) {
        self.0 = (self.0 + rhs).min(Self::MAX.0)
    }
}

impl Bits {
    /// Maximum code bits allowed for GIF
    const MAX: Self = Bits(12);

    /// Get the number of entries
    fn entries(self) -> u16 {
        1 << (self.0 as u16)
    }

    /// Get the bit mask
    fn mask(self) -> u32 {
        (1 << (self.0 as u32)) - 1
    }
}

/// Code type
type Code = u16;

/// Node for code dictionary
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Prefix node code
    prefix: Option<Code>,
    /// Byte value
    byte: u8,
}

/// Code dictionary trie
#[derive(Debug)]
struct Trie {
    /// Table of codes
    table: Vec<Node>,
    /// Minimum code bits
    min_code_bits: u8,
}

impl Trie {
    /// Create a new code dictionary
    fn new(min_code_bits: u8) -> Self {
        let mut trie = Trie {
            table: Vec::with_capacity(Bits::MAX.entries().into()),
            min_code_bits,
        };
        trie.reset();
        trie
    }

    /// Get the clear code
    fn clear_code(&self) -> Code {
        1 << self.min_code_bits
    }

    /// Get the end code
    fn end_code(&self) -> Code {
        self.clear_code() + 1
    }

    /// Get the next available code
    fn next_code(&self) -> Code {
        self.table.len() as Code
    }

    /// Check if the dictionary has no room for more codes
    fn is_full(&self) -> bool {
        self.next_code() >= Bits::MAX.entries()
    }

    /// Reset the dictionary
    fn reset(&mut self) {
        self.table.clear();
        for byte in 0..self.clear_code() {
            self.push_node(None, byte as u8);
        }
        self.push_node(None, 0); // clear code
        self.push_node(None, 0); // end code
    }

    /// Push a node into the dictionary
    fn push_node(&mut self, prefix: Option<Code>, byte: u8) {
        self.table.push(Node { prefix, byte })
    }

    /// Lookup the first byte of a code's string
    fn first_byte(&self, code: Code) -> u8 {
        let mut node = self.table[code as usize];
        while let Some(code) = node.prefix {
            node = self.table[code as usize];
        }
        node.byte
    }

    /// Decompress a code into a buffer (reversed)
    fn decompress_reversed(&self, code: Code, buffer: &mut Vec<u8>) {
        let mut node = self.table[code as usize];
        while let Some(code) = node.prefix {
            buffer.push(node.byte);
            node = self.table[code as usize];
        }
        buffer.push(node.byte);
    }
}

/// LZW Data Decompressor
#[derive(Debug)]
pub(crate) struct Decompressor {
    /// Code dictionary
    trie: Trie,
    /// Minimum code bits
    min_code_bits: u8,
    /// Current code bits
    code_bits: Bits,
    /// Last code
    last: Option<Code>,
    /// Bit accumulator
    code: u32,
    /// Number of bits in accumulator
    n_bits: u8,
}

impl Decompressor {
    /// Create a new decompressor.
    ///
    /// Minimum code size must be between 2 and 8.
    pub fn new(min_code_bits: u8) -> Result<Self> {
        if !(2..=8).contains(&min_code_bits) {
            return Err(Error::CorruptLzwStream);
        }
        Ok(Decompressor {
            min_code_bits,
            trie: Trie::new(min_code_bits),
            code_bits: Bits::from(min_code_bits + 1),
            last: None,
            code: 0,
            n_bits: 0,
        })
    }

    /// Take the next code from the accumulator
    fn code(&mut self) -> Option<Code> {
        let b = u8::from(self.code_bits);
        if self.n_bits >= b {
            let code = (self.code & self.code_bits.mask()) as Code;
            self.code >>= b;
            self.n_bits -= b;
            Some(code)
        } else {
            None
        }
    }

    /// Decompress a byte buffer into exactly `n_pixels` indices.
    ///
    /// Decoding stops at the end code, or when all pixels are produced.
    pub fn decompress(
        &mut self,
        bytes: &[u8],
        n_pixels: usize,
    ) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(n_pixels);
        if n_pixels == 0 {
            return Ok(buffer);
        }
        'bytes: for byte in bytes {
            self.code |= u32::from(*byte) << self.n_bits;
            self.n_bits += 8;
            while let Some(code) = self.code() {
                if code == self.trie.end_code() {
                    break 'bytes;
                }
                self.decompress_code(code, &mut buffer, n_pixels)?;
                if buffer.len() == n_pixels {
                    break 'bytes;
                }
            }
        }
        if buffer.len() == n_pixels {
            Ok(buffer)
        } else {
            debug!("LZW stream: {} of {} pixels", buffer.len(), n_pixels);
            Err(Error::CorruptLzwStream)
        }
    }

    /// Decompress one code
    fn decompress_code(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
        n_pixels: usize,
    ) -> Result<()> {
        if code == self.trie.clear_code() {
            self.trie.reset();
            self.code_bits = Bits::from(self.min_code_bits + 1);
            self.last = None;
            return Ok(());
        }
        let start = buffer.len();
        self.decompress_reversed(code, buffer)?;
        if buffer.len() > n_pixels {
            return Err(Error::CorruptLzwStream);
        }
        buffer[start..].reverse();
        self.last = Some(code);
        Ok(())
    }

    /// Decompress one code (reversed), adding a dictionary entry
    fn decompress_reversed(
        &mut self,
        code: Code,
        buffer: &mut Vec<u8>,
    ) -> Result<()> {
        let next_code = self.trie.next_code();
        match (self.last, code.cmp(&next_code)) {
            (_, Ordering::Greater) => return Err(Error::CorruptLzwStream),
            (None, Ordering::Less) if code < self.trie.clear_code() => {
                buffer.push(code as u8);
                return Ok(());
            }
            (None, _) => return Err(Error::CorruptLzwStream),
            (Some(last), Ordering::Less) => {
                self.trie.decompress_reversed(code, buffer);
                if !self.trie.is_full() {
                    let byte = self.trie.first_byte(code);
                    self.trie.push_node(Some(last), byte);
                }
            }
            (Some(last), Ordering::Equal) => {
                if self.trie.is_full() {
                    return Err(Error::CorruptLzwStream);
                }
                let byte = self.trie.first_byte(last);
                self.trie.push_node(Some(last), byte);
                self.trie.decompress_reversed(code, buffer);
            }
        }
        if self.trie.next_code() == self.code_bits.entries()
            && self.code_bits < Bits::MAX
        {
            self.code_bits += 1;
        }
        Ok(())
    }
}

/// Rearrange interlaced rows into top-to-bottom order.
///
/// Interlaced rows are stored in four passes: every 8th row from 0, every
/// 8th row from 4, every 4th row from 2, then every 2nd row from 1.
pub(crate) fn deinterlace(
    pixels: &[u8],
    width: usize,
    height: usize,
) -> Vec<u8> {
    let passes = [(0, 8), (4, 8), (2, 4), (1, 2)];
    let order = passes
        .iter()
        .flat_map(|&(start, step)| (start..height).step_by(step));
    let mut out = vec![0; pixels.len()];
    for (src, dst) in order.enumerate() {
        let s = src * width;
        let d = dst * width;
        out[d..d + width].copy_from_slice(&pixels[s..s + width]);
    }
    out
}
