// cursor.rs
//
// Copyright (c) 2026  Douglas Lau
//
//! Bounds-checked sequential reads over a byte buffer
use crate::error::{Error, Result};

/// Sequential reader over a fixed buffer
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    /// Remaining bytes
    buf: &'a [u8],
    /// Number of bytes consumed
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of a buffer
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// Check if all bytes have been consumed
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Get the number of bytes remaining
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Get the current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let buf = self.buf;
        let (byte, rest) = buf.split_first().ok_or(Error::UnexpectedEof)?;
        self.buf = rest;
        self.pos += 1;
        Ok(*byte)
    }

    /// Read a little-endian 16-bit word
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let b = self.read_exact(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a fixed-size block
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.buf.len() {
            return Err(Error::UnexpectedEof);
        }
        let buf = self.buf;
        let (block, rest) = buf.split_at(n);
        self.buf = rest;
        self.pos += n;
        Ok(block)
    }

    /// Read a chain of length-prefixed sub-blocks, concatenating payloads.
    ///
    /// The chain ends with a zero-length block.
    pub fn read_sub_block_chain(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(data);
            }
            data.extend_from_slice(self.read_exact(len.into())?);
        }
    }

    /// Read a chain of sub-blocks, keeping each payload separate
    pub fn read_sub_blocks(&mut self) -> Result<Vec<&'a [u8]>> {
        let mut blocks = Vec::new();
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(blocks);
            }
            blocks.push(self.read_exact(len.into())?);
        }
    }

    /// Skip a chain of sub-blocks without keeping the payload
    pub fn skip_sub_block_chain(&mut self) -> Result<usize> {
        let mut total = 0;
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(total);
            }
            self.read_exact(len.into())?;
            total += usize::from(len);
        }
    }
}
