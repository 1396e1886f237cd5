// lib.rs      gifview crate.
//
// Copyright (c) 2019-2026  Douglas Lau
//
//! A library for decoding GIF images and playing their animations.
//!
//! * [Decoder] reads a GIF into a [Document](block/struct.Document.html)
//! * [Player] steps through the document's graphics over time
//! * [compose](compose/index.html) renders graphics to `pix` rasters
#![forbid(unsafe_code)]

pub mod block;
pub mod compose;
mod cursor;
mod decode;
mod error;
#[cfg(test)]
mod fixture;
mod lzw;
mod playback;
mod private;

pub use crate::error::{Error, Result};
pub use crate::playback::Player;
pub use crate::private::Decoder;
