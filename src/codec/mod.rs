//! Codec module - image payload encoding.
//!
//! - [`BitmapCodec`] - packs a [`PixelGrid`](crate::PixelGrid) into the
//!   column-major bitstream Hanover signs expect
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! They hold no state, so every call is a pure function of its inputs.

mod bitmap;

pub use bitmap::BitmapCodec;
