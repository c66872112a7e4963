//! Bitmap codec - packs a pixel grid into the sign's column bitstream.
//!
//! Layout for a `width × height` grid:
//!
//! ```text
//!  column 0                 column 1                 ...
//! ┌────────┬────────┬──┐   ┌────────┬────────┬──┐
//! │ byte 0 │ byte 1 │..│   │ byte 0 │ byte 1 │..│   ceil(height / 8) bytes each
//! └────────┴────────┴──┘   └────────┴────────┴──┘
//! ```
//!
//! Within a column, row `y` is counted from the bottom: `v = height - 1 - y`
//! lands in byte `v / 8`, bit `v % 8` (bit 0 = LSB). Unused bits of the last
//! byte in each column stay zero.
//!
//! # Example
//!
//! ```
//! use hanover_flipdot::codec::BitmapCodec;
//! use hanover_flipdot::PixelGrid;
//!
//! let mut grid = PixelGrid::new(2, 8);
//! grid.set(0, 0, true); // top-left
//!
//! let bytes = BitmapCodec::encode(&grid, 2, 8, false).unwrap();
//! assert_eq!(bytes, vec![0x80, 0x00]);
//!
//! let flipped = BitmapCodec::encode(&grid, 2, 8, true).unwrap();
//! assert_eq!(flipped, vec![0x00, 0x01]);
//! ```

use crate::error::{FlipdotError, Result};
use crate::grid::PixelGrid;

/// Bits per packed byte.
const BITS_PER_BYTE: usize = 8;

/// Codec for the Hanover column-major image format.
pub struct BitmapCodec;

impl BitmapCodec {
    /// Bytes used by one column of a `height` pixel tall sign.
    #[inline]
    pub fn bytes_per_column(height: usize) -> usize {
        height.div_ceil(BITS_PER_BYTE)
    }

    /// Encoded length for a `width × height` sign.
    #[inline]
    pub fn encoded_len(width: usize, height: usize) -> usize {
        width * Self::bytes_per_column(height)
    }

    /// Encode `grid` for a `width × height` sign.
    ///
    /// With `flip` set the grid is rotated 180° while packing, for signs
    /// mounted upside-down. Fails with `DimensionMismatch` when the grid is not
    /// exactly `width × height`; there is no implicit cropping or padding of
    /// the grid itself.
    pub fn encode(grid: &PixelGrid, width: usize, height: usize, flip: bool) -> Result<Vec<u8>> {
        if grid.dimensions() != (width, height) {
            return Err(FlipdotError::DimensionMismatch {
                expected_width: width,
                expected_height: height,
                actual_width: grid.width(),
                actual_height: grid.height(),
            });
        }

        let column_bytes = Self::bytes_per_column(height);
        let mut out = vec![0u8; width * column_bytes];

        for x in 0..width {
            let column = &mut out[x * column_bytes..(x + 1) * column_bytes];
            for y in 0..height {
                let (src_x, src_y) = if flip {
                    (width - 1 - x, height - 1 - y)
                } else {
                    (x, y)
                };
                if grid.is_lit(src_x, src_y) {
                    let v = height - 1 - y;
                    column[v / BITS_PER_BYTE] |= 1 << (v % BITS_PER_BYTE);
                }
            }
        }

        Ok(out)
    }
}
